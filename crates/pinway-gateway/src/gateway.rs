use std::collections::BTreeSet;
use std::sync::Arc;

use bytes::Bytes;
use pinway_store::{StorageClient, StoreError};
use pinway_types::{ContentId, ObjectLink, StoredObject};

use crate::error::{GatewayError, GatewayResult};
use crate::health::NodeHealth;

/// Stateless facade over one storage node.
///
/// Identifiers from callers are validated before anything is sent to the
/// node; a malformed one never costs a round-trip. Concurrent pin and unpin
/// requests for the same identifier are forwarded independently and the
/// node decides how they interleave.
#[derive(Clone)]
pub struct Gateway {
    store: Arc<dyn StorageClient>,
}

impl Gateway {
    pub fn new(store: Arc<dyn StorageClient>) -> Self {
        Self { store }
    }

    // ---- Health ----

    /// Probe the node. Failure or a blank identity is reported as
    /// [`NodeHealth::NotConnected`].
    pub async fn health(&self) -> NodeHealth {
        match self.store.probe().await {
            Ok(id) if !id.trim().is_empty() => NodeHealth::Connected(id),
            Ok(_) => NodeHealth::NotConnected,
            Err(e) => {
                tracing::warn!(error = %e, "storage node probe failed");
                NodeHealth::NotConnected
            }
        }
    }

    // ---- Content operations ----

    /// Store a payload and return the node's identifier for it.
    pub async fn store_file(&self, object: StoredObject) -> GatewayResult<String> {
        if object.is_empty() {
            return Err(GatewayError::BadInput("empty payload".into()));
        }
        let name = object.display_name().to_string();
        let size = object.len();
        let id = self
            .store
            .add(object)
            .await
            .map_err(|e| failed("add", e))?;
        tracing::info!(%name, size, hash = %id, "stored file");
        Ok(id.encode())
    }

    pub async fn fetch_file(&self, id: &str) -> GatewayResult<Bytes> {
        let id = parse(id)?;
        tracing::info!(hash = %id, "fetching file");
        self.store.read(&id).await.map_err(|e| failed("read", e))
    }

    pub async fn inspect_file(&self, id: &str) -> GatewayResult<Vec<ObjectLink>> {
        let id = parse(id)?;
        tracing::info!(hash = %id, "listing links");
        self.store
            .list_children(&id)
            .await
            .map_err(|e| failed("ls", e))
    }

    // ---- Pins ----

    /// Pin an identifier; the result lists the root and every descendant
    /// pinned along with it.
    pub async fn pin_file(&self, id: &str) -> GatewayResult<Vec<String>> {
        let id = parse(id)?;
        tracing::info!(hash = %id, "pinning");
        let pinned = self.store.pin(&id).await.map_err(|e| failed("pin", e))?;
        Ok(pinned.iter().map(ContentId::encode).collect())
    }

    /// Unpin an identifier; the result lists what actually left the pin set.
    pub async fn unpin_file(&self, id: &str) -> GatewayResult<Vec<String>> {
        let id = parse(id)?;
        tracing::info!(hash = %id, "unpinning");
        let removed = self.store.unpin(&id).await.map_err(|e| failed("unpin", e))?;
        Ok(removed.iter().map(ContentId::encode).collect())
    }

    /// Every pinned identifier, straight from the node.
    pub async fn list_all(&self) -> GatewayResult<BTreeSet<String>> {
        let pinned = self
            .store
            .list_pinned()
            .await
            .map_err(|e| failed("pin ls", e))?;
        Ok(pinned.iter().map(ContentId::encode).collect())
    }
}

fn parse(text: &str) -> GatewayResult<ContentId> {
    ContentId::decode(text).map_err(|e| {
        tracing::debug!(error = %e, "rejected identifier");
        GatewayError::from(e)
    })
}

/// Log the node-side detail and keep only the outcome kind for the caller.
fn failed(operation: &str, e: StoreError) -> GatewayError {
    match &e {
        StoreError::NotFound(id) => tracing::info!(operation, hash = %id, "object not found"),
        other => tracing::warn!(operation, error = %other, "storage node call failed"),
    }
    e.into()
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway").finish_non_exhaustive()
    }
}
