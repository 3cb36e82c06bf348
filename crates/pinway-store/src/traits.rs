use std::collections::BTreeSet;

use async_trait::async_trait;
use bytes::Bytes;
use pinway_types::{ContentId, ObjectLink, StoredObject};

use crate::error::StoreResult;

/// Client-facing operations of a content-addressed storage node.
///
/// All implementations must satisfy these invariants:
/// - Identifiers returned were produced by the node, never synthesised.
/// - `pin` returns the root plus everything pinned as a consequence of it.
/// - `unpin` returns only what actually left the pin set; an identifier
///   that was never pinned yields an empty vector, not an error.
/// - No state is shared between calls beyond what the node itself holds.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Identity of the connected node (its peer ID).
    async fn probe(&self) -> StoreResult<String>;

    /// Store a payload and return the identifier the node assigned to it.
    async fn add(&self, object: StoredObject) -> StoreResult<ContentId>;

    /// Read the full content behind an identifier.
    ///
    /// Returns `StoreError::NotFound` if the node has no such object.
    async fn read(&self, id: &ContentId) -> StoreResult<Bytes>;

    /// List the direct children of a node.
    async fn list_children(&self, id: &ContentId) -> StoreResult<Vec<ObjectLink>>;

    /// Pin an identifier and, transitively, all of its descendants.
    async fn pin(&self, id: &ContentId) -> StoreResult<Vec<ContentId>>;

    /// Remove a pin.
    async fn unpin(&self, id: &ContentId) -> StoreResult<Vec<ContentId>>;

    /// Every identifier currently pinned, directly or indirectly.
    async fn list_pinned(&self) -> StoreResult<BTreeSet<ContentId>>;
}
