//! Kubo (go-ipfs) HTTP RPC client.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use pinway_types::{ContentId, ObjectLink, StoredObject};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;

use crate::config::NodeConfig;
use crate::error::{StoreError, StoreResult};
use crate::traits::StorageClient;

/// Storage client for a Kubo node's `/api/v0` RPC API.
///
/// # Example
///
/// ```rust,no_run
/// use pinway_store::{KuboClient, NodeConfig, StorageClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = KuboClient::new(&NodeConfig::default())?;
/// let peer_id = client.probe().await?;
/// let pins = client.list_pinned().await?;
/// # Ok(())
/// # }
/// ```
pub struct KuboClient {
    base_url: String,
    client: Client,
}

#[derive(Deserialize)]
struct IdResponse {
    #[serde(rename = "ID")]
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AddResponse {
    hash: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LsResponse {
    objects: Vec<LsObject>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LsObject {
    #[serde(default)]
    links: Vec<LsLink>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LsLink {
    #[serde(default)]
    name: String,
    hash: String,
    #[serde(default)]
    size: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PinsResponse {
    #[serde(default)]
    pins: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RefEntry {
    #[serde(rename = "Ref")]
    reference: String,
    #[serde(default)]
    err: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PinLsResponse {
    // The pin type per key carries nothing we use.
    #[serde(default)]
    keys: HashMap<String, IgnoredAny>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RpcError {
    message: String,
}

impl KuboClient {
    /// Build a client for the node described by `config`.
    pub fn new(config: &NodeConfig) -> StoreResult<Self> {
        let base_url = config.base_url()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, command: &str) -> String {
        format!("{}/api/v0/{}", self.base_url, command)
    }

    async fn call(&self, command: &str, args: &[(&str, &str)]) -> StoreResult<Response> {
        let response = self.client.post(self.url(command)).query(args).send().await?;
        check(response).await
    }

    async fn call_json<T: DeserializeOwned>(
        &self,
        command: &str,
        args: &[(&str, &str)],
    ) -> StoreResult<T> {
        let body = self.call(command, args).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// `id` followed by every distinct block below it. Kubo's pin commands
    /// only echo the root, so the rest comes from `refs`.
    async fn with_descendants(&self, id: &ContentId) -> StoreResult<Vec<ContentId>> {
        let arg = id.encode();
        let body = self
            .call(
                "refs",
                &[("arg", arg.as_str()), ("recursive", "true"), ("unique", "true")],
            )
            .await
            .map_err(|e| not_found_as(id, e))?
            .text()
            .await?;

        let mut all = vec![*id];
        for line in body.lines().filter(|l| !l.trim().is_empty()) {
            let entry: RefEntry = serde_json::from_str(line)?;
            if !entry.err.is_empty() {
                return Err(StoreError::InvalidResponse(format!("refs: {}", entry.err)));
            }
            let child = ContentId::decode(&entry.reference)?;
            if !all.contains(&child) {
                all.push(child);
            }
        }
        Ok(all)
    }
}

/// Turn a non-2xx answer into `StoreError::Node`, keeping the node's message.
async fn check(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<RpcError>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    Err(StoreError::Node {
        status: status.as_u16(),
        message,
    })
}

/// Map the node's "no such object" answers onto `NotFound`.
fn not_found_as(id: &ContentId, err: StoreError) -> StoreError {
    match err {
        StoreError::Node { status, .. } if status == 404 => StoreError::NotFound(*id),
        StoreError::Node { ref message, .. } if message.contains("not found") => {
            StoreError::NotFound(*id)
        }
        other => other,
    }
}

fn decode_all(hashes: Vec<String>) -> StoreResult<Vec<ContentId>> {
    hashes
        .iter()
        .map(|h| ContentId::decode(h).map_err(StoreError::from))
        .collect()
}

#[async_trait]
impl StorageClient for KuboClient {
    async fn probe(&self) -> StoreResult<String> {
        let id: IdResponse = self.call_json("id", &[]).await?;
        Ok(id.id)
    }

    async fn add(&self, object: StoredObject) -> StoreResult<ContentId> {
        let name = object.display_name().to_string();
        let part = Part::bytes(object.bytes.to_vec()).file_name(name);
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("add"))
            .query(&[("pin", "true"), ("progress", "false")])
            .multipart(form)
            .send()
            .await?;
        let body = check(response).await?.text().await?;

        // One JSON object per added entry; the last one is the root.
        let last = body
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| StoreError::InvalidResponse("empty add response".into()))?;
        let added: AddResponse = serde_json::from_str(last)?;
        let id = ContentId::decode(&added.hash)?;
        tracing::debug!(name = %object.display_name(), %id, "added to node");
        Ok(id)
    }

    async fn read(&self, id: &ContentId) -> StoreResult<Bytes> {
        let arg = id.encode();
        let response = self
            .call("cat", &[("arg", arg.as_str())])
            .await
            .map_err(|e| not_found_as(id, e))?;
        Ok(response.bytes().await?)
    }

    async fn list_children(&self, id: &ContentId) -> StoreResult<Vec<ObjectLink>> {
        let arg = id.encode();
        let ls: LsResponse = self
            .call_json("ls", &[("arg", arg.as_str())])
            .await
            .map_err(|e| not_found_as(id, e))?;

        let mut links = Vec::new();
        for object in ls.objects {
            for link in object.links {
                let name = (!link.name.is_empty()).then_some(link.name);
                links.push(ObjectLink::new(ContentId::decode(&link.hash)?, name, link.size));
            }
        }
        Ok(links)
    }

    async fn pin(&self, id: &ContentId) -> StoreResult<Vec<ContentId>> {
        let arg = id.encode();
        let pins: PinsResponse = self
            .call_json("pin/add", &[("arg", arg.as_str()), ("recursive", "true")])
            .await
            .map_err(|e| not_found_as(id, e))?;
        decode_all(pins.pins)?;
        self.with_descendants(id).await
    }

    async fn unpin(&self, id: &ContentId) -> StoreResult<Vec<ContentId>> {
        let arg = id.encode();
        let result = self
            .call_json::<PinsResponse>("pin/rm", &[("arg", arg.as_str())])
            .await;
        match result {
            Ok(pins) => {
                decode_all(pins.pins)?;
            }
            Err(StoreError::Node { message, .. }) if message.contains("not pinned") => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        }

        // Blocks stay local until GC, so the tree can still be walked. Whatever
        // another pin still covers did not leave the pin set.
        let released = self.with_descendants(id).await?;
        let still_pinned = self.list_pinned().await?;
        Ok(released
            .into_iter()
            .filter(|d| !still_pinned.contains(d))
            .collect())
    }

    async fn list_pinned(&self) -> StoreResult<BTreeSet<ContentId>> {
        let ls: PinLsResponse = self.call_json("pin/ls", &[("type", "all")]).await?;
        ls.keys
            .keys()
            .map(|h| ContentId::decode(h).map_err(StoreError::from))
            .collect()
    }
}

impl std::fmt::Debug for KuboClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KuboClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}
