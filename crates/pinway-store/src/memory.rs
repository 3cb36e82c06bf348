use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use cid::Cid;
use multihash_codetable::{Code, MultihashDigest};
use pinway_types::{ContentId, ObjectLink, StoredObject};

use crate::error::{StoreError, StoreResult};
use crate::traits::StorageClient;

/// dag-pb multicodec, used for directory nodes.
const DAG_PB: u64 = 0x70;

#[derive(Clone, Debug)]
struct Node {
    data: Bytes,
    links: Vec<ObjectLink>,
}

/// In-memory storage node.
///
/// Intended for tests and embedding. Payloads are addressed by their
/// sha2-256 digest (CIDv0), directories built with [`put_directory`] get a
/// CIDv1 dag-pb identifier, and pins are recursive. Like a real node, `add`
/// pins what it stores. Every trait call is counted so tests can check
/// whether a request ever reached the node.
///
/// [`put_directory`]: InMemoryStorageClient::put_directory
pub struct InMemoryStorageClient {
    identity: Option<String>,
    offline: AtomicBool,
    objects: RwLock<HashMap<ContentId, Node>>,
    roots: RwLock<BTreeSet<ContentId>>,
    calls: AtomicUsize,
}

impl InMemoryStorageClient {
    /// Create an empty node with a fixed identity.
    pub fn new() -> Self {
        Self::with_identity(Some("in-memory"))
    }

    /// Create an empty node reporting the given identity. `None` or a blank
    /// string makes `probe` answer with an empty identity.
    pub fn with_identity(identity: Option<impl Into<String>>) -> Self {
        Self {
            identity: identity.map(Into::into),
            offline: AtomicBool::new(false),
            objects: RwLock::new(HashMap::new()),
            roots: RwLock::new(BTreeSet::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a node whose every operation fails as unreachable.
    pub fn unreachable() -> Self {
        let node = Self::new();
        node.set_offline(true);
        node
    }

    /// Toggle simulated unreachability.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of adapter calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of objects held.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Store a directory node linking existing objects by name.
    ///
    /// Not counted as an adapter call; this is fixture setup.
    pub fn put_directory(&self, entries: &[(&str, ContentId)]) -> StoreResult<ContentId> {
        let mut objects = self.objects.write().expect("lock poisoned");

        let mut links = Vec::with_capacity(entries.len());
        let mut encoded = Vec::new();
        for (name, child) in entries {
            let node = objects.get(child).ok_or(StoreError::NotFound(*child))?;
            let size = node.data.len() as u64
                + node.links.iter().map(|l| l.size).sum::<u64>();
            encoded.extend_from_slice(name.as_bytes());
            encoded.push(0);
            encoded.extend_from_slice(&child.to_bytes());
            links.push(ObjectLink::new(*child, Some((*name).to_string()), size));
        }

        let id = ContentId::from(Cid::new_v1(DAG_PB, Code::Sha2_256.digest(&encoded)));
        objects.entry(id).or_insert(Node {
            data: Bytes::new(),
            links,
        });
        Ok(id)
    }

    /// Whether `id` is currently pinned, directly or through an ancestor.
    pub fn is_pinned(&self, id: &ContentId) -> bool {
        let objects = self.objects.read().expect("lock poisoned");
        let roots = self.roots.read().expect("lock poisoned");
        closure(&objects, roots.iter()).contains(id)
    }

    fn enter(&self) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory node is offline".into()));
        }
        Ok(())
    }
}

/// Root-first, depth-first walk of everything reachable from `start`.
fn descendants(objects: &HashMap<ContentId, Node>, start: &ContentId) -> Vec<ContentId> {
    let mut seen = BTreeSet::new();
    let mut order = Vec::new();
    let mut stack = vec![*start];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        order.push(id);
        if let Some(node) = objects.get(&id) {
            stack.extend(node.links.iter().rev().map(|l| l.identifier));
        }
    }
    order
}

fn closure<'a>(
    objects: &HashMap<ContentId, Node>,
    roots: impl Iterator<Item = &'a ContentId>,
) -> BTreeSet<ContentId> {
    roots.flat_map(|root| descendants(objects, root)).collect()
}

impl Default for InMemoryStorageClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageClient for InMemoryStorageClient {
    async fn probe(&self) -> StoreResult<String> {
        self.enter()?;
        Ok(self.identity.clone().unwrap_or_default())
    }

    async fn add(&self, object: StoredObject) -> StoreResult<ContentId> {
        self.enter()?;
        let cid = Cid::new_v0(Code::Sha2_256.digest(&object.bytes))
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let id = ContentId::from(cid);

        let mut objects = self.objects.write().expect("lock poisoned");
        objects.entry(id).or_insert(Node {
            data: object.bytes,
            links: Vec::new(),
        });
        self.roots.write().expect("lock poisoned").insert(id);
        Ok(id)
    }

    async fn read(&self, id: &ContentId) -> StoreResult<Bytes> {
        self.enter()?;
        let objects = self.objects.read().expect("lock poisoned");
        objects
            .get(id)
            .map(|node| node.data.clone())
            .ok_or(StoreError::NotFound(*id))
    }

    async fn list_children(&self, id: &ContentId) -> StoreResult<Vec<ObjectLink>> {
        self.enter()?;
        let objects = self.objects.read().expect("lock poisoned");
        objects
            .get(id)
            .map(|node| node.links.clone())
            .ok_or(StoreError::NotFound(*id))
    }

    async fn pin(&self, id: &ContentId) -> StoreResult<Vec<ContentId>> {
        self.enter()?;
        let objects = self.objects.read().expect("lock poisoned");
        if !objects.contains_key(id) {
            return Err(StoreError::NotFound(*id));
        }
        self.roots.write().expect("lock poisoned").insert(*id);
        Ok(descendants(&objects, id))
    }

    async fn unpin(&self, id: &ContentId) -> StoreResult<Vec<ContentId>> {
        self.enter()?;
        let objects = self.objects.read().expect("lock poisoned");
        let mut roots = self.roots.write().expect("lock poisoned");
        if !roots.remove(id) {
            return Ok(Vec::new());
        }
        let still_pinned = closure(&objects, roots.iter());
        Ok(descendants(&objects, id)
            .into_iter()
            .filter(|d| !still_pinned.contains(d))
            .collect())
    }

    async fn list_pinned(&self) -> StoreResult<BTreeSet<ContentId>> {
        self.enter()?;
        let objects = self.objects.read().expect("lock poisoned");
        let roots = self.roots.read().expect("lock poisoned");
        Ok(closure(&objects, roots.iter()))
    }
}

impl std::fmt::Debug for InMemoryStorageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStorageClient")
            .field("identity", &self.identity)
            .field("object_count", &self.len())
            .field("calls", &self.calls())
            .finish()
    }
}
