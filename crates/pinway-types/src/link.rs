use serde::{Deserialize, Serialize};

use crate::object::ContentId;

/// One child of a content-addressed node, as listed by the storage node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectLink {
    pub identifier: ContentId,
    pub name: Option<String>,
    pub size: u64,
}

impl ObjectLink {
    pub fn new(identifier: ContentId, name: Option<String>, size: u64) -> Self {
        Self {
            identifier,
            name,
            size,
        }
    }
}
