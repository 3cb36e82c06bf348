use pinway_types::{ContentId, TypeError};

/// Errors from storage node operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The node reports no such object.
    #[error("object not found: {0}")]
    NotFound(ContentId),

    /// The node could not be reached or refused to serve the request.
    #[error("storage node unavailable: {0}")]
    Unavailable(String),

    /// Transport failure talking to the node.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The node answered with an error status.
    #[error("node error {status}: {message}")]
    Node { status: u16, message: String },

    /// The node answered with a body we could not decode.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The node handed back an identifier that fails the hash codec.
    #[error("invalid identifier from node: {0}")]
    InvalidIdentifier(#[from] TypeError),

    /// The configured node address cannot be turned into a URL.
    #[error("invalid node address: {0}")]
    InvalidAddress(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::InvalidResponse(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
