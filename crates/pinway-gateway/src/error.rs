use std::fmt;

use pinway_store::StoreError;
use pinway_types::{ContentId, TypeError};
use serde::Serialize;
use thiserror::Error;

/// Outcome kinds a caller can observe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    BadInput,
    NotFound,
    StoreUnavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadInput => write!(f, "bad input"),
            Self::NotFound => write!(f, "not found"),
            Self::StoreUnavailable => write!(f, "store unavailable"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("bad input: {0}")]
    BadInput(String),

    #[error("object not found: {0}")]
    NotFound(ContentId),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadInput(_) => ErrorKind::BadInput,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
        }
    }
}

impl From<TypeError> for GatewayError {
    fn from(e: TypeError) -> Self {
        GatewayError::BadInput(e.to_string())
    }
}

impl From<StoreError> for GatewayError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => GatewayError::NotFound(id),
            other => GatewayError::StoreUnavailable(other.to_string()),
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
