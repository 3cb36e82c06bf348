use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use pinway_gateway::{ErrorKind, GatewayError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// Error answer for an HTTP request.
///
/// Carries the outcome kind and a terse message. Node-side detail is logged
/// by the gateway and never copied into the body.
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    pub fn bad_input(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::BadInput,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status(&self) -> StatusCode {
        match self.kind {
            ErrorKind::BadInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::StoreUnavailable => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        let message = match &e {
            GatewayError::BadInput(reason) => reason.clone(),
            GatewayError::NotFound(id) => format!("no object {id}"),
            GatewayError::StoreUnavailable(_) => "storage node unavailable".into(),
        };
        Self {
            kind: e.kind(),
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.kind,
            "message": self.message,
        }));
        (self.status(), body).into_response()
    }
}
