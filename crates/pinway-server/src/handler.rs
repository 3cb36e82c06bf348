use std::collections::BTreeSet;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use pinway_gateway::Gateway;
use pinway_types::{ObjectLink, StoredObject};
use serde_json::json;

use crate::error::ApiError;

/// Multipart part carrying the upload.
pub const FILE_FIELD: &str = "file";

/// Health check handler. Always 200; the body says whether the node answered.
pub async fn health_handler(State(gateway): State<Gateway>) -> String {
    gateway.health().await.to_string()
}

/// Info handler.
pub async fn info_handler() -> Json<serde_json::Value> {
    Json(json!({
        "name": "pinway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn store_file(
    State(gateway): State<Gateway>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, String), ApiError> {
    let mut multipart = multipart.map_err(malformed)?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(malformed)?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(malformed)?;
        tracing::info!(
            name = name.as_deref().unwrap_or("unknown"),
            content_type = content_type.as_deref().unwrap_or("unknown"),
            "adding file"
        );
        upload = Some(StoredObject { name, bytes });
        break;
    }

    let upload = upload.ok_or_else(|| ApiError::bad_input("missing multipart part `file`"))?;
    let hash = gateway.store_file(upload).await?;
    Ok((StatusCode::CREATED, hash))
}

/// Keep the parser's complaint in the log; callers get a fixed message.
fn malformed(e: impl std::fmt::Display) -> ApiError {
    tracing::debug!(error = %e, "rejected upload");
    ApiError::bad_input("malformed multipart body")
}

/// Stream a file's bytes exactly as the node returned them.
pub async fn fetch_file(
    State(gateway): State<Gateway>,
    Path(hash): Path<String>,
) -> Result<Response, ApiError> {
    let bytes = gateway.fetch_file(&hash).await?;
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes).into_response())
}

pub async fn inspect_file(
    State(gateway): State<Gateway>,
    Path(hash): Path<String>,
) -> Result<Json<Vec<ObjectLink>>, ApiError> {
    Ok(Json(gateway.inspect_file(&hash).await?))
}

pub async fn pin_file(
    State(gateway): State<Gateway>,
    Path(hash): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(gateway.pin_file(&hash).await?))
}

pub async fn unpin_file(
    State(gateway): State<Gateway>,
    Path(hash): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(gateway.unpin_file(&hash).await?))
}

pub async fn list_files(
    State(gateway): State<Gateway>,
) -> Result<Json<BTreeSet<String>>, ApiError> {
    Ok(Json(gateway.list_all().await?))
}
