use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use pinway_gateway::Gateway;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handler;

/// Route paths, relative to the configured base path.
pub mod endpoints {
    pub const HEALTH: &str = "/health";
    pub const INFO: &str = "/info";
    pub const FILES: &str = "/files";
    pub const FILE: &str = "/files/:hash";
    pub const FILE_INFO: &str = "/files/:hash/info";
    pub const FILE_PIN: &str = "/files/:hash/pin";
    pub const FILE_UNPIN: &str = "/files/:hash/unpin";
}

/// Build the axum router with all pinway endpoints.
pub fn build_router(gateway: Gateway, config: &ServerConfig) -> Router {
    let api = Router::new()
        .route(endpoints::HEALTH, get(handler::health_handler))
        .route(endpoints::INFO, get(handler::info_handler))
        .route(
            endpoints::FILES,
            get(handler::list_files).post(handler::store_file),
        )
        .route(endpoints::FILE, get(handler::fetch_file))
        .route(endpoints::FILE_INFO, get(handler::inspect_file))
        .route(endpoints::FILE_PIN, post(handler::pin_file))
        .route(endpoints::FILE_UNPIN, post(handler::unpin_file))
        .layer(DefaultBodyLimit::max(config.max_upload_size))
        .with_state(gateway);

    let base = config.normalized_base_path();
    let app = if base.is_empty() {
        api
    } else {
        Router::new().nest(&base, api)
    };
    app.layer(TraceLayer::new_for_http())
}
