//! HTTP server for pinway.
//!
//! Exposes the gateway's operations as REST endpoints: upload a file and get
//! its hash back, download by hash, list a node's links, pin, unpin, and list
//! everything pinned.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::{PinwayConfig, ServerConfig};
pub use error::{ApiError, ServerError, ServerResult};
pub use server::PinwayServer;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::{Path, State};
    use axum::http::{header, Request, StatusCode};
    use axum::response::IntoResponse;
    use axum::Router;
    use pinway_gateway::Gateway;
    use pinway_store::InMemoryStorageClient;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    const HELLO_WORLD_HASH: &str = "QmWvQxTqbG2Z9HPJgG57jjwR154cKhbtJenbyYTWkjgF3e";
    const HELLO_WORLD_CONTENT: &str = "Hello World!";
    const HELLO_WORLD_FILENAME: &str = "hello-world.txt";
    const ABSENT_HASH: &str = "QmfM2r8seH2GiRaC4esTjeraXEachRt8ZsSeGaWTPLyMoG";
    const BOUNDARY: &str = "pinway-test-boundary";

    fn app_with(store: Arc<InMemoryStorageClient>) -> Router {
        router::build_router(Gateway::new(store), &ServerConfig::default())
    }

    fn app() -> (Arc<InMemoryStorageClient>, Router) {
        let store = Arc::new(InMemoryStorageClient::new());
        (store.clone(), app_with(store))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn upload(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: text/plain\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/ipfs/files")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    // -----------------------------------------------------------------------
    // Health / info
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn health_connected() {
        let (_, app) = app();
        let response = app.oneshot(get("/ipfs/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"connected to: in-memory");
    }

    #[tokio::test]
    async fn health_blank_probe_is_not_connected() {
        let app = app_with(Arc::new(InMemoryStorageClient::with_identity(Some(""))));
        let response = app.oneshot(get("/ipfs/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"not connected");
    }

    #[tokio::test]
    async fn health_unreachable_is_still_200() {
        let app = app_with(Arc::new(InMemoryStorageClient::unreachable()));
        let response = app.oneshot(get("/ipfs/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"not connected");
    }

    #[tokio::test]
    async fn info_endpoint() {
        let (_, app) = app();
        let response = app.oneshot(get("/ipfs/info")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["name"], "pinway");
    }

    // -----------------------------------------------------------------------
    // Upload
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn upload_returns_201_and_hash() {
        let (_, app) = app();
        let response = app
            .oneshot(upload("file", HELLO_WORLD_FILENAME, HELLO_WORLD_CONTENT.as_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_bytes(response).await, HELLO_WORLD_HASH.as_bytes());
    }

    #[tokio::test]
    async fn upload_empty_is_400() {
        let (store, app) = app();
        let response = app
            .oneshot(upload("file", HELLO_WORLD_FILENAME, b""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "bad_input");
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn upload_without_file_part_is_400() {
        let (store, app) = app();
        let response = app
            .oneshot(upload("attachment", HELLO_WORLD_FILENAME, b"data"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn upload_not_multipart_is_400() {
        let (_, app) = app();
        let request = Request::builder()
            .method("POST")
            .uri("/ipfs/files")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("Hello World!"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "bad_input");
        assert_eq!(json["message"], "malformed multipart body");
    }

    #[tokio::test]
    async fn upload_to_unreachable_node_is_502_without_detail() {
        let app = app_with(Arc::new(InMemoryStorageClient::unreachable()));
        let response = app
            .oneshot(upload("file", HELLO_WORLD_FILENAME, HELLO_WORLD_CONTENT.as_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"], "store_unavailable");
        assert_eq!(json["message"], "storage node unavailable");
    }

    // -----------------------------------------------------------------------
    // Fetch / info
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn fetch_stored_file() {
        let (_, app) = app();
        app.clone()
            .oneshot(upload("file", HELLO_WORLD_FILENAME, HELLO_WORLD_CONTENT.as_bytes()))
            .await
            .unwrap();

        let response = app
            .oneshot(get(&format!("/ipfs/files/{HELLO_WORLD_HASH}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );
        assert_eq!(body_bytes(response).await, HELLO_WORLD_CONTENT.as_bytes());
    }

    #[tokio::test]
    async fn fetch_binary_is_unchanged() {
        let (_, app) = app();
        let payload: Vec<u8> = (0..=255u8).rev().collect();
        let response = app
            .clone()
            .oneshot(upload("file", "bytes.bin", &payload))
            .await
            .unwrap();
        let hash = String::from_utf8(body_bytes(response).await).unwrap();

        let response = app.oneshot(get(&format!("/ipfs/files/{hash}"))).await.unwrap();
        assert_eq!(body_bytes(response).await, payload);
    }

    #[tokio::test]
    async fn fetch_absent_is_404() {
        let (_, app) = app();
        let response = app
            .oneshot(get(&format!("/ipfs/files/{ABSENT_HASH}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn fetch_malformed_is_400() {
        let (store, app) = app();
        let response = app.oneshot(get("/ipfs/files/not-a-hash")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn fetch_with_embedded_path_is_400() {
        let (store, app) = app();
        app.clone()
            .oneshot(upload("file", HELLO_WORLD_FILENAME, HELLO_WORLD_CONTENT.as_bytes()))
            .await
            .unwrap();

        let response = app
            .oneshot(get(&format!("/ipfs/files/junk%21%2Fipfs%2F{HELLO_WORLD_HASH}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "bad_input");
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn fetch_empty_hash_is_400() {
        let store = Arc::new(InMemoryStorageClient::new());
        let gateway = Gateway::new(store.clone());
        let response = handler::fetch_file(State(gateway), Path(String::new()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn info_lists_links() {
        let (store, app) = app();
        app.clone()
            .oneshot(upload("file", HELLO_WORLD_FILENAME, HELLO_WORLD_CONTENT.as_bytes()))
            .await
            .unwrap();
        let child = pinway_types::ContentId::decode(HELLO_WORLD_HASH).unwrap();
        let dir = store.put_directory(&[(HELLO_WORLD_FILENAME, child)]).unwrap();

        let response = app
            .oneshot(get(&format!("/ipfs/files/{dir}/info")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(
            json,
            serde_json::json!([{
                "identifier": HELLO_WORLD_HASH,
                "name": HELLO_WORLD_FILENAME,
                "size": 12
            }])
        );
    }

    #[tokio::test]
    async fn info_malformed_is_400() {
        let (_, app) = app();
        let response = app.oneshot(get("/ipfs/files/Qm123/info")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // -----------------------------------------------------------------------
    // Pins
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn pin_and_unpin() {
        let (_, app) = app();
        app.clone()
            .oneshot(upload("file", HELLO_WORLD_FILENAME, HELLO_WORLD_CONTENT.as_bytes()))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(post(&format!("/ipfs/files/{HELLO_WORLD_HASH}/pin")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([HELLO_WORLD_HASH]));

        let response = app
            .clone()
            .oneshot(post(&format!("/ipfs/files/{HELLO_WORLD_HASH}/unpin")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([HELLO_WORLD_HASH]));

        let response = app
            .oneshot(post(&format!("/ipfs/files/{HELLO_WORLD_HASH}/unpin")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn pin_malformed_is_400() {
        let (store, app) = app();
        let response = app
            .clone()
            .oneshot(post("/ipfs/files/%20/pin"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let response = app.oneshot(post("/ipfs/files/zzz/unpin")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn list_returns_exactly_the_pins() {
        let (_, app) = app();
        let mut expected = Vec::new();
        for content in [&b"A"[..], &b"B"[..]] {
            let response = app
                .clone()
                .oneshot(upload("file", "x.txt", content))
                .await
                .unwrap();
            expected.push(String::from_utf8(body_bytes(response).await).unwrap());
        }

        let response = app.oneshot(get("/ipfs/files")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let mut listed: Vec<String> = serde_json::from_value(body_json(response).await).unwrap();
        listed.sort();
        expected.sort();
        assert_eq!(listed, expected);
    }

    #[tokio::test]
    async fn list_unreachable_is_502() {
        let app = app_with(Arc::new(InMemoryStorageClient::unreachable()));
        let response = app.oneshot(get("/ipfs/files")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    // -----------------------------------------------------------------------
    // Mounting
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn root_base_path() {
        let config = ServerConfig {
            base_path: "/".into(),
            ..Default::default()
        };
        let app = router::build_router(
            Gateway::new(Arc::new(InMemoryStorageClient::new())),
            &config,
        );
        let response = app.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let response = app.oneshot(get("/ipfs/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn upload_over_limit_is_rejected() {
        let config = ServerConfig {
            max_upload_size: 16,
            ..Default::default()
        };
        let store = Arc::new(InMemoryStorageClient::new());
        let app = router::build_router(Gateway::new(store.clone()), &config);
        let response = app
            .oneshot(upload("file", "big.bin", &[7u8; 1024]))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
        assert_eq!(store.calls(), 0);
    }
}
