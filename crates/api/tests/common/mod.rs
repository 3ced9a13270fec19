#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use jewelcase_api::config::{ServerConfig, StoreConfig};
use jewelcase_api::router::build_app_router;
use jewelcase_api::state::AppState;
use jewelcase_core::auth::StaticCredentials;
use jewelcase_core::catalog::CatalogItem;
use jewelcase_db::{CatalogStore, MemoryCatalogStore};

pub const TEST_USERNAME: &str = "admin";
pub const TEST_PASSWORD: &str = "admin123";

/// Upload limit used by the tests (1 MiB).
pub const TEST_MAX_UPLOAD_BYTES: usize = 1024 * 1024;

/// Build a test `ServerConfig` rooted in `dir`.
///
/// Uploads go to `dir/images`, static assets are served from `dir/public`.
pub fn test_config(dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
        request_timeout_secs: 30,
        store: StoreConfig::Memory,
        upload_dir: dir.join("images"),
        static_dir: dir.join("public"),
        max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
        admin_username: TEST_USERNAME.to_string(),
        admin_password: TEST_PASSWORD.to_string(),
    }
}

/// Build the full application router over an empty in-memory catalog.
pub fn build_test_app(dir: &Path) -> Router {
    build_test_app_with_store(dir, Arc::new(MemoryCatalogStore::new()))
}

/// Build the full application router over a memory catalog seeded with `items`.
pub fn build_seeded_app(dir: &Path, items: Vec<CatalogItem>) -> Router {
    build_test_app_with_store(dir, Arc::new(MemoryCatalogStore::with_items(items)))
}

/// Build the full application router over the given store, through the same
/// `build_app_router` the binary uses.
pub fn build_test_app_with_store(dir: &Path, store: Arc<dyn CatalogStore>) -> Router {
    let config = test_config(dir);
    std::fs::create_dir_all(&config.upload_dir).unwrap();
    std::fs::create_dir_all(&config.static_dir).unwrap();

    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        credentials: Arc::new(StaticCredentials::new(TEST_USERNAME, TEST_PASSWORD)),
    };

    build_app_router(state, &config)
}

/// A catalog item with the given id, as a seeded store would hold it.
pub fn seed_item(id: i64, name: &str, category: &str, price: i64) -> CatalogItem {
    CatalogItem {
        id,
        name: name.to_string(),
        category: category.to_string(),
        price,
        image: format!("./images/{id}.png"),
        description: format!("{name} description"),
        created_at: None,
        updated_at: None,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, Body::empty(), None).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Body::empty(), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(
        app,
        Method::POST,
        uri,
        Body::from(body.to_string()),
        Some("application/json".to_string()),
    )
    .await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(
        app,
        Method::PUT,
        uri,
        Body::from(body.to_string()),
        Some("application/json".to_string()),
    )
    .await
}

/// POST raw text with a JSON content type (for malformed-body tests).
pub async fn post_raw_json(app: Router, uri: &str, body: &str) -> Response<Body> {
    send(
        app,
        Method::POST,
        uri,
        Body::from(body.to_string()),
        Some("application/json".to_string()),
    )
    .await
}

const BOUNDARY: &str = "jewelcase-test-boundary";

/// POST a single-file multipart form.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    field: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> Response<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    send(
        app,
        Method::POST,
        uri,
        Body::from(body),
        Some(format!("multipart/form-data; boundary={BOUNDARY}")),
    )
    .await
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Body,
    content_type: Option<String>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as UTF-8 text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
