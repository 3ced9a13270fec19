//! Admin panel and storefront against a live in-process API server.
//!
//! Each test binds the real router to `127.0.0.1:0` over a memory store and
//! a temporary upload directory, then talks to it through `HttpCatalogApi`.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use assert_matches::assert_matches;
use jewelcase_api::config::{ServerConfig, StoreConfig};
use jewelcase_api::router::build_app_router;
use jewelcase_api::state::AppState;
use jewelcase_client::admin::{AdminPanel, NoticeKind};
use jewelcase_client::api::{CatalogApi, HttpCatalogApi};
use jewelcase_client::error::ClientError;
use jewelcase_client::storefront::{CategoryFilter, StorefrontState};
use jewelcase_core::auth::StaticCredentials;
use jewelcase_core::catalog::{CatalogItemInput, NewCatalogItem};
use jewelcase_db::MemoryCatalogStore;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake image body";

async fn spawn_server(dir: &Path) -> SocketAddr {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
        request_timeout_secs: 30,
        store: StoreConfig::Memory,
        upload_dir: dir.join("images"),
        static_dir: dir.join("public"),
        max_upload_bytes: 1024 * 1024,
        admin_username: "admin".to_string(),
        admin_password: "admin123".to_string(),
    };
    std::fs::create_dir_all(&config.upload_dir).unwrap();

    let state = AppState {
        store: Arc::new(MemoryCatalogStore::new()),
        config: Arc::new(config.clone()),
        credentials: Arc::new(StaticCredentials::new("admin", "admin123")),
    };
    let app = build_app_router(state, &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn form(id: Option<i64>, name: &str, category: &str, image: &str) -> CatalogItemInput {
    CatalogItemInput {
        id,
        fields: NewCatalogItem {
            name: name.to_string(),
            category: category.to_string(),
            price: 100,
            image: image.to_string(),
            description: format!("{name} description"),
        },
    }
}

#[tokio::test]
async fn admin_workflow_round_trips_through_server() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(dir.path()).await;
    let api = HttpCatalogApi::new(format!("http://{addr}/")).unwrap();
    let mut panel = AdminPanel::new(api);

    panel.login("admin", "admin123").await.unwrap();
    assert!(panel.is_authenticated());
    assert!(panel.state().catalog().is_empty());

    // Upload an image and create an item that uses it.
    let uploaded = panel
        .upload_image("ring.png", "image/png", PNG_BYTES.to_vec())
        .await
        .unwrap();
    assert!(uploaded.file_path.starts_with("./images/"));
    let stored = dir.path().join("images").join(&uploaded.filename);
    assert!(stored.exists());

    let ring = panel
        .save(form(None, "Gold Ring", "RING", &uploaded.file_path))
        .await
        .unwrap();
    assert_eq!(ring.category, "ring");
    let necklace = panel
        .save(form(None, "Pearl Necklace", "necklace", "https://cdn.example.com/p.png"))
        .await
        .unwrap();
    assert!(necklace.id > ring.id);

    // Update keeps the id and adopts the server's copy.
    let updated = panel
        .save(form(Some(ring.id), "  Rose Gold Ring ", "ring", &uploaded.file_path))
        .await
        .unwrap();
    assert_eq!(updated.name, "Rose Gold Ring");
    assert_eq!(panel.state().item(ring.id).unwrap().name, "Rose Gold Ring");

    // Deleting the ring also removes its uploaded image.
    panel.delete(ring.id).await.unwrap();
    assert!(!stored.exists());
    assert!(panel.state().item(ring.id).is_none());

    // The storefront sees what the admin left behind.
    let mut storefront = StorefrontState::default();
    storefront.refresh(panel.api()).await.unwrap();
    storefront.set_category(CategoryFilter::parse("necklace"));
    let visible: Vec<_> = storefront.visible().iter().map(|i| i.id).collect();
    assert_eq!(visible, vec![necklace.id]);
}

#[tokio::test]
async fn wrong_password_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(dir.path()).await;
    let mut panel = AdminPanel::new(HttpCatalogApi::new(format!("http://{addr}")).unwrap());

    let err = panel.login("admin", "wrong").await.unwrap_err();

    assert_matches!(err, ClientError::Status { status: 401, ref message } if message == "Invalid username or password");
    assert!(!panel.is_authenticated());
    assert_eq!(panel.notice().unwrap().kind, NoticeKind::Error);
}

#[tokio::test]
async fn save_all_replaces_server_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(dir.path()).await;
    let api = HttpCatalogApi::new(format!("http://{addr}")).unwrap();

    api.create(&form(None, "Old", "ring", "").fields).await.unwrap();

    let mut panel = AdminPanel::new(api);
    panel.load().await.unwrap();
    panel
        .save(form(None, "Second", "bracelet", ""))
        .await
        .unwrap();

    assert_eq!(panel.save_all().await.unwrap(), 2);

    let names: Vec<_> = panel
        .api()
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(names, vec!["Old".to_string(), "Second".to_string()]);
}

#[tokio::test]
async fn rejected_upload_surfaces_server_message() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(dir.path()).await;
    let mut panel = AdminPanel::new(HttpCatalogApi::new(format!("http://{addr}")).unwrap());

    let err = panel
        .upload_image("notes.txt", "text/plain", b"hello".to_vec())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(panel.notice().unwrap().message, "Failed to upload image");
    assert_eq!(std::fs::read_dir(dir.path().join("images")).unwrap().count(), 0);
}

#[tokio::test]
async fn deleting_missing_item_on_server_keeps_local_copy() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(dir.path()).await;
    let api = HttpCatalogApi::new(format!("http://{addr}")).unwrap();
    let created = api.create(&form(None, "Ring", "ring", "").fields).await.unwrap();

    let mut panel = AdminPanel::new(api);
    panel.load().await.unwrap();

    // Removed behind the panel's back.
    panel.api().delete(created.id).await.unwrap();

    let err = panel.delete(created.id).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(panel.state().item(created.id).is_some());
}
