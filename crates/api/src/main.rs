use std::net::SocketAddr;
use std::sync::Arc;

use jewelcase_core::auth::StaticCredentials;
use jewelcase_db::{CatalogStore, FileCatalogStore, MemoryCatalogStore, PgCatalogStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jewelcase_api::config::{ServerConfig, StoreConfig};
use jewelcase_api::router::build_app_router;
use jewelcase_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "jewelcase_api=debug,jewelcase_db=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Catalog store ---
    let store = build_store(&config.store).await;
    tracing::info!(backend = store.backend_name(), "Catalog store ready");

    // --- Uploads directory ---
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .expect("Failed to create upload directory");
    tracing::info!(upload_dir = %config.upload_dir.display(), "Upload directory ready");

    // --- App state ---
    let credentials = StaticCredentials::new(&config.admin_username, &config.admin_password);
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        credentials: Arc::new(credentials),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Open the configured catalog store, failing fast when it is unusable.
async fn build_store(store_config: &StoreConfig) -> Arc<dyn CatalogStore> {
    match store_config {
        StoreConfig::File { path } => {
            let store = FileCatalogStore::new(path.clone());
            store
                .health_check()
                .await
                .expect("Catalog file is unreadable");
            tracing::info!(path = %path.display(), "Using file catalog store");
            Arc::new(store)
        }
        StoreConfig::Postgres { database_url } => {
            let pool = jewelcase_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            jewelcase_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            jewelcase_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgCatalogStore::new(pool))
        }
        StoreConfig::Memory => {
            tracing::warn!("Using in-memory catalog store; changes are lost on restart");
            Arc::new(MemoryCatalogStore::new())
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
