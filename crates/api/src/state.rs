use std::sync::Arc;

use jewelcase_core::auth::CredentialCheck;
use jewelcase_db::CatalogStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Catalog persistence, whichever backend is configured.
    pub store: Arc<dyn CatalogStore>,
    /// Server configuration (upload limits and directories are read per request).
    pub config: Arc<ServerConfig>,
    /// Admin credential check used by the login endpoint.
    pub credentials: Arc<dyn CredentialCheck>,
}
