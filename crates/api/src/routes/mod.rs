pub mod auth;
pub mod catalog;
pub mod health;
pub mod images;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /jewelry                 list, create
/// /jewelry/{id}            get, update, delete
/// /save                    bulk replace (POST)
/// /upload                  image upload (POST, multipart)
/// /images?path=            image delete (DELETE)
/// /login                   admin credential check (POST)
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .merge(catalog::router())
        .merge(images::router(config.max_upload_bytes))
        .merge(auth::router())
}
