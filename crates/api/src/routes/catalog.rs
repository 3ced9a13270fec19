use axum::routing::{get, post};
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

/// Catalog routes mounted at `/api`.
///
/// ```text
/// GET    /jewelry          -> list_items
/// POST   /jewelry          -> create_item
/// GET    /jewelry/{id}     -> get_item
/// PUT    /jewelry/{id}     -> update_item
/// DELETE /jewelry/{id}     -> delete_item
/// POST   /save             -> save_all
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/jewelry", get(catalog::list_items).post(catalog::create_item))
        .route(
            "/jewelry/{id}",
            get(catalog::get_item)
                .put(catalog::update_item)
                .delete(catalog::delete_item),
        )
        .route("/save", post(catalog::save_all))
}
