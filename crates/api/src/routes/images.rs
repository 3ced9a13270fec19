use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, post};
use axum::Router;

use crate::handlers::images;
use crate::state::AppState;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Image routes mounted at `/api`.
///
/// ```text
/// POST   /upload           -> upload_image (multipart, field `image`)
/// DELETE /images?path=     -> delete_image
/// ```
///
/// The upload route raises axum's default body limit to the configured
/// maximum upload size; the handler then enforces the exact file limit.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            post(images::upload_image).layer(DefaultBodyLimit::max(
                max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
            )),
        )
        .route("/images", delete(images::delete_image))
}
