//! Image upload and deletion.
//!
//! Uploaded files land in the configured uploads directory under a generated
//! name and are served back at `/images/<name>`. Clients refer to them as
//! `./images/<name>`.

use std::io::ErrorKind;
use std::path::Path;

use axum::extract::{Multipart, State};
use axum::Json;
use jewelcase_core::upload::{
    generate_filename, public_path, resolve_image_filename, validate_image_mime,
    validate_upload_size, UploadRejection, UPLOAD_FIELD,
};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, AppResult};
use crate::extract::ApiQuery;
use crate::response::SuccessMessage;
use crate::state::AppState;

/// Response body of `POST /api/upload`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    /// Path to store in the item's `image` field.
    pub file_path: String,
    pub filename: String,
    pub originalname: String,
}

/// Query parameters for `DELETE /api/images`.
#[derive(Debug, Deserialize)]
pub struct ImagePathParams {
    pub path: Option<String>,
}

/// POST /api/upload
///
/// Multipart upload with the file in the `image` field. The content type is
/// checked before the body is read, and the size after, so a rejected upload
/// never touches the uploads directory.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let max = state.config.max_upload_bytes;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        validate_image_mime(field.content_type())?;
        let originalname = field.file_name().unwrap_or("upload").to_string();
        let data = field.bytes().await?;
        validate_upload_size(data.len(), max)?;

        let filename = generate_filename(&originalname);
        write_new_file(&state.config.upload_dir, &filename, &data).await?;

        tracing::info!(
            filename = %filename,
            originalname = %originalname,
            size = data.len(),
            "Image uploaded",
        );

        return Ok(Json(UploadResponse {
            success: true,
            file_path: public_path(&filename),
            filename,
            originalname,
        }));
    }

    Err(UploadRejection::MissingFile.into())
}

/// DELETE /api/images?path=...
///
/// Only the final component of `path` is used, resolved inside the uploads
/// directory.
pub async fn delete_image(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ImagePathParams>,
) -> AppResult<Json<SuccessMessage>> {
    let requested = params
        .path
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Image path is required".into()))?;

    let filename = resolve_image_filename(&requested)?;
    let full_path = state.config.upload_dir.join(&filename);

    match tokio::fs::remove_file(&full_path).await {
        Ok(()) => {
            tracing::info!(filename = %filename, "Image deleted");
            Ok(Json(SuccessMessage::new("Image deleted successfully")))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(AppError::NotFound("Image file not found".into()))
        }
        Err(e) => Err(AppError::InternalError(format!(
            "Failed to delete {}: {e}",
            full_path.display()
        ))),
    }
}

/// Write `data` to `dir/filename`, refusing to overwrite an existing file.
async fn write_new_file(dir: &Path, filename: &str, data: &[u8]) -> AppResult<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create {}: {e}", dir.display())))?;

    let path = dir.join(filename);
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to open {}: {e}", path.display())))?;

    if let Err(e) = file.write_all(data).await {
        drop(file);
        let _ = tokio::fs::remove_file(&path).await;
        return Err(AppError::InternalError(format!(
            "Failed to write {}: {e}",
            path.display()
        )));
    }
    file.flush()
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to flush {}: {e}", path.display())))?;

    Ok(())
}
