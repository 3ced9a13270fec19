//! Handlers for the catalog CRUD and bulk-replace endpoints.
//!
//! Responses carry the stored item (or item list) directly, without an
//! envelope, because that is what the storefront and admin scripts consume.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use jewelcase_core::catalog::{CatalogItem, CatalogItemInput, NewCatalogItem, ENTITY};
use jewelcase_core::error::CoreError;
use jewelcase_core::types::DbId;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

/// Response body of `POST /api/save`.
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: ENTITY, id })
}

/// GET /api/jewelry
///
/// Full catalog ordered by id.
pub async fn list_items(State(state): State<AppState>) -> AppResult<Json<Vec<CatalogItem>>> {
    let items = state.store.list().await?;
    Ok(Json(items))
}

/// GET /api/jewelry/{id}
pub async fn get_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<CatalogItem>> {
    let item = state.store.find(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(item))
}

/// POST /api/jewelry
///
/// Any `id` in the body is ignored; the store assigns one.
pub async fn create_item(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewCatalogItem>,
) -> AppResult<(StatusCode, Json<CatalogItem>)> {
    let item = state.store.create(input).await?;

    tracing::info!(item_id = item.id, name = %item.name, "Catalog item created");

    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/jewelry/{id}
///
/// Replaces the editable fields. The path id wins over any id in the body.
pub async fn update_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<NewCatalogItem>,
) -> AppResult<Json<CatalogItem>> {
    let item = state
        .store
        .update(id, input)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(item_id = id, "Catalog item updated");

    Ok(Json(item))
}

/// DELETE /api/jewelry/{id}
///
/// Returns the removed item.
pub async fn delete_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<CatalogItem>> {
    let item = state.store.delete(id).await?.ok_or_else(|| not_found(id))?;

    tracing::info!(item_id = id, "Catalog item deleted");

    Ok(Json(item))
}

/// POST /api/save
///
/// Atomically replaces the whole catalog with the request body.
pub async fn save_all(
    State(state): State<AppState>,
    ApiJson(items): ApiJson<Vec<CatalogItemInput>>,
) -> AppResult<Json<SaveResponse>> {
    let stored = state.store.replace_all(items).await?;

    tracing::info!(count = stored.len(), "Catalog replaced");

    Ok(Json(SaveResponse {
        success: true,
        message: "Data saved successfully".into(),
        count: stored.len(),
    }))
}
