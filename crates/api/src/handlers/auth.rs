use axum::extract::State;
use axum::Json;
use jewelcase_core::auth::authenticate;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::response::SuccessMessage;
use crate::state::AppState;

/// Request body for `POST /api/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/login
///
/// Checks the admin panel credentials. No session is issued; 401 on mismatch.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginRequest>,
) -> AppResult<Json<SuccessMessage>> {
    if let Err(e) = authenticate(state.credentials.as_ref(), &input.username, &input.password) {
        tracing::warn!(username = %input.username, "Admin login rejected");
        return Err(e.into());
    }

    tracing::info!(username = %input.username, "Admin login accepted");
    Ok(Json(SuccessMessage::new("Login successful")))
}
