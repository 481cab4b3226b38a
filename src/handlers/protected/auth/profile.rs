use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::database::models::ProfileUpdate;
use crate::error::ApiError;
use crate::handlers::protected::whiskeys::utils::json_body;
use crate::middleware::AuthUser;
use crate::server::AppState;

const NOT_FOUND: &str = "User not found";

/// GET /api/auth/profile - the caller's stored account
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let account = state
        .accounts
        .find(user.id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    Ok(Json(json!({ "user": account })))
}

/// PUT /api/auth/profile - update email and display names
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let profile = json_body(payload)?;

    let account = state
        .accounts
        .update_profile(user.id, profile)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    tracing::info!("User {} updated their profile", user.username);
    Ok(Json(json!({
        "message": "Profile updated successfully",
        "user": account,
    })))
}
