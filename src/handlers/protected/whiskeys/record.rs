use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use super::utils::{json_body, parse_id, NOT_FOUND};
use crate::database::models::WhiskeyData;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::server::AppState;
use crate::types::Permission;

/// GET /api/whiskeys/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    user.require(Permission::ReadWhiskey)?;
    let id = parse_id(&id)?;

    let whiskey = state
        .store
        .find_by_id(id, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    Ok(Json(json!({ "whiskey": whiskey })))
}

/// PUT /api/whiskeys/:id - change only the supplied fields
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<WhiskeyData>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    user.require(Permission::UpdateWhiskey)?;
    let id = parse_id(&id)?;

    let mut data = json_body(payload)?;
    state.quantity_policy.apply(&user.username, &mut data);

    let whiskey = state
        .store
        .update(id, user.id, data)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    Ok(Json(json!({
        "message": "Whiskey updated successfully",
        "whiskey": whiskey,
    })))
}

/// DELETE /api/whiskeys/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    user.require(Permission::DeleteWhiskey)?;
    let id = parse_id(&id)?;

    if !state.store.delete(id, user.id).await? {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    tracing::info!("User {} deleted whiskey {}", user.username, id);
    Ok(Json(json!({ "message": "Whiskey deleted successfully" })))
}
