use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{OwnerId, ProfileUpdate};
use crate::error::ApiError;
use crate::handlers::protected::whiskeys::utils::json_body;
use crate::middleware::AuthUser;
use crate::server::AppState;
use crate::types::Role;

const NOT_FOUND: &str = "User not found";

#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub role: String,
}

fn parse_user_id(raw: &str) -> Result<OwnerId, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found(NOT_FOUND))
}

/// GET /api/admin/users - every active account
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let scope = user.admin_scope()?;
    let users = state.accounts.list(&scope).await?;

    Ok(Json(json!({ "users": users })))
}

/// PUT /api/admin/users/:id/role
pub async fn put_role(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<RoleChange>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let scope = user.admin_scope()?;
    let id = parse_user_id(&id)?;
    let role = json_body(payload)?
        .role
        .parse::<Role>()
        .map_err(|err| ApiError::bad_request(err.to_string()))?;

    if id == user.id {
        return Err(ApiError::bad_request("Cannot change your own role"));
    }

    let account = state
        .accounts
        .set_role(&scope, id, role)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    tracing::info!("Admin {} set user {} role to {}", user.username, id, role);
    Ok(Json(json!({
        "message": "User role updated successfully",
        "user": account,
    })))
}

/// PUT /api/admin/users/:id - edit another account's profile
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    user.admin_scope()?;
    let id = parse_user_id(&id)?;
    let profile = json_body(payload)?;

    let account = state
        .accounts
        .update_profile(id, profile)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    Ok(Json(json!({
        "message": "User updated successfully",
        "user": account,
    })))
}

/// DELETE /api/admin/users/:id - remove the account and its collection
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let scope = user.admin_scope()?;
    let id = parse_user_id(&id)?;

    if id == user.id {
        return Err(ApiError::bad_request("Cannot delete your own account"));
    }
    if state.accounts.find(id).await?.is_none() {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    let whiskeys_deleted = state.store.delete_all_owned_by(&scope, id).await?;
    state.accounts.remove(&scope, id).await?;

    tracing::warn!(
        "Admin {} deleted user {} and {} whiskeys",
        user.username,
        id,
        whiskeys_deleted
    );
    Ok(Json(json!({
        "message": "User deleted successfully",
        "whiskeys_deleted": whiskeys_deleted,
    })))
}
