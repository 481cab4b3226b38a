use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::utils::{json_body, non_blank};
use crate::database::models::{WhiskeyData, WhiskeyType};
use crate::database::repository::WhiskeyFilters;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::server::AppState;
use crate::types::Permission;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub whiskey_type: Option<String>,
    pub distillery: Option<String>,
}

/// GET /api/whiskeys - the caller's whiskeys, optionally filtered by type and distillery
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    user.require(Permission::ReadWhiskey)?;

    let whiskey_type = non_blank(query.whiskey_type)
        .map(|t| t.parse::<WhiskeyType>())
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let filters = WhiskeyFilters {
        whiskey_type,
        distillery: non_blank(query.distillery),
        ..WhiskeyFilters::owner(user.id)
    };
    let whiskeys = state.store.find_all(&filters).await?;

    Ok(Json(json!({ "whiskeys": whiskeys })))
}

/// POST /api/whiskeys - create a whiskey owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<WhiskeyData>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    user.require(Permission::CreateWhiskey)?;

    let mut data = json_body(payload)?;
    state.quantity_policy.apply(&user.username, &mut data);

    let whiskey = state.store.create(user.id, data).await?;
    tracing::info!("User {} created whiskey {}", user.username, whiskey.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Whiskey created successfully",
            "whiskey": whiskey,
        })),
    ))
}
