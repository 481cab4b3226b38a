use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::utils::non_blank;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::server::AppState;
use crate::types::Permission;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// GET /api/whiskeys/search?q= - free-text search over the caller's whiskeys
pub async fn search(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, ApiError> {
    user.require(Permission::ReadWhiskey)?;

    let q = non_blank(query.q).ok_or_else(|| ApiError::bad_request("Search query is required"))?;
    let whiskeys = state.store.search(&q, user.id).await?;

    Ok(Json(json!({ "whiskeys": whiskeys })))
}
