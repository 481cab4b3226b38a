use axum::{extract::State, Extension, Json};

use crate::database::repository::WhiskeyFilters;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::server::AppState;
use crate::services::CollectionStats;
use crate::types::Permission;

/// GET /api/whiskeys/stats
pub async fn stats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CollectionStats>, ApiError> {
    user.require(Permission::ReadWhiskey)?;

    let records = state.store.find_all(&WhiskeyFilters::owner(user.id)).await?;
    Ok(Json(CollectionStats::from_records(&records)))
}
