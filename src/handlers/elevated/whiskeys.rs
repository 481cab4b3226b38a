use axum::{extract::State, Extension, Json};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::database::models::{Account, Whiskey};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::server::AppState;
use crate::types::Role;

/// A record annotated with who owns it
#[derive(Debug, Serialize)]
struct OwnedWhiskey<'a> {
    #[serde(flatten)]
    whiskey: &'a Whiskey,
    owner_username: Option<&'a str>,
    owner_email: Option<&'a str>,
    owner_role: Option<Role>,
}

impl<'a> OwnedWhiskey<'a> {
    fn new(whiskey: &'a Whiskey, owner: Option<&'a Account>) -> Self {
        Self {
            whiskey,
            owner_username: owner.map(|a| a.username.as_str()),
            owner_email: owner.and_then(|a| a.email.as_deref()),
            owner_role: owner.map(|a| a.role),
        }
    }
}

/// GET /api/admin/whiskeys - every record across owners
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let scope = user.admin_scope()?;
    let whiskeys = state.store.find_all_owners(&scope).await?;
    let accounts = state.accounts.list(&scope).await?;

    let owners: HashMap<_, _> = accounts.iter().map(|a| (a.id, a)).collect();
    let annotated: Vec<_> = whiskeys
        .iter()
        .map(|w| OwnedWhiskey::new(w, owners.get(&w.created_by).copied()))
        .collect();

    tracing::info!("Admin {} listed {} whiskeys", user.username, annotated.len());
    Ok(Json(json!({ "whiskeys": annotated })))
}
