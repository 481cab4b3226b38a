use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Serialize;

use crate::auth::validate_jwt;
use crate::database::models::{Account, AccountStatus, OwnerId};
use crate::database::repository::AdminScope;
use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{Permission, Role};

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuthUser {
    pub id: OwnerId,
    pub username: String,
    pub role: Role,
}

impl From<Account> for AuthUser {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            role: account.role,
        }
    }
}

impl AuthUser {
    /// 403 unless the user's role grants `permission`
    pub fn require(&self, permission: Permission) -> Result<(), ApiError> {
        if self.role.has_permission(permission) {
            Ok(())
        } else {
            tracing::warn!(
                "User {} ({}) denied {}",
                self.username,
                self.role,
                permission
            );
            Err(ApiError::forbidden("Insufficient permissions"))
        }
    }

    pub fn admin_scope(&self) -> Result<AdminScope, ApiError> {
        AdminScope::for_role(self.role).ok_or_else(|| ApiError::forbidden("Admin access required"))
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Extract JWT from Authorization header
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;

    // Validate and decode JWT
    let claims = validate_jwt(&token, &state.config.security.jwt_secret)?;

    // The stored account decides the role once it exists
    let user = match state
        .accounts
        .resolve(claims.sub, &claims.username, claims.role)
        .await?
    {
        AccountStatus::Active(account) => AuthUser::from(account),
        AccountStatus::Removed => {
            tracing::warn!("Rejected token for removed account {}", claims.sub);
            return Err(ApiError::unauthorized("Account has been removed"));
        }
    };

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
