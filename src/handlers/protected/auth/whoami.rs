use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::middleware::AuthUser;

/// GET /api/auth/whoami - the caller's identity and permissions
pub async fn whoami(Extension(user): Extension<AuthUser>) -> Json<Value> {
    Json(json!({
        "user": {
            "id": user.id,
            "username": user.username,
            "role": user.role,
            "permissions": user.role.permissions(),
        }
    }))
}
