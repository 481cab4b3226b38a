use axum::Json;
use serde_json::{json, Value};

/// GET / - service name, version and route overview
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Whiskey Canon API",
        "version": version,
        "description": "Personal whiskey collection management with CSV import/export",
        "endpoints": {
            "health": "/health (public)",
            "auth": "/api/auth/whoami (protected)",
            "whiskeys": "/api/whiskeys[/:id] (protected)",
            "search": "/api/whiskeys/search?q= (protected)",
            "stats": "/api/whiskeys/stats (protected)",
            "csv": "/api/whiskeys/export/csv, /api/whiskeys/import/csv (protected)",
            "admin": "/api/admin/whiskeys (admin only)",
        }
    }))
}
