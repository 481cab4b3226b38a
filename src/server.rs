use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::repository::{AccountStore, WhiskeyStore};
use crate::database::Stores;
use crate::handlers::{elevated, protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::QuantityPolicy;

// Room for multipart boundaries and part headers around the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared handles for every request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn WhiskeyStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub config: Arc<AppConfig>,
    pub quantity_policy: Arc<QuantityPolicy>,
}

impl AppState {
    pub fn new(stores: Stores, config: AppConfig) -> Self {
        let quantity_policy = QuantityPolicy::from_config(&config.import);
        Self {
            store: stores.whiskeys,
            accounts: stores.accounts,
            config: Arc::new(config),
            quantity_policy: Arc::new(quantity_policy),
        }
    }
}

/// Build the full router: public routes, JWT-protected routes and global layers
pub fn app(state: AppState) -> Router {
    // Every /api route runs behind JWT validation
    let api = Router::new()
        .merge(auth_routes())
        .merge(whiskey_routes(&state.config))
        .merge(admin_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware));

    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(api)
        .layer(cors_layer(&state.config));

    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use protected::auth;

    Router::new()
        .route("/api/auth/whoami", get(auth::session_whoami))
        .route(
            "/api/auth/profile",
            get(auth::profile_get).put(auth::profile_put),
        )
}

fn whiskey_routes(config: &AppConfig) -> Router<AppState> {
    use protected::whiskeys;

    let upload_limit = config.api.max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        // Collection-level operations
        .route(
            "/api/whiskeys",
            get(whiskeys::whiskeys_list).post(whiskeys::whiskeys_create),
        )
        .route("/api/whiskeys/search", get(whiskeys::whiskeys_search))
        .route("/api/whiskeys/stats", get(whiskeys::whiskeys_stats))
        // CSV transfer
        .route("/api/whiskeys/export/csv", get(whiskeys::whiskeys_export_csv))
        .route(
            "/api/whiskeys/import/csv",
            post(whiskeys::whiskeys_import_csv).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Record-level operations
        .route(
            "/api/whiskeys/:id",
            get(whiskeys::whiskey_get)
                .put(whiskeys::whiskey_put)
                .delete(whiskeys::whiskey_delete),
        )
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/whiskeys", get(elevated::admin_whiskeys_list))
        .route("/api/admin/users", get(elevated::admin_users_list))
        .route(
            "/api/admin/users/:id",
            put(elevated::admin_user_put).delete(elevated::admin_user_delete),
        )
        .route("/api/admin/users/:id/role", put(elevated::admin_user_role_put))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() || config.security.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    }
}
