use tracing_subscriber::EnvFilter;

use whiskey_canon::{config, database, is_development, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("whiskey_canon=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Whiskey Canon API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }
    if is_development!() {
        tracing::warn!("Development mode: using the built-in JWT secret unless JWT_SECRET is set");
    }

    let stores = database::open_stores(&config.database).await?;
    let app = server::app(server::AppState::new(stores, config.clone()));

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("🥃 Whiskey Canon API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
