//! # clubsync-api: Binary Entry Point
//!
//! Reads configuration from the environment, connects to Postgres if
//! configured, hydrates the in-memory stores and serves the API.

use clubsync_api::state::{AppConfig, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    tracing::info!(?config, "starting ClubSync API");

    // Optional: absent means memory (plus snapshot) only.
    let db_pool = clubsync_api::db::init_pool(config.database_url.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Database initialization failed: {e}");
            e
        })?;

    let port = config.port;
    let state = AppState::with_config(config, db_pool);
    state.hydrate().await.map_err(|e| {
        tracing::error!("Hydration failed: {e}");
        e
    })?;

    let app = clubsync_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("ClubSync API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
