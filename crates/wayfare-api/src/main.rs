//! Service entrypoint: tracing, configuration, database pool, storage
//! client, and the axum server.

use wayfare_api::config::AppConfig;
use wayfare_api::state::AppState;
use wayfare_api::storage::Storage;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wayfare_api=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    let db_pool = wayfare_api::db::init_pool().await?;

    let storage = match &config.storage {
        Some(storage_config) => Some(Storage::connect(storage_config).await),
        None => {
            tracing::warn!("media storage not configured — media routes will answer 503");
            None
        }
    };

    let port = config.port;
    let state = AppState::with_config(config, db_pool, storage);
    let app = wayfare_api::app(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "wayfare-api listening");
    axum::serve(listener, app).await?;

    Ok(())
}
