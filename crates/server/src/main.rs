//! postprep server binary.
//!
//! Reads its configuration from the environment, opens the account store,
//! and serves the JSON API.

use std::sync::Arc;

use postprep_core::{AccountStore, JsonFileStore};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod routes;

use config::ServerConfig;
use routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let store: Arc<dyn AccountStore> = match &config.store_dir {
        Some(dir) => Arc::new(JsonFileStore::at(dir.clone())?),
        None => Arc::new(JsonFileStore::new()?),
    };

    if config.openrouter_api_key.is_none() {
        tracing::warn!("OPENROUTER_API_KEY not set; caption endpoint disabled");
    }
    if config.instagram.is_none() {
        tracing::warn!("Instagram app credentials not set; connect/publish endpoints disabled");
    }

    let state = AppState::new(store, &config);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %config.bind, "postprep server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
