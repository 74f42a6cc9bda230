//! Tier list server binary.
//!
//! Loads configuration from the environment (and `.env`), opens the player
//! store on the configured port, and serves the HTTP API.
//!
//! ```bash
//! TIER_LIST_BIND=127.0.0.1:3000 TIER_LIST_DATA_DIR=./data cargo run --bin tier-list-server
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use tier_list::{
    http, CollectionPort, FileCollection, InMemoryCollection, PlayerStore, ServerConfig,
    StorageKind,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let config = ServerConfig::from_env();
    tracing::info!("Starting tier list server");
    tracing::info!("Storage: {:?} ({})", config.storage, config.storage_key);
    tracing::info!("Migration policy: {:?}", config.migration);

    let port = open_port(&config)?;
    let store = PlayerStore::open_with(port, config.migration)
        .context("failed to open player store")?;
    tracing::info!("Serving {} players", store.len()?);

    http::serve(Arc::new(store), &config.bind)
        .await
        .with_context(|| format!("server on {} failed", config.bind))?;

    Ok(())
}

fn setup_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tier_list=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn open_port(config: &ServerConfig) -> Result<Box<dyn CollectionPort>> {
    let port: Box<dyn CollectionPort> = match config.storage {
        StorageKind::File => {
            let port = FileCollection::with_key(&config.data_dir, config.storage_key.clone())
                .with_context(|| format!("failed to open {}", config.data_dir.display()))?;
            tracing::info!("Persisting players to {}", port.path().display());
            Box::new(port)
        }
        StorageKind::Memory => {
            tracing::warn!("In-memory storage: players are lost on restart");
            Box::new(InMemoryCollection::with_key(config.storage_key.clone()))
        }
    };
    Ok(port)
}
