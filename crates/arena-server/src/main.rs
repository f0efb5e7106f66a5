//! Leaderboard server binary for the Arena leaderboard.
//!
//! This is the main entry point that wires together the player
//! directory, the ranking engine, and the HTTP API. It loads
//! configuration, seeds the directory, and serves requests until the
//! process is terminated.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `arena-config.yaml`
//! 3. Create the player directory and seed it per configuration
//! 4. Build the leaderboard engine
//! 5. Serve the HTTP API

use std::path::Path;
use std::sync::Arc;

use arena_api::{AppState, ServerConfig, start_server};
use arena_core::{ArenaConfig, InMemoryDirectory, Leaderboard, PlayerDirectory};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application entry point for the leaderboard server.
///
/// # Errors
///
/// Returns an error if configuration loading or server startup fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("arena-server starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        rank_policy = ?config.engine.rank_policy,
        cache_ttl_ms = config.engine.cache_ttl_ms,
        full_refresh_every = config.engine.full_refresh_every,
        "Configuration loaded"
    );

    // 3. Create and seed the player directory.
    let directory = Arc::new(InMemoryDirectory::new());
    if config.seed.players > 0 {
        let ids = directory.register_batch(config.seed.players);
        info!(players_seeded = ids.len(), "Player directory seeded");
    }

    // 4. Build the leaderboard engine.
    let engine = Leaderboard::new(
        Arc::clone(&directory) as Arc<dyn PlayerDirectory>,
        &config.engine,
    );
    let state = AppState::shared(engine);
    info!("Leaderboard engine initialized");

    // 5. Serve the HTTP API.
    let server_config = ServerConfig {
        host: config.http.host.clone(),
        port: config.http.port,
    };
    start_server(&server_config, state).await?;

    info!("arena-server shutdown complete");
    Ok(())
}

/// Load the leaderboard configuration from `arena-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
fn load_config() -> Result<ArenaConfig, arena_core::ConfigError> {
    let config_path = Path::new("arena-config.yaml");
    if config_path.exists() {
        ArenaConfig::from_file(config_path)
    } else {
        info!("Config file not found, using defaults");
        let mut config = ArenaConfig::default();
        config.infrastructure.apply_env_overrides();
        Ok(config)
    }
}
