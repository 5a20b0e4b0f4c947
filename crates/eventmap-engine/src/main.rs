//! Engine binary for the Event Map.
//!
//! Wires the map session to its collaborators and serves the map API until
//! `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `eventmap-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Connect to `PostgreSQL` and run migrations
//! 4. Connect to `Dragonfly`
//! 5. Spawn the map session with the broadcast renderer
//! 6. Serve the map API until a shutdown signal arrives
//! 7. Stop the session and close connections

mod error;
mod render_bridge;

use std::path::Path;
use std::sync::Arc;

use eventmap_core::config::LoggingConfig;
use eventmap_core::{EventMapConfig, MapSession, ViewCoordinator};
use eventmap_db::{DragonflyFilterStore, DragonflyPool, PgEventStore, PostgresConfig, PostgresPool};
use eventmap_observer::{AppState, MapboxGeocoder, ServerConfig, ViewFeed};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::render_bridge::BroadcastRenderer;

/// Name of the configuration file, relative to the working directory.
const CONFIG_FILE: &str = "eventmap-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, infrastructure, or the server fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config, from_file) = load_config()?;
    init_logging(&config.logging);

    info!(from_file, "eventmap-engine starting");
    info!(
        timezone = %config.map.timezone,
        radius = config.clustering.radius,
        max_cluster_zoom = config.clustering.max_cluster_zoom,
        "Configuration loaded"
    );

    // Persistence.
    let postgres = PostgresPool::connect(&PostgresConfig::from(&config.infrastructure))
        .await
        .map_err(EngineError::from)?;
    postgres.run_migrations().await.map_err(EngineError::from)?;
    let dragonfly = DragonflyPool::connect(&config.infrastructure.dragonfly_url)
        .await
        .map_err(EngineError::from)?;

    // Session.
    let feed = ViewFeed::new();
    let clock = Arc::new(config.map.clock());
    let coordinator =
        ViewCoordinator::new(config.coordinator_settings(), clock).map_err(EngineError::from)?;
    let session = MapSession::new(
        coordinator,
        Arc::new(PgEventStore::new(&postgres)),
        Arc::new(DragonflyFilterStore::new(dragonfly.clone())),
        Arc::new(BroadcastRenderer::new(feed.clone())),
    )
    .spawn(config.infrastructure.command_buffer);

    // Map API.
    let geocoder = MapboxGeocoder::new(&config.geocoder).map_err(|e| EngineError::Geocoder {
        message: e.to_string(),
    })?;
    if !geocoder.is_enabled() {
        warn!("No Mapbox token configured, submissions will not be geocoded");
    }
    let state = Arc::new(AppState::new(session.commands.clone(), feed, geocoder));
    let server_config = ServerConfig {
        port: config.infrastructure.observer_port,
        ..ServerConfig::default()
    };
    let served = eventmap_observer::start_server(&server_config, state, shutdown_signal()).await;

    // Teardown runs even when the server failed.
    session.shutdown().await;
    postgres.close().await;
    dragonfly.close().await;

    served.map_err(|e| EngineError::Observer {
        message: e.to_string(),
    })?;
    info!("eventmap-engine stopped");
    Ok(())
}

/// Load configuration from [`CONFIG_FILE`], falling back to defaults.
///
/// Returns the config and whether it came from the file. Environment
/// overrides apply either way.
fn load_config() -> Result<(EventMapConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        Ok((EventMapConfig::from_file(config_path)?, true))
    } else {
        let mut config = EventMapConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Resolves on `Ctrl-C`.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        // Without a signal handler, run until killed.
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
