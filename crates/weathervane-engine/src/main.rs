//! Weathervane server binary.
//!
//! Wires the world service, the fixed-period world clock, and the client
//! gateway together and runs them until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `weathervane-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Validate configuration
//! 4. Build the connection registry and the world service
//! 5. Start the world clock loop
//! 6. Start the gateway (`WebSocket` + operator REST)
//! 7. Wait for `Ctrl-C`, then stop both and wait for them to finish

mod error;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use weathervane_core::config::WeathervaneConfig;
use weathervane_core::runner::run_world_clock;
use weathervane_core::service::WorldService;
use weathervane_gateway::startup::spawn_gateway;
use weathervane_gateway::{AppState, ConnectionRegistry};

use crate::error::EngineError;

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "weathervane-config.yaml";

#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging. `RUST_LOG` wins over the config.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("weathervane-engine starting");
    if !from_file {
        info!(path = CONFIG_PATH, "Config file not found, using defaults");
    }

    // 3. Validate configuration.
    config.validate()?;
    info!(
        bootup_hour = config.world.bootup_hour,
        bootup_minute = config.world.bootup_minute,
        tick_interval_ms = config.world.tick_interval_ms,
        use_wall_clock = config.world.use_wall_clock,
        divisions = config.grid.divisions,
        "Configuration loaded"
    );

    // 4. Registry and world service.
    let registry = Arc::new(ConnectionRegistry::new());
    let service = Arc::new(WorldService::new(&config, registry.clone())?);
    let state = Arc::new(AppState::new(Arc::clone(&service), registry));

    // 5. World clock.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let clock_handle = tokio::spawn(run_world_clock(
        Arc::clone(&service),
        Duration::from_millis(config.world.tick_interval_ms),
        shutdown_rx.clone(),
    ));

    // 6. Gateway.
    let gateway_handle = spawn_gateway(config.server.clone(), state, shutdown_rx)?;

    // 7. Run until interrupted.
    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    shutdown_tx.send_replace(true);

    match clock_handle.await {
        Ok(ticks) => info!(ticks, "World clock finished"),
        Err(e) => warn!(error = %e, "World clock task failed"),
    }
    if let Err(e) = gateway_handle.await {
        warn!(error = %e, "Gateway task failed");
    }

    info!("weathervane-engine stopped");
    Ok(())
}

/// Load configuration from [`CONFIG_PATH`], or defaults if it is absent.
///
/// Returns the config and whether it came from the file.
fn load_config() -> Result<(WeathervaneConfig, bool), EngineError> {
    let path = Path::new(CONFIG_PATH);
    if path.exists() {
        return Ok((WeathervaneConfig::from_file(path)?, true));
    }
    let mut config = WeathervaneConfig::default();
    config.server.apply_env_overrides();
    Ok((config, false))
}
