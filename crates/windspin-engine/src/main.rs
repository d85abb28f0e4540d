//! Daemon binary for the Windspin simulation.
//!
//! Wires the spin engine to the Observer API and runs until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `windspin-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Build the wind sampler and rotation model, construct the engine
//! 4. Start the Observer API server
//! 5. Optionally start spinning (`timing.autostart`)
//! 6. Wait for `Ctrl-C`
//! 7. Stop the engine and shut the server down
//! 8. Log the final readings

mod error;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use windspin_core::SpinEngine;
use windspin_core::config::{LoggingConfig, WindspinConfig};
use windspin_observer::{AppState, ServerConfig};

use crate::error::DaemonError;

const CONFIG_PATH: &str = "windspin-config.yaml";

/// Grace period for in-flight HTTP requests after shutdown is signalled.
const SERVER_DRAIN: Duration = Duration::from_secs(5);

/// Application entry point for the Windspin daemon.
///
/// # Errors
///
/// Returns an error if configuration, engine construction, or server
/// startup fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. It carries the log level used when RUST_LOG is unset.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("windspin starting");
    info!(
        model = ?config.rotation.model,
        schema = ?config.source.schema,
        sample_interval_ms = config.timing.sample_interval_ms,
        accumulate_interval_ms = config.timing.accumulate_interval_ms,
        "Configuration loaded"
    );

    // 3. Construct the engine.
    let engine = Arc::new(SpinEngine::from_config(&config).map_err(DaemonError::from)?);
    info!(
        source = engine.sampler_name(),
        model = engine.model().name(),
        "Spin engine ready"
    );

    // 4. Start Observer API server.
    let server_config = ServerConfig::from(&config.observer);
    let app_state = Arc::new(AppState::with_config(Arc::clone(&engine), &config.observer));
    let server_token = CancellationToken::new();
    let observer_handle =
        windspin_observer::spawn_observer(&server_config, app_state, server_token.clone())
            .await
            .map_err(DaemonError::from)?;
    info!(
        host = %server_config.host,
        port = server_config.port,
        expose_rpm = config.observer.expose_rpm,
        "Observer API server started"
    );

    // 5. Optional autostart.
    if config.timing.autostart {
        engine.start().await.map_err(DaemonError::from)?;
    }

    // 6. Run until interrupted.
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| DaemonError::Signal {
            message: format!("{e}"),
        })?;
    info!("Shutdown signal received");

    // 7. Stop spinning, then drain the server.
    engine.shutdown().await;
    server_token.cancel();
    let abort = observer_handle.abort_handle();
    if tokio::time::timeout(SERVER_DRAIN, observer_handle).await.is_err() {
        warn!("Observer server did not drain in time, aborting");
        abort.abort();
    }

    // 8. Log results.
    let readings = engine.readings().snapshot().await;
    info!(
        spins = readings.spins,
        rpm = readings.rpm,
        samples_taken = readings.samples_taken,
        sample_failures = readings.sample_failures,
        "windspin shutdown complete"
    );

    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `logging.level` is used.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Load configuration from `windspin-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
/// Environment overrides apply whether or not the file exists.
fn load_config() -> Result<WindspinConfig, DaemonError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok(WindspinConfig::from_file(config_path)?)
    } else {
        let mut config = WindspinConfig::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }
}
