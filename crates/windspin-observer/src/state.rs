//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the engine (for start/stop) and a [`Readings`] handle
//! (for everything else), plus the observer settings that shape routing and
//! streaming.

use std::sync::Arc;
use std::time::Duration;

use windspin_core::config::ObserverConfig;
use windspin_core::{Readings, SpinEngine};

/// Floor for the stream period; a zero period would never yield.
const MIN_STREAM_INTERVAL: Duration = Duration::from_millis(1);

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// The engine driven by the control endpoints.
    pub engine: Arc<SpinEngine>,
    /// Read-only view used by the reading endpoints and the stream.
    pub readings: Readings,
    /// Whether `GET /rpm` is routed.
    pub expose_rpm: bool,
    /// Period of the `WebSocket` readings stream.
    pub stream_interval: Duration,
}

impl AppState {
    /// Create application state with default observer settings.
    pub fn new(engine: Arc<SpinEngine>) -> Self {
        Self::with_config(engine, &ObserverConfig::default())
    }

    /// Create application state using the given observer settings.
    pub fn with_config(engine: Arc<SpinEngine>, config: &ObserverConfig) -> Self {
        let readings = engine.readings();
        Self {
            engine,
            readings,
            expose_rpm: config.expose_rpm,
            stream_interval: config.stream_interval().max(MIN_STREAM_INTERVAL),
        }
    }
}
