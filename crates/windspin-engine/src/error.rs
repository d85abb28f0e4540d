//! Error types for the Windspin daemon.
//!
//! [`DaemonError`] is the top-level error type that wraps every failure
//! mode during startup and shutdown.

/// Top-level error for the Windspin daemon.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: windspin_core::config::ConfigError,
    },

    /// The engine could not be built or started.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: windspin_core::EngineError,
    },

    /// Observer API server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying server error.
        #[from]
        source: windspin_observer::ServerError,
    },

    /// Waiting for the shutdown signal failed.
    #[error("signal error: {message}")]
    Signal {
        /// Description of the signal failure.
        message: String,
    },
}
