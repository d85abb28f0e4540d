//! Observer server startup helper for embedding in the daemon.
//!
//! [`spawn_observer`] binds the listener eagerly, so a taken port is
//! reported to the caller, then serves on a background Tokio task.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::server::{self, ServerConfig, ServerError};
use crate::state::AppState;

/// Spawn the Observer HTTP server on a background Tokio task.
///
/// The server runs until `shutdown` is cancelled. The caller should
/// hold the returned handle and await it (or abort it) during clean
/// shutdown.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address is invalid or the port
/// cannot be bound.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
    shutdown: CancellationToken,
) -> Result<JoinHandle<()>, ServerError> {
    let listener = server::bind(config).await?;

    let handle = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state, shutdown).await {
            tracing::error!(error = %e, "Observer server exited with error");
        }
    });

    tracing::info!(host = %config.host, port = config.port, "Observer server spawned on background task");

    Ok(handle)
}
