//! `WebSocket` handler for live readings streaming.
//!
//! Clients connect to `GET /ws/spins` and receive a JSON-encoded
//! [`SpinReadings`] text frame every stream interval while the engine is
//! spinning. Nothing is sent while idle; the connection stays open and
//! resumes once a new session starts.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};
use windspin_core::SpinReadings;

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming readings.
///
/// # Route
///
/// `GET /ws/spins`
pub async fn ws_spins(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Encode a readings snapshot as a text frame, or `None` while idle.
///
/// # Errors
///
/// Returns the serializer error if the snapshot cannot be encoded.
pub fn readings_frame(readings: &SpinReadings) -> Result<Option<Message>, serde_json::Error> {
    if !readings.active {
        return Ok(None);
    }
    let json = serde_json::to_string(readings)?;
    Ok(Some(Message::Text(json.into())))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("WebSocket client connected");

    let mut ticker = tokio::time::interval(state.stream_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let readings = state.readings.snapshot().await;
                let frame = match readings_frame(&readings) {
                    Ok(Some(frame)) => frame,
                    Ok(None) => continue,
                    Err(e) => {
                        warn!("Failed to serialize readings: {e}");
                        continue;
                    }
                };
                if socket.send(frame).await.is_err() {
                    debug!("WebSocket client disconnected (send failed)");
                    return;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    // Client text/binary frames carry nothing we act on.
                    _ => {}
                }
            }
        }
    }
}
