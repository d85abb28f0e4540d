//! REST endpoint handlers for the Observer server.
//!
//! Control handlers call into the engine; reading handlers only touch the
//! [`Readings`](windspin_core::Readings) facade.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `POST` | `/start` | Start spinning (idempotent) |
//! | `POST` | `/stop` | Stop spinning (idempotent) |
//! | `GET` | `/spins` | `Total spins: {spins:.2}` |
//! | `GET` | `/rpm` | `{rpm:.2}` |
//! | `GET` | `/api/status` | Full readings as JSON |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use tracing::info;
use windspin_core::{SpinReadings, StartOutcome, StopOutcome};

use crate::error::ObserverError;
use crate::state::AppState;

/// Response body for `GET /api/status`.
#[derive(Debug, serde::Serialize)]
pub struct StatusResponse {
    /// Current readings.
    #[serde(flatten)]
    pub readings: SpinReadings,
    /// Wind source in use (`synthetic` or `remote`).
    pub source: &'static str,
    /// Rotation model in use.
    pub model: &'static str,
}

// ---------------------------------------------------------------------------
// POST /start, POST /stop
// ---------------------------------------------------------------------------

/// Start the simulation. Repeated calls while spinning are no-ops and
/// still answer with the same confirmation.
pub async fn start(State(state): State<Arc<AppState>>) -> Result<&'static str, ObserverError> {
    if state.engine.start().await? == StartOutcome::AlreadyActive {
        info!("start requested while already spinning");
    }
    Ok("Spinning started")
}

/// Stop the simulation. Returns once the background task has exited.
pub async fn stop(State(state): State<Arc<AppState>>) -> &'static str {
    if state.engine.stop().await == StopOutcome::AlreadyIdle {
        info!("stop requested while idle");
    }
    "Spinning stopped"
}

// ---------------------------------------------------------------------------
// GET /spins, GET /rpm
// ---------------------------------------------------------------------------

/// Total accumulated revolutions, two decimals.
pub async fn spins(State(state): State<Arc<AppState>>) -> String {
    let spins = state.readings.spins().await;
    format!("Total spins: {spins:.2}")
}

/// Current rotational speed, two decimals.
pub async fn rpm(State(state): State<Arc<AppState>>) -> String {
    let rpm = state.readings.rpm().await;
    format!("{rpm:.2}")
}

// ---------------------------------------------------------------------------
// GET /api/status
// ---------------------------------------------------------------------------

/// Every reading plus the source and model names.
pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readings = state.readings.snapshot().await;
    Json(StatusResponse {
        readings,
        source: state.engine.sampler_name(),
        model: state.engine.model().name(),
    })
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing the current readings and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readings = state.readings.snapshot().await;
    let (status_class, status_text) = if readings.active {
        ("status spinning", "SPINNING")
    } else {
        ("status idle", "IDLE")
    };
    let spins = format!("{:.2}", readings.spins);
    let rpm = format!("{:.2}", readings.rpm);
    let samples = readings.samples_taken;
    let failures = readings.sample_failures;
    let source = state.engine.sampler_name();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Windspin</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .status {{ font-weight: bold; }}
        .spinning {{ color: #3fb950; }}
        .idle {{ color: #d29922; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Windspin</h1>
    <p class="subtitle">Wind-driven rotor simulation ({source} wind)</p>

    <p>Status: <span class="{status_class}">{status_text}</span></p>

    <div>
        <div class="metric">
            <div class="label">Spins</div>
            <div class="value">{spins}</div>
        </div>
        <div class="metric">
            <div class="label">RPM</div>
            <div class="value">{rpm}</div>
        </div>
        <div class="metric">
            <div class="label">Samples</div>
            <div class="value">{samples}</div>
        </div>
        <div class="metric">
            <div class="label">Failed samples</div>
            <div class="value">{failures}</div>
        </div>
    </div>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li><code>POST /start</code> -- Start spinning</li>
        <li><code>POST /stop</code> -- Stop spinning</li>
        <li><code>GET /spins</code> -- Total spins</li>
        <li><code>GET /rpm</code> -- Current RPM</li>
        <li><code>GET /api/status</code> -- All readings as JSON</li>
        <li><code>ws://host:port/ws/spins</code> -- Live readings stream</li>
    </ul>
</body>
</html>"#
    ))
}
