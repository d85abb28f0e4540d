//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `POST /start`, `POST /stop` -- session control
/// - `GET /spins` -- accumulated total
/// - `GET /rpm` -- current speed, only when `expose_rpm` is set
/// - `GET /api/status` -- every reading as JSON
/// - `GET /ws/spins` -- `WebSocket` readings stream
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/", get(handlers::index))
        .route("/start", post(handlers::start))
        .route("/stop", post(handlers::stop))
        .route("/spins", get(handlers::spins))
        .route("/api/status", get(handlers::status))
        .route("/ws/spins", get(ws::ws_spins));

    if state.expose_rpm {
        router = router.route("/rpm", get(handlers::rpm));
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
