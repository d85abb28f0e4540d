//! Observer API server for the Windspin engine.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Control endpoints** (`POST /start`, `POST /stop`) that drive the
//!   [`SpinEngine`] lifecycle
//! - **Reading endpoints** (`GET /spins`, `GET /rpm`, `GET /api/status`)
//!   served from the engine's [`Readings`] facade
//! - **`WebSocket` endpoint** (`/ws/spins`) pushing readings on an interval
//!   while the engine is spinning
//! - **Minimal HTML dashboard** (`GET /`) showing the current readings
//!
//! # Architecture
//!
//! Handlers never touch the engine's state directly. Reads go through
//! [`Readings`], which holds the state lock only long enough to copy a
//! value, so polling clients cannot stall the accumulator.
//!
//! [`SpinEngine`]: windspin_core::SpinEngine
//! [`Readings`]: windspin_core::Readings

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use startup::spawn_observer;
pub use state::AppState;
