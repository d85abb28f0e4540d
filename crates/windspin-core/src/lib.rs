//! Spin-simulation engine for Windspin.
//!
//! This crate samples a wind-speed signal, converts it into a rotor speed,
//! and accumulates a running revolution count while a session is active.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `windspin-config.yaml` into
//!   strongly-typed structs.
//! - [`engine`] -- [`SpinEngine`]: start/stop lifecycle and the background
//!   sampling/accumulation task.
//! - [`readings`] -- [`Readings`]: read-only accessors for HTTP callers.
//! - [`rotation`] -- [`RotationModel`]: wind speed to RPM.
//! - [`sampler`] -- [`WindSampler`]: synthetic and remote wind sources.
//! - [`state`] -- The shared [`SimulationState`] and its
//!   [`SpinReadings`] snapshot.
//!
//! [`SpinEngine`]: engine::SpinEngine
//! [`Readings`]: readings::Readings
//! [`RotationModel`]: rotation::RotationModel
//! [`WindSampler`]: sampler::WindSampler
//! [`SimulationState`]: state::SimulationState
//! [`SpinReadings`]: state::SpinReadings

pub mod config;
pub mod engine;
pub mod readings;
pub mod rotation;
pub mod sampler;
pub mod state;

pub use engine::{EngineError, SpinEngine, StartOutcome, StopOutcome};
pub use readings::Readings;
pub use state::SpinReadings;
