//! Shared rotational state and its read-only projection.
//!
//! [`SimulationState`] is the only mutable resource the engine shares. It
//! lives behind one `tokio::sync::Mutex` owned by the engine; every field is
//! read and written under that lock. [`SpinReadings`] is a plain copy taken
//! while the lock is held, safe to serialize and hand to HTTP callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rotation::SECONDS_PER_MINUTE;

/// Mutable rotational state of one engine.
///
/// Created once with the engine (`active = false`, zero totals) and mutated
/// only by start, stop, and the background task. `spins` never decreases
/// while `active` is set, and is frozen while it is clear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationState {
    /// Whether a session is running.
    pub active: bool,
    /// Running total of revolutions across all sessions.
    pub spins: f64,
    /// Latest rotational speed in revolutions per minute.
    pub rpm: f64,
    /// When the current (or last) session started.
    pub started_at: Option<DateTime<Utc>>,
    /// When the last session stopped. Cleared on start.
    pub stopped_at: Option<DateTime<Utc>>,
    /// Successful samples applied since the engine was created.
    pub samples_taken: u64,
    /// Failed sampling attempts since the engine was created.
    pub sample_failures: u64,
}

impl SimulationState {
    /// Credit one fine tick: add the per-second share of the current RPM.
    ///
    /// Does nothing while inactive.
    pub const fn accumulate(&mut self) {
        if self.active {
            self.spins += self.rpm / SECONDS_PER_MINUTE;
        }
    }

    /// Replace the rotational speed with a freshly sampled value.
    pub const fn apply_rpm(&mut self, rpm: f64) {
        self.rpm = rpm;
        self.samples_taken = self.samples_taken.saturating_add(1);
    }

    /// Record a failed sample. The previous RPM is kept.
    pub const fn record_failure(&mut self) {
        self.sample_failures = self.sample_failures.saturating_add(1);
    }

    /// Copy the current values out.
    pub const fn readings(&self) -> SpinReadings {
        SpinReadings {
            active: self.active,
            spins: self.spins,
            rpm: self.rpm,
            started_at: self.started_at,
            stopped_at: self.stopped_at,
            samples_taken: self.samples_taken,
            sample_failures: self.sample_failures,
        }
    }
}

/// JSON-serializable snapshot of [`SimulationState`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpinReadings {
    /// Whether a session is running.
    pub active: bool,
    /// Running total of revolutions.
    pub spins: f64,
    /// Latest rotational speed in revolutions per minute.
    pub rpm: f64,
    /// When the current (or last) session started.
    pub started_at: Option<DateTime<Utc>>,
    /// When the last session stopped.
    pub stopped_at: Option<DateTime<Utc>>,
    /// Successful samples applied.
    pub samples_taken: u64,
    /// Failed sampling attempts.
    pub sample_failures: u64,
}
