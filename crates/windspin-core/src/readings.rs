//! Read-only access to the engine's rotational state.
//!
//! A [`Readings`] handle is a cheap clone of the engine's state lock. Each
//! accessor takes the lock for a single copy and releases it, so callers may
//! poll at any rate without holding up the background task for longer than
//! one field read.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::state::{SimulationState, SpinReadings};

/// Read-only facade over the shared [`SimulationState`].
#[derive(Debug, Clone)]
pub struct Readings {
    state: Arc<Mutex<SimulationState>>,
}

impl Readings {
    pub(crate) const fn new(state: Arc<Mutex<SimulationState>>) -> Self {
        Self { state }
    }

    /// Total revolutions accumulated so far.
    pub async fn spins(&self) -> f64 {
        self.state.lock().await.spins
    }

    /// Latest rotational speed in RPM; zero before any sample.
    pub async fn rpm(&self) -> f64 {
        self.state.lock().await.rpm
    }

    /// Whether a session is running.
    pub async fn is_active(&self) -> bool {
        self.state.lock().await.active
    }

    /// All fields, copied under one lock acquisition.
    pub async fn snapshot(&self) -> SpinReadings {
        self.state.lock().await.readings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_reflect_state() {
        let state = Arc::new(Mutex::new(SimulationState::default()));
        let readings = Readings::new(Arc::clone(&state));

        assert!(readings.spins().await.abs() < f64::EPSILON);
        assert!(!readings.is_active().await);

        {
            let mut guard = state.lock().await;
            guard.active = true;
            guard.apply_rpm(90.0);
            guard.accumulate();
        }

        assert!((readings.rpm().await - 90.0).abs() < f64::EPSILON);
        assert!((readings.spins().await - 1.5).abs() < 1e-9);
        let snap = readings.snapshot().await;
        assert!(snap.active);
        assert_eq!(snap.samples_taken, 1);
    }
}
