//! Spin-simulation engine: session lifecycle and the background task.
//!
//! [`SpinEngine`] is a two-state machine (`Idle`, `Spinning`) guarding one
//! shared [`SimulationState`]. While spinning, a single Tokio task runs two
//! periodic actions off one `tokio::select!` wait point:
//!
//! - **Sampling** (coarse, default 3 minutes): ask the [`WindSampler`] for a
//!   reading, convert it with the [`RotationModel`], replace the RPM. A
//!   failed sample keeps the previous RPM and is retried on the next tick.
//! - **Accumulation** (fine, default 1 second): add `rpm / 60` to the running
//!   total.
//!
//! The cancellation signal shares that wait point with `biased;` ordering, so
//! once a session's token is cancelled no further tick is started.
//!
//! # Locks
//!
//! Two `tokio::sync::Mutex`es with disjoint roles:
//!
//! - the *state* lock protects [`SimulationState`]; it is held only for a
//!   field update or copy, never across a network call;
//! - the *session* lock serializes [`start`](SpinEngine::start) and
//!   [`stop`](SpinEngine::stop) so that at most one background task exists.
//!   Readers and the background task never take it.
//!
//! [`stop`](SpinEngine::stop) returns only after the background task has
//! finished and `active` has been cleared, so a reader that sees the engine
//! idle will never see the total move again until the next start.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{TimingConfig, WindspinConfig};
use crate::readings::Readings;
use crate::rotation::RotationModel;
use crate::sampler::{SampleError, WindSampler};
use crate::state::SimulationState;

/// Shortest period accepted for either timer.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Errors surfaced by engine construction and [`SpinEngine::start`].
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The background task could not be spawned because no Tokio runtime
    /// is driving the caller.
    #[error("cannot spawn spin task: {0}")]
    NoRuntime(String),

    /// The configured wind source could not be built.
    #[error("sampler error: {source}")]
    Sampler {
        /// The underlying sampler error.
        #[from]
        source: SampleError,
    },
}

/// What [`SpinEngine::start`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new session and background task were created.
    Started,
    /// A session was already running; nothing changed.
    AlreadyActive,
}

/// What [`SpinEngine::stop`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The running session was cancelled and its task joined.
    Stopped,
    /// No session was running; nothing changed.
    AlreadyIdle,
}

/// One running session: the token that ends it and the task it ends.
struct Session {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// The spin-simulation engine.
///
/// Construct once at process start, share behind an [`Arc`], and call
/// [`shutdown`](Self::shutdown) before the runtime goes away.
pub struct SpinEngine {
    state: Arc<Mutex<SimulationState>>,
    session: Arc<Mutex<Option<Session>>>,
    sampler: Arc<WindSampler>,
    model: RotationModel,
    sample_interval: Duration,
    accumulate_interval: Duration,
}

impl SpinEngine {
    /// Create an idle engine with zeroed state.
    pub fn new(sampler: WindSampler, model: RotationModel, timing: &TimingConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimulationState::default())),
            session: Arc::new(Mutex::new(None)),
            sampler: Arc::new(sampler),
            model,
            sample_interval: timing.sample_interval().max(MIN_PERIOD),
            accumulate_interval: timing.accumulate_interval().max(MIN_PERIOD),
        }
    }

    /// Build the sampler and model described by `config` and wrap them.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Sampler`] if the remote client cannot be built.
    pub fn from_config(config: &WindspinConfig) -> Result<Self, EngineError> {
        let sampler = WindSampler::from_config(&config.source)?;
        let model = RotationModel::from_config(&config.rotation);
        Ok(Self::new(sampler, model, &config.timing))
    }

    /// A read-only handle onto this engine's state.
    pub fn readings(&self) -> Readings {
        Readings::new(Arc::clone(&self.state))
    }

    /// The active rotation model.
    pub const fn model(&self) -> &RotationModel {
        &self.model
    }

    /// Name of the configured wind source.
    pub fn sampler_name(&self) -> &'static str {
        self.sampler.name()
    }

    /// Whether a session (and therefore a background task) exists.
    pub async fn is_spinning(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Begin spinning.
    ///
    /// In `Idle`: creates a fresh cancellation token, marks the state
    /// active, spawns the background task, then samples once immediately
    /// so an RPM is available before the first coarse tick. A failed
    /// immediate sample is logged and the session still starts.
    ///
    /// The immediate sample runs after the session lock is released and
    /// races the session token: a concurrent [`stop`](Self::stop) ends the
    /// session at once and the sample is dropped unapplied. A concurrent
    /// start sees the new session and returns without waiting for it.
    ///
    /// In `Spinning`: returns [`StartOutcome::AlreadyActive`] without
    /// touching anything.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoRuntime`] if called outside a Tokio runtime.
    pub async fn start(&self) -> Result<StartOutcome, EngineError> {
        let mut session = self.session.lock().await;
        if session.is_some() {
            debug!("start ignored: already spinning");
            return Ok(StartOutcome::AlreadyActive);
        }

        let runtime = Handle::try_current().map_err(|e| EngineError::NoRuntime(format!("{e}")))?;

        let token = CancellationToken::new();
        {
            let mut state = self.state.lock().await;
            state.active = true;
            state.started_at = Some(Utc::now());
            state.stopped_at = None;
        }

        let task = SpinTask {
            state: Arc::clone(&self.state),
            sampler: Arc::clone(&self.sampler),
            model: self.model,
            sample_interval: self.sample_interval,
            accumulate_interval: self.accumulate_interval,
            token: token.child_token(),
        };
        let handle = runtime.spawn(task.run());
        let session_token = token.clone();
        *session = Some(Session { token, handle });
        drop(session);

        info!(
            source = self.sampler.name(),
            model = self.model.name(),
            sample_interval_ms = self.sample_interval.as_millis(),
            accumulate_interval_ms = self.accumulate_interval.as_millis(),
            "spinning started"
        );

        // The session lock is already released, so a stop can cancel the
        // session while this first fetch is still in flight.
        tokio::select! {
            biased;
            () = session_token.cancelled() => {
                debug!("initial sample abandoned: session stopped");
            }
            () = sample_and_apply(&self.sampler, &self.model, &self.state) => {}
        }

        Ok(StartOutcome::Started)
    }

    /// Stop spinning and freeze the total.
    ///
    /// In `Spinning`: cancels the session token (once), waits for the
    /// background task to exit, then clears `active`. In `Idle`: returns
    /// [`StopOutcome::AlreadyIdle`].
    ///
    /// The wind-down runs on its own task while holding the session lock,
    /// so dropping this future part way through cannot leave the engine
    /// half-stopped or let a concurrent start slip in.
    pub async fn stop(&self) -> StopOutcome {
        let guard = Arc::clone(&self.session).lock_owned().await;
        let state = Arc::clone(&self.state);

        match Handle::try_current() {
            Ok(runtime) => match runtime.spawn(finish_session(guard, state)).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(error = %e, "stop task failed");
                    StopOutcome::Stopped
                }
            },
            Err(_) => finish_session(guard, state).await,
        }
    }

    /// Stop any running session ahead of process exit.
    pub async fn shutdown(&self) {
        if self.stop().await == StopOutcome::Stopped {
            info!("active session stopped for shutdown");
        }
    }
}

/// Cancel and join the session held by `guard`, then mark the state idle.
async fn finish_session(
    mut guard: OwnedMutexGuard<Option<Session>>,
    state: Arc<Mutex<SimulationState>>,
) -> StopOutcome {
    let Some(Session { token, handle }) = guard.take() else {
        debug!("stop ignored: already idle");
        return StopOutcome::AlreadyIdle;
    };

    token.cancel();
    if let Err(e) = handle.await {
        error!(error = %e, "spin task terminated abnormally");
    }

    let readings = {
        let mut state = state.lock().await;
        state.active = false;
        state.stopped_at = Some(Utc::now());
        state.readings()
    };

    info!(
        spins = readings.spins,
        rpm = readings.rpm,
        samples_taken = readings.samples_taken,
        sample_failures = readings.sample_failures,
        "spinning stopped"
    );

    StopOutcome::Stopped
}

/// Fetch one reading and, on success, replace the RPM.
///
/// The fetch happens with no lock held.
async fn sample_and_apply(
    sampler: &WindSampler,
    model: &RotationModel,
    state: &Mutex<SimulationState>,
) {
    match sampler.sample().await {
        Ok(wind_speed) => {
            let rpm = model.rpm(wind_speed);
            state.lock().await.apply_rpm(rpm);
            debug!(wind_speed, rpm, source = sampler.name(), "wind sampled");
        }
        Err(e) => {
            state.lock().await.record_failure();
            warn!(error = %e, source = sampler.name(), "wind sample failed, keeping previous rpm");
        }
    }
}

/// The background task of one session.
struct SpinTask {
    state: Arc<Mutex<SimulationState>>,
    sampler: Arc<WindSampler>,
    model: RotationModel,
    sample_interval: Duration,
    accumulate_interval: Duration,
    token: CancellationToken,
}

impl SpinTask {
    async fn run(self) {
        let mut sample_tick = interval(self.sample_interval);
        sample_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut accumulate_tick = interval(self.accumulate_interval);

        // Both intervals complete their first tick immediately; start has
        // already sampled, and nothing has elapsed to accumulate yet.
        sample_tick.tick().await;
        accumulate_tick.tick().await;

        loop {
            tokio::select! {
                biased;

                () = self.token.cancelled() => break,

                _ = sample_tick.tick() => {
                    tokio::select! {
                        biased;
                        () = self.token.cancelled() => break,
                        () = sample_and_apply(&self.sampler, &self.model, &self.state) => {}
                    }
                }

                _ = accumulate_tick.tick() => {
                    self.state.lock().await.accumulate();
                }
            }
        }

        debug!("spin task exiting");
    }
}
