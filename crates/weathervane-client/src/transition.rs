//! Client-side weather transition controller.
//!
//! A transition blends the visible weather to a new value over a bounded
//! window, then commits it. At most one transition is in flight:
//!
//! ```text
//!            request(target, secs)
//!   Idle ───────────────────────────▶ Transitioning
//!    ▲                                     │
//!    │  commit at secs*1000 - lead ms      │
//!    └─────────────────────────────────────┘
//! ```
//!
//! A request that arrives while another transition is in flight waits for
//! `Idle`, but never longer than its own duration; after that it proceeds
//! anyway. If it then starts a transition of its own, the older
//! transition's commit is discarded; if its target is already showing, the
//! older transition keeps the controller until it commits. Each transition
//! carries a generation number and only the latest generation's commit
//! touches the engine or releases the controller.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};
use weathervane_types::Weather;

use crate::config::{ClientConfig, MAX_TRANSITION_SECONDS};
use crate::effects::SnowEffects;
use crate::natives::WeatherNatives;

/// Whether a transition is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Ready to start a transition.
    Idle,
    /// A transition is blending towards its target.
    Transitioning,
}

/// What a call to [`TransitionController::request_transition`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The controller is frozen; nothing happened.
    Frozen,
    /// The target is already showing; no engine calls were made.
    Unchanged,
    /// A transition started and will commit at `commit_at`.
    Started {
        /// When the final state will be applied.
        commit_at: Instant,
    },
}

/// Point-in-time view of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionState {
    /// Whether a transition is in flight.
    pub in_progress: bool,
    /// Last weather a transition was started towards.
    pub current_weather: Weather,
    /// Most recent target still waiting for its turn.
    pub pending_target: Option<Weather>,
    /// Whether requests are being ignored.
    pub frozen: bool,
    /// Whether winter effects are on.
    pub winter_effects: bool,
}

struct Inner {
    current: Weather,
    pending: Option<Weather>,
    frozen: bool,
    generation: u64,
    effects: SnowEffects,
}

struct Shared<N> {
    phase: watch::Sender<Phase>,
    inner: Mutex<Inner>,
    natives: Arc<N>,
    max_transition_seconds: u32,
    commit_lead: Duration,
}

impl<N: WeatherNatives> Shared<N> {
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply the final state if `generation` is still the latest transition.
    fn commit(&self, target: Weather, generation: u64) {
        let inner = self.lock();
        if inner.generation != generation {
            debug!(%target, generation, latest = inner.generation, "Superseded commit discarded");
            return;
        }
        self.natives.set_weather_type_now(target);
        self.natives.set_weather_type_now_persist(target);
        drop(inner);
        self.phase.send_replace(Phase::Idle);
        debug!(%target, generation, "Weather transition committed");
    }
}

/// Drives weather transitions for one client.
pub struct TransitionController<N> {
    shared: Arc<Shared<N>>,
}

impl<N> Clone for TransitionController<N> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<N: WeatherNatives> TransitionController<N> {
    /// Create an idle controller showing `config.initial_weather`.
    pub fn new(natives: Arc<N>, config: &ClientConfig) -> Self {
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            shared: Arc::new(Shared {
                phase,
                inner: Mutex::new(Inner {
                    current: config.initial_weather,
                    pending: None,
                    frozen: false,
                    generation: 0,
                    effects: SnowEffects::default(),
                }),
                natives,
                max_transition_seconds: config.max_transition_seconds.min(MAX_TRANSITION_SECONDS),
                commit_lead: Duration::from_millis(config.commit_lead_ms),
            }),
        }
    }

    /// Start blending towards `target` over `duration_seconds` (clamped to
    /// the configured maximum).
    ///
    /// Waits for any in-flight transition to finish, bounded by this
    /// request's own duration.
    pub async fn request_transition(&self, target: Weather, duration_seconds: u32) -> TransitionOutcome {
        if self.shared.lock().frozen {
            debug!(%target, "Controller frozen; transition ignored");
            return TransitionOutcome::Frozen;
        }

        let seconds = duration_seconds.min(self.shared.max_transition_seconds);
        let window = Duration::from_secs(u64::from(seconds));
        self.shared.lock().pending = Some(target);

        let owned = self.acquire(target, window).await;

        let started = {
            let mut inner = self.shared.lock();
            if inner.pending == Some(target) {
                inner.pending = None;
            }
            if inner.current == target {
                None
            } else {
                let natives = self.shared.natives.as_ref();
                natives.clear_override_weather();
                natives.clear_weather_type_persist();
                natives.set_weather_type_overtime_persist(target, seconds);
                natives.set_weather_type_persist(target);
                inner.effects.apply(target, natives);
                inner.current = target;
                inner.generation = inner.generation.wrapping_add(1);
                Some(inner.generation)
            }
        };

        let Some(generation) = started else {
            // After a timeout the in-flight transition still owns the phase
            // and its commit returns the controller to `Idle`.
            if owned {
                self.shared.phase.send_replace(Phase::Idle);
            }
            debug!(%target, owned, "Weather already showing");
            return TransitionOutcome::Unchanged;
        };

        let delay = window.saturating_sub(self.shared.commit_lead);
        let now = Instant::now();
        let commit_at = now.checked_add(delay).unwrap_or(now);
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::time::sleep_until(commit_at).await;
            shared.commit(target, generation);
        });

        debug!(%target, seconds, generation, "Weather transition started");
        TransitionOutcome::Started { commit_at }
    }

    /// Move to `Transitioning`, waiting for `Idle` for at most `window`.
    ///
    /// Returns `true` if this request moved the phase itself, `false` if it
    /// gave up waiting while another transition was still in flight.
    async fn acquire(&self, target: Weather, window: Duration) -> bool {
        let now = Instant::now();
        let deadline = now.checked_add(window).unwrap_or(now);
        let mut idle = self.shared.phase.subscribe();

        loop {
            let timed_out = tokio::time::timeout_at(deadline, idle.wait_for(|p| *p == Phase::Idle))
                .await
                .is_err();
            if timed_out {
                warn!(%target, ?window, "Previous transition still running; proceeding anyway");
                return false;
            }

            let acquired = self.shared.phase.send_if_modified(|phase| {
                if *phase == Phase::Idle {
                    *phase = Phase::Transitioning;
                    true
                } else {
                    false
                }
            });
            if acquired {
                return true;
            }
        }
    }

    /// Ignore (`true`) or accept (`false`) further requests.
    pub fn freeze(&self, frozen: bool) {
        self.shared.lock().frozen = frozen;
        debug!(frozen, "Weather controller freeze toggled");
    }

    /// Last weather a transition was started towards.
    pub fn current_weather(&self) -> Weather {
        self.shared.lock().current
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        *self.shared.phase.borrow()
    }

    /// Snapshot of the controller.
    pub fn state(&self) -> TransitionState {
        let in_progress = self.phase() == Phase::Transitioning;
        let inner = self.shared.lock();
        TransitionState {
            in_progress,
            current_weather: inner.current,
            pending_target: inner.pending,
            frozen: inner.frozen,
            winter_effects: inner.effects.is_active(),
        }
    }
}
