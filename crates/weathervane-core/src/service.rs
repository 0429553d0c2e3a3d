//! The authoritative world service.
//!
//! [`WorldService`] owns the clock, the band grid, the rotation schedule, and
//! the operator overrides behind a single async mutex, so every read sees
//! one consistent combination of them. Weather is computed on read: a tick
//! only moves the clock and, on rollover, rotates the schedule. Clients pull
//! their weather with [`WorldService::weather_update_requested`]; the only
//! push is the one-shot broadcast when a weather override is activated.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use weathervane_types::{ConnectionId, Position, ServerMessage, Weather};
use weathervane_world::{Grid, GridSpec, RotationSchedule, WorldError};

use crate::clock::{ClockError, LocalWallClock, TickSource, TimeRule, WallClock, WorldClock};
use crate::config::{ConfigError, WeathervaneConfig};
use crate::overrides::{HourInput, OverrideController, OverrideError, OverrideState};
use crate::transport::{TransportError, WeatherTransport};

/// Errors that can occur in world service operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A grid or schedule operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// The schedule length does not match the number of bands.
    #[error("rotation schedule has {schedule} entries but the grid has {bands} bands")]
    ScheduleMismatch {
        /// Number of bands in the grid.
        bands: usize,
        /// Number of entries in the offered schedule.
        schedule: usize,
    },

    /// A message could not be delivered.
    #[error("transport error: {source}")]
    Transport {
        /// The underlying transport error.
        #[from]
        source: TransportError,
    },

    /// An override request was invalid.
    #[error("override error: {source}")]
    Override {
        /// The underlying override error.
        #[from]
        source: OverrideError,
    },

    /// The clock could not be built.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The configuration could not be interpreted.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },
}

/// What one call to [`WorldService::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Ticks executed since startup, including this one.
    pub tick: u64,
    /// Which source moved the clock.
    pub source: TickSource,
    /// Whether the schedule rotated.
    pub rotated: bool,
    /// Clock hour after the tick.
    pub hour: u8,
    /// Clock minute after the tick.
    pub minute: u8,
}

/// One band and the weather currently observed in it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandWeather {
    /// Band index, top of the map first.
    pub index: usize,
    /// Lower bound of the band.
    pub min: f64,
    /// Upper bound of the band.
    pub max: f64,
    /// Effective weather, overrides applied.
    pub weather: Weather,
}

/// A consistent view of the whole world state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Ticks executed since startup.
    pub tick: u64,
    /// Clock hour, ignoring the time override.
    pub clock_hour: u8,
    /// Clock minute.
    pub clock_minute: u8,
    /// Hour every observer sees.
    pub effective_hour: u8,
    /// Minute every observer sees.
    pub effective_minute: u8,
    /// Whether the clock follows the wall clock.
    pub use_wall_clock: bool,
    /// Whether a time rule is registered.
    pub time_rule_registered: bool,
    /// Rotations since the schedule was last replaced, modulo its length.
    pub rotation_phase: usize,
    /// Schedule entries in band order.
    pub rotation: Vec<Weather>,
    /// Operator override state.
    pub overrides: OverrideState,
    /// Per-band effective weather.
    pub bands: Vec<BandWeather>,
}

/// Everything guarded by the service lock.
struct WorldState {
    clock: WorldClock,
    grid: Grid,
    schedule: RotationSchedule,
    overrides: OverrideController,
    rule: Option<Box<dyn TimeRule>>,
    wall_clock: Box<dyn WallClock>,
    ticks: u64,
}

impl WorldState {
    /// Time every observer sees. A time override pins the minute to zero.
    const fn effective_time(&self) -> (u8, u8) {
        let hour = self.overrides.effective_hour(self.clock.hour());
        if self.overrides.state().time_active {
            (hour, 0)
        } else {
            (hour, self.clock.minute())
        }
    }

    fn effective_weather(&self, band: usize) -> Result<Weather, WorldError> {
        self.overrides.effective_weather(band, &self.schedule)
    }
}

/// The single authoritative owner of clock, grid, schedule, and overrides.
pub struct WorldService {
    state: Mutex<WorldState>,
    transport: Arc<dyn WeatherTransport>,

    /// Duration sent with every weather update.
    transition_seconds: u32,
}

impl WorldService {
    /// Build the service from validated configuration, reading the local
    /// wall clock in wall-clock mode.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::ScheduleMismatch`] if the rotation length
    /// differs from the number of bands, or another variant if the grid,
    /// clock, or weather names are invalid.
    pub fn new(config: &WeathervaneConfig, transport: Arc<dyn WeatherTransport>) -> Result<Self, ServiceError> {
        Self::with_wall_clock(config, transport, Box::new(LocalWallClock))
    }

    /// Build the service with an explicit wall clock.
    ///
    /// # Errors
    ///
    /// Same as [`WorldService::new`].
    pub fn with_wall_clock(
        config: &WeathervaneConfig,
        transport: Arc<dyn WeatherTransport>,
        wall_clock: Box<dyn WallClock>,
    ) -> Result<Self, ServiceError> {
        let grid = Grid::new(config.grid.spec())?;
        let rotation = config.weather.rotation()?;
        if rotation.len() != grid.len() {
            return Err(ServiceError::ScheduleMismatch {
                bands: grid.len(),
                schedule: rotation.len(),
            });
        }
        let schedule = RotationSchedule::new(rotation)?;
        let clock = WorldClock::new(&config.world)?;
        let overrides = OverrideController::new(config.weather.default_override()?);

        info!(
            bands = grid.len(),
            hour = clock.hour(),
            minute = clock.minute(),
            use_wall_clock = clock.use_wall_clock(),
            "World service initialized"
        );

        Ok(Self {
            state: Mutex::new(WorldState {
                clock,
                grid,
                schedule,
                overrides,
                rule: None,
                wall_clock,
                ticks: 0,
            }),
            transport,
            transition_seconds: config.weather.transition_seconds,
        })
    }

    /// Duration, in seconds, clients are told to spend on each transition.
    pub const fn transition_seconds(&self) -> u32 {
        self.transition_seconds
    }

    /// Run one clock step and rotate the schedule if the clock says so.
    pub async fn tick(&self) -> TickReport {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let advance = state
            .clock
            .advance(state.rule.as_deref_mut(), state.wall_clock.as_ref());
        if advance.rotate {
            state.schedule.rotate();
        }
        state.ticks = state.ticks.saturating_add(1);

        let report = TickReport {
            tick: state.ticks,
            source: advance.source,
            rotated: advance.rotate,
            hour: state.clock.hour(),
            minute: state.clock.minute(),
        };
        debug!(
            tick = report.tick,
            source = ?report.source,
            rotated = report.rotated,
            hour = report.hour,
            minute = report.minute,
            phase = state.schedule.phase(),
            "World clock ticked"
        );
        report
    }

    /// Replace the clock logic with `rule` until cleared.
    pub async fn register_time_rule(&self, rule: Box<dyn TimeRule>) {
        self.state.lock().await.rule = Some(rule);
        info!("Time rule registered");
    }

    /// Return to the built-in clock logic. Returns whether a rule was set.
    pub async fn clear_time_rule(&self) -> bool {
        let had_rule = self.state.lock().await.rule.take().is_some();
        if had_rule {
            info!("Time rule cleared");
        }
        had_rule
    }

    /// Set the weather override and, if that newly activates or changes an
    /// active override, broadcast it to every client.
    ///
    /// Returns whether the override state changed.
    pub async fn set_weather_override(&self, active: bool, name: Option<Weather>) -> bool {
        let (changed, state) = {
            let mut guard = self.state.lock().await;
            let changed = guard.overrides.set_weather(active, name);
            (changed, guard.overrides.state())
        };
        if !changed {
            return false;
        }

        info!(active, weather = ?state.weather, "Weather override updated");
        if let (true, Some(weather)) = (active, state.weather) {
            let reached = self.transport.broadcast(ServerMessage::WeatherOverride { weather });
            debug!(%weather, reached, "Weather override broadcast");
        }
        true
    }

    /// Stop overriding the weather. Returns whether an override was active.
    pub async fn clear_weather_override(&self) -> bool {
        let cleared = self.state.lock().await.overrides.clear_weather();
        if cleared {
            info!("Weather override cleared");
        }
        cleared
    }

    /// Set the time override. Returns whether the override state changed.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Override`] if the hour is invalid or missing;
    /// nothing changes in that case.
    pub async fn set_time_override(&self, active: bool, hour: Option<&HourInput>) -> Result<bool, ServiceError> {
        let (changed, state) = {
            let mut guard = self.state.lock().await;
            let changed = guard.overrides.set_time(active, hour)?;
            (changed, guard.overrides.state())
        };
        if changed {
            info!(active, hour = ?state.time_hour, "Time override updated");
        }
        Ok(changed)
    }

    /// Stop overriding the time. Returns whether an override was active.
    pub async fn clear_time_override(&self) -> bool {
        let cleared = self.state.lock().await.overrides.clear_time();
        if cleared {
            info!("Time override cleared");
        }
        cleared
    }

    /// Weather currently observed in `band`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::World`] if `band` is out of range and no
    /// weather override is active.
    pub async fn effective_weather(&self, band: usize) -> Result<Weather, ServiceError> {
        Ok(self.state.lock().await.effective_weather(band)?)
    }

    /// Hour currently observed by everyone.
    pub async fn effective_hour(&self) -> u8 {
        self.state.lock().await.effective_time().0
    }

    /// Band containing `position`, or band 0 if unknown.
    pub async fn band_for(&self, position: Option<&Position>) -> usize {
        self.state.lock().await.grid.resolve(position)
    }

    /// Answer a client's weather request: send its band's weather, then the
    /// current time, to that connection only.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Transport`] if the connection is gone; the
    /// failure is logged and not retried.
    pub async fn weather_update_requested(
        &self,
        connection: ConnectionId,
        position: Option<Position>,
    ) -> Result<Weather, ServiceError> {
        let (band, weather, (hour, minute)) = {
            let state = self.state.lock().await;
            let band = state.grid.resolve(position.as_ref());
            match state.effective_weather(band) {
                Ok(weather) => (band, weather, state.effective_time()),
                Err(e) => {
                    warn!(%connection, band, error = %e, "No weather for band");
                    return Err(e.into());
                }
            }
        };
        debug!(%connection, band, %weather, hour, minute, "Weather update requested");

        let updates = [
            ServerMessage::WeatherUpdate {
                weather,
                duration_seconds: self.transition_seconds,
            },
            ServerMessage::TimeUpdate { hour, minute },
        ];
        for message in updates {
            if let Err(e) = self.transport.send_to(connection, message) {
                warn!(%connection, error = %e, "Failed to deliver weather update");
                return Err(e.into());
            }
        }
        Ok(weather)
    }

    /// Replace the rotation schedule. Nothing is pushed; clients pick the
    /// new weather up on their next request.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::ScheduleMismatch`] if `sequence` does not have
    /// one entry per band; the schedule is unchanged in that case.
    pub async fn set_weather_rotation(&self, sequence: Vec<Weather>) -> Result<(), ServiceError> {
        let mut state = self.state.lock().await;
        if sequence.len() != state.grid.len() {
            return Err(ServiceError::ScheduleMismatch {
                bands: state.grid.len(),
                schedule: sequence.len(),
            });
        }
        let len = sequence.len();
        state.schedule.replace(sequence)?;
        info!(entries = len, "Weather rotation replaced");
        Ok(())
    }

    /// Regenerate the grid with `divisions` bands and install a matching
    /// rotation in the same step.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::ScheduleMismatch`] if `rotation` does not have
    /// `divisions` entries, or [`ServiceError::World`] if the grid cannot be
    /// generated. Nothing changes on error.
    pub async fn reconfigure_grid(&self, divisions: u32, rotation: Vec<Weather>) -> Result<(), ServiceError> {
        let mut state = self.state.lock().await;
        let spec = GridSpec {
            divisions,
            ..state.grid.spec()
        };
        let grid = Grid::new(spec)?;
        if rotation.len() != grid.len() {
            return Err(ServiceError::ScheduleMismatch {
                bands: grid.len(),
                schedule: rotation.len(),
            });
        }
        let schedule = RotationSchedule::new(rotation)?;
        state.grid = grid;
        state.schedule = schedule;
        info!(divisions, "Weather grid reconfigured");
        Ok(())
    }

    /// Consistent view of clock, overrides, and per-band weather.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::World`] only if the grid and schedule have
    /// diverged in size, which construction rules out.
    pub async fn snapshot(&self) -> Result<WorldSnapshot, ServiceError> {
        let state = self.state.lock().await;
        let bands = state
            .grid
            .bands()
            .iter()
            .enumerate()
            .map(|(index, band)| {
                Ok(BandWeather {
                    index,
                    min: band.min,
                    max: band.max,
                    weather: state.effective_weather(index)?,
                })
            })
            .collect::<Result<Vec<_>, WorldError>>()?;
        let (effective_hour, effective_minute) = state.effective_time();

        Ok(WorldSnapshot {
            tick: state.ticks,
            clock_hour: state.clock.hour(),
            clock_minute: state.clock.minute(),
            effective_hour,
            effective_minute,
            use_wall_clock: state.clock.use_wall_clock(),
            time_rule_registered: state.rule.is_some(),
            rotation_phase: state.schedule.phase(),
            rotation: state.schedule.to_vec(),
            overrides: state.overrides.state(),
            bands,
        })
    }
}

impl core::fmt::Debug for WorldService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WorldService")
            .field("transition_seconds", &self.transition_seconds)
            .finish_non_exhaustive()
    }
}
