//! World clock and time tracking for Weathervane.
//!
//! The clock is the single source of truth for the time of day. It advances
//! once per tick through one of three sources, checked in strict order:
//!
//! 1. A registered [`TimeRule`] -- replaces the clock logic entirely.
//! 2. The server's wall clock, when `use_wall_clock` is set.
//! 3. Manual mode -- `minutes_per_tick` simulated minutes per tick.
//!
//! The clock never touches the rotation schedule itself; it reports through
//! [`ClockAdvance::rotate`] whether the schedule should advance this tick.

use std::sync::{Mutex, PoisonError};

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::config::WorldSettings;

/// Minutes in an hour.
const MINUTES_PER_HOUR: u8 = 60;

/// Hours in a day.
const HOURS_PER_DAY: u8 = 24;

/// Errors that can occur during clock construction.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Invalid time configuration (e.g. zero minutes per tick).
    #[error("invalid time configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Result of evaluating a [`TimeRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRuleOutcome {
    /// Hour to adopt, taken verbatim.
    pub hour: u8,
    /// Minute to adopt, taken verbatim.
    pub minute: u8,
    /// Whether the weather schedule rotates this tick.
    pub advance_weather: bool,
}

impl TimeRuleOutcome {
    /// Read an outcome from untyped rule output.
    ///
    /// Accepts an object with integer `hour` and `minute` fields and an
    /// optional boolean `advanceWeather` (or `updateWeather`). Anything else
    /// yields `None`, which the tick treats as a rejected rule result.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let hour = u8::try_from(object.get("hour")?.as_u64()?).ok()?;
        let minute = u8::try_from(object.get("minute")?.as_u64()?).ok()?;
        let advance_weather = object
            .get("advanceWeather")
            .or_else(|| object.get("updateWeather"))
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        Some(Self {
            hour,
            minute,
            advance_weather,
        })
    }
}

/// An injected rule that fully replaces the clock's own advance logic.
///
/// Returning `None` means the rule produced nothing usable this tick; the
/// clock logs a warning and leaves the time unchanged.
pub trait TimeRule: Send {
    /// Produce this tick's time, or `None` if the rule has no answer.
    fn evaluate(&mut self) -> Option<TimeRuleOutcome>;
}

impl<F> TimeRule for F
where
    F: FnMut() -> Option<TimeRuleOutcome> + Send,
{
    fn evaluate(&mut self) -> Option<TimeRuleOutcome> {
        self()
    }
}

/// Adapter for rules that produce untyped JSON, such as scripted rules.
pub struct JsonTimeRule<F>(pub F);

impl<F> TimeRule for JsonTimeRule<F>
where
    F: FnMut() -> serde_json::Value + Send,
{
    fn evaluate(&mut self) -> Option<TimeRuleOutcome> {
        TimeRuleOutcome::from_json(&(self.0)())
    }
}

/// A reading of a wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallTime {
    /// Hour of day.
    pub hour: u8,
    /// Minute of hour.
    pub minute: u8,
}

/// Source of wall-clock time for wall-clock mode.
pub trait WallClock: Send + Sync {
    /// Current hour and minute.
    fn now(&self) -> WallTime;
}

/// The server's local time zone, via `chrono`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalWallClock;

impl WallClock for LocalWallClock {
    fn now(&self) -> WallTime {
        let now = chrono::Local::now();
        WallTime {
            hour: u8::try_from(now.hour()).unwrap_or(0),
            minute: u8::try_from(now.minute()).unwrap_or(0),
        }
    }
}

/// A settable wall clock for tests and replays.
#[derive(Debug)]
pub struct FixedWallClock {
    time: Mutex<WallTime>,
}

impl FixedWallClock {
    /// Create a clock frozen at `hour:minute`.
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self {
            time: Mutex::new(WallTime { hour, minute }),
        }
    }

    /// Move the clock to `hour:minute`.
    pub fn set(&self, hour: u8, minute: u8) {
        let mut guard = self.time.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = WallTime { hour, minute };
    }
}

impl WallClock for FixedWallClock {
    fn now(&self) -> WallTime {
        *self.time.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Which source moved the clock on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickSource {
    /// A time rule supplied the time.
    Rule,
    /// A time rule was registered but returned nothing; time unchanged.
    RuleRejected,
    /// Read from the wall clock.
    WallClock,
    /// Advanced by `minutes_per_tick`.
    Manual,
}

/// What a single clock tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockAdvance {
    /// Which source moved the clock.
    pub source: TickSource,
    /// Whether the rotation schedule must advance once.
    pub rotate: bool,
}

/// Authoritative hour/minute counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldClock {
    /// Hour of day, `0..=23` unless a time rule set something else.
    hour: u8,

    /// Minute of hour.
    minute: u8,

    /// Simulated minutes per tick in manual mode (`1..=60`).
    minutes_per_tick: u8,

    /// Read the wall clock instead of simulating.
    use_wall_clock: bool,
}

impl WorldClock {
    /// Create a clock at the configured bootup time.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if the bootup time or the
    /// per-tick increment is out of range.
    pub fn new(settings: &WorldSettings) -> Result<Self, ClockError> {
        Self::from_parts(
            settings.bootup_hour,
            settings.bootup_minute,
            settings.minutes_per_tick,
            settings.use_wall_clock,
        )
    }

    /// Create a clock from explicit parameters (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `hour > 23`, `minute > 59`,
    /// or `minutes_per_tick` is outside `1..=60`. Keeping the increment at
    /// most one hour guarantees at most one rollover per tick.
    pub fn from_parts(
        hour: u8,
        minute: u8,
        minutes_per_tick: u8,
        use_wall_clock: bool,
    ) -> Result<Self, ClockError> {
        if hour >= HOURS_PER_DAY {
            return Err(ClockError::InvalidConfig {
                reason: format!("hour {hour} out of range 0..=23"),
            });
        }
        if minute >= MINUTES_PER_HOUR {
            return Err(ClockError::InvalidConfig {
                reason: format!("minute {minute} out of range 0..=59"),
            });
        }
        if minutes_per_tick == 0 || minutes_per_tick > MINUTES_PER_HOUR {
            return Err(ClockError::InvalidConfig {
                reason: format!("minutes_per_tick {minutes_per_tick} out of range 1..=60"),
            });
        }
        Ok(Self {
            hour,
            minute,
            minutes_per_tick,
            use_wall_clock,
        })
    }

    /// Current hour.
    pub const fn hour(&self) -> u8 {
        self.hour
    }

    /// Current minute.
    pub const fn minute(&self) -> u8 {
        self.minute
    }

    /// Whether the clock follows the wall clock.
    pub const fn use_wall_clock(&self) -> bool {
        self.use_wall_clock
    }

    /// Advance the clock by one tick.
    ///
    /// A registered `rule` always wins; otherwise wall-clock or manual mode
    /// applies. See the module docs for the exact precedence.
    pub fn advance(&mut self, rule: Option<&mut (dyn TimeRule + 'static)>, wall: &dyn WallClock) -> ClockAdvance {
        if let Some(rule) = rule {
            return match rule.evaluate() {
                Some(outcome) => {
                    self.hour = outcome.hour;
                    self.minute = outcome.minute;
                    ClockAdvance {
                        source: TickSource::Rule,
                        rotate: outcome.advance_weather,
                    }
                }
                None => {
                    tracing::warn!(
                        hour = self.hour,
                        minute = self.minute,
                        "Time rule returned no usable time; clock unchanged this tick"
                    );
                    ClockAdvance {
                        source: TickSource::RuleRejected,
                        rotate: false,
                    }
                }
            };
        }

        if self.use_wall_clock {
            let now = wall.now();
            self.hour = now.hour;
            self.minute = now.minute;
            return ClockAdvance {
                source: TickSource::WallClock,
                rotate: now.minute == 0 || now.minute == 30,
            };
        }

        ClockAdvance {
            source: TickSource::Manual,
            rotate: self.advance_manual(),
        }
    }

    /// Add `minutes_per_tick`, carrying into the hour. Returns whether the
    /// hour rolled over.
    fn advance_manual(&mut self) -> bool {
        let total = self.minute.saturating_add(self.minutes_per_tick);
        let rolled = match total.checked_sub(MINUTES_PER_HOUR) {
            Some(carry) => {
                self.minute = carry;
                self.hour = self.hour.saturating_add(1);
                true
            }
            None => {
                self.minute = total;
                false
            }
        };
        if self.hour >= HOURS_PER_DAY {
            self.hour = 0;
        }
        rolled
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    fn manual(hour: u8, minute: u8, per_tick: u8) -> WorldClock {
        WorldClock::from_parts(hour, minute, per_tick, false).unwrap()
    }

    #[test]
    fn clock_starts_at_bootup_time() {
        let clock = WorldClock::new(&WorldSettings::default()).unwrap();
        assert_eq!((clock.hour(), clock.minute()), (8, 0));
        assert!(!clock.use_wall_clock());
    }

    #[test]
    fn manual_tick_adds_minutes() {
        let mut clock = manual(10, 20, 1);
        let advance = clock.advance(None, &LocalWallClock);
        assert_eq!((clock.hour(), clock.minute()), (10, 21));
        assert_eq!(advance.source, TickSource::Manual);
        assert!(!advance.rotate);
    }

    #[test]
    fn midnight_rollover_rotates_once() {
        let mut clock = manual(23, 55, 10);
        let advance = clock.advance(None, &LocalWallClock);
        assert_eq!((clock.hour(), clock.minute()), (0, 5));
        assert!(advance.rotate);
    }

    #[test]
    fn rotation_happens_exactly_once_per_hour() {
        let mut clock = manual(0, 0, 1);
        let mut rotations = 0_u32;
        for _ in 0..(24 * 60) {
            if clock.advance(None, &LocalWallClock).rotate {
                rotations += 1;
            }
        }
        assert_eq!(rotations, 24);
        assert_eq!((clock.hour(), clock.minute()), (0, 0));
    }

    #[test]
    fn full_hour_increment_rotates_every_tick() {
        let mut clock = manual(22, 30, 60);
        assert!(clock.advance(None, &LocalWallClock).rotate);
        assert_eq!((clock.hour(), clock.minute()), (23, 30));
        assert!(clock.advance(None, &LocalWallClock).rotate);
        assert_eq!((clock.hour(), clock.minute()), (0, 30));
    }

    #[test]
    fn wall_clock_rotates_only_on_half_hours() {
        let wall = FixedWallClock::new(0, 0);
        let mut clock = WorldClock::from_parts(0, 0, 1, true).unwrap();
        for hour in 0..24 {
            for minute in 0..60 {
                wall.set(hour, minute);
                let advance = clock.advance(None, &wall);
                assert_eq!(advance.source, TickSource::WallClock);
                assert_eq!(advance.rotate, minute == 0 || minute == 30, "{hour}:{minute}");
                assert_eq!((clock.hour(), clock.minute()), (hour, minute));
            }
        }
    }

    #[test]
    fn rule_beats_wall_clock() {
        let wall = FixedWallClock::new(12, 0);
        let mut clock = WorldClock::from_parts(0, 0, 1, true).unwrap();
        let mut rule = || {
            Some(TimeRuleOutcome {
                hour: 3,
                minute: 33,
                advance_weather: false,
            })
        };
        let advance = clock.advance(Some(&mut rule), &wall);
        assert_eq!(advance.source, TickSource::Rule);
        assert!(!advance.rotate);
        assert_eq!((clock.hour(), clock.minute()), (3, 33));
    }

    #[test]
    fn rule_values_are_adopted_verbatim() {
        let mut clock = manual(5, 0, 1);
        let mut rule = || {
            Some(TimeRuleOutcome {
                hour: 30,
                minute: 75,
                advance_weather: true,
            })
        };
        let advance = clock.advance(Some(&mut rule), &LocalWallClock);
        assert!(advance.rotate);
        assert_eq!((clock.hour(), clock.minute()), (30, 75));
    }

    #[test]
    fn rejected_rule_leaves_clock_unchanged() {
        let mut clock = manual(5, 59, 1);
        let mut rule = || -> Option<TimeRuleOutcome> { None };
        let advance = clock.advance(Some(&mut rule), &LocalWallClock);
        assert_eq!(advance.source, TickSource::RuleRejected);
        assert!(!advance.rotate);
        assert_eq!((clock.hour(), clock.minute()), (5, 59));
    }

    #[test]
    fn json_rule_shapes() {
        let good = serde_json::json!({"hour": 6, "minute": 45, "updateWeather": true});
        assert_eq!(
            TimeRuleOutcome::from_json(&good),
            Some(TimeRuleOutcome {
                hour: 6,
                minute: 45,
                advance_weather: true,
            })
        );
        let no_flag = serde_json::json!({"hour": 6, "minute": 45});
        assert!(!TimeRuleOutcome::from_json(&no_flag).unwrap().advance_weather);
        assert_eq!(TimeRuleOutcome::from_json(&serde_json::Value::Null), None);
        assert_eq!(TimeRuleOutcome::from_json(&serde_json::json!({"hour": 6})), None);
        assert_eq!(TimeRuleOutcome::from_json(&serde_json::json!({"hour": "6", "minute": 0})), None);
        assert_eq!(TimeRuleOutcome::from_json(&serde_json::json!([6, 0])), None);
    }

    #[test]
    fn json_rule_adapter_degrades_malformed_output() {
        let mut clock = manual(1, 1, 1);
        let mut rule = JsonTimeRule(|| serde_json::json!("noon"));
        let advance = clock.advance(Some(&mut rule), &LocalWallClock);
        assert_eq!(advance.source, TickSource::RuleRejected);
        assert_eq!((clock.hour(), clock.minute()), (1, 1));
    }

    #[test]
    fn invalid_parts_are_rejected() {
        assert!(WorldClock::from_parts(24, 0, 1, false).is_err());
        assert!(WorldClock::from_parts(0, 60, 1, false).is_err());
        assert!(WorldClock::from_parts(0, 0, 0, false).is_err());
        assert!(WorldClock::from_parts(0, 0, 61, false).is_err());
    }
}
