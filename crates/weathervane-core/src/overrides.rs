//! Operator overrides that pin weather or time for every observer.
//!
//! An active weather override supersedes the rotation schedule for every
//! band; an active time override supersedes the clock's hour. Both persist
//! until explicitly cleared. The controller lives inside the world service,
//! so readers always see the weather and time halves of one consistent
//! [`OverrideState`].

use serde::{Deserialize, Serialize};
use weathervane_types::Weather;
use weathervane_world::{RotationSchedule, WorldError};

/// Errors that can occur when setting an override.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OverrideError {
    /// The hour is not an integer within `0..=23`.
    #[error("{input} is not a valid hour (expected 0-23)")]
    InvalidHour {
        /// The raw input, as received.
        input: String,
    },

    /// A time override was activated without an hour.
    #[error("an hour is required to activate a time override")]
    MissingHour,
}

/// An hour as received from an operator: a number or its string form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HourInput {
    /// Numeric hour, e.g. `7`.
    Number(i64),
    /// Textual hour, e.g. `"7"`.
    Text(String),
}

impl HourInput {
    /// Normalize to an hour of day.
    ///
    /// # Errors
    ///
    /// Returns [`OverrideError::InvalidHour`] for non-numeric text or values
    /// outside `0..=23`.
    pub fn normalize(&self) -> Result<u8, OverrideError> {
        let raw = match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<i64>().ok(),
        };
        raw.and_then(|n| u8::try_from(n).ok())
            .filter(|h| *h < 24)
            .ok_or_else(|| OverrideError::InvalidHour {
                input: self.to_string(),
            })
    }
}

impl core::fmt::Display for HourInput {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<u8> for HourInput {
    fn from(hour: u8) -> Self {
        Self::Number(i64::from(hour))
    }
}

/// Snapshot of both overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverrideState {
    /// Whether the weather override is in force.
    pub weather_active: bool,
    /// Last weather set; only meaningful while `weather_active`.
    pub weather: Option<Weather>,
    /// Whether the time override is in force.
    pub time_active: bool,
    /// Last hour set; only meaningful while `time_active`.
    pub time_hour: Option<u8>,
}

/// Owner of the process-wide override state.
#[derive(Debug, Clone)]
pub struct OverrideController {
    state: OverrideState,

    /// Substituted when a weather override is activated without a name.
    default_weather: Weather,
}

impl OverrideController {
    /// Create a controller with both overrides inactive.
    pub const fn new(default_weather: Weather) -> Self {
        Self {
            state: OverrideState {
                weather_active: false,
                weather: None,
                time_active: false,
                time_hour: None,
            },
            default_weather,
        }
    }

    /// Current override state.
    pub const fn state(&self) -> OverrideState {
        self.state
    }

    /// Set the weather override. A missing name becomes the default weather.
    ///
    /// Returns whether anything changed, so repeating a call is a no-op.
    pub fn set_weather(&mut self, active: bool, name: Option<Weather>) -> bool {
        let next = OverrideState {
            weather_active: active,
            weather: Some(name.unwrap_or(self.default_weather)),
            ..self.state
        };
        self.replace(next)
    }

    /// Deactivate the weather override. Returns whether it was active.
    pub fn clear_weather(&mut self) -> bool {
        let next = OverrideState {
            weather_active: false,
            ..self.state
        };
        self.replace(next)
    }

    /// Set the time override.
    ///
    /// Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns [`OverrideError::InvalidHour`] if `hour` does not normalize,
    /// or [`OverrideError::MissingHour`] if activating without an hour. The
    /// state is untouched on error.
    pub fn set_time(&mut self, active: bool, hour: Option<&HourInput>) -> Result<bool, OverrideError> {
        let hour = hour.map(HourInput::normalize).transpose()?;
        if active && hour.is_none() {
            return Err(OverrideError::MissingHour);
        }
        let next = OverrideState {
            time_active: active,
            time_hour: hour.or(self.state.time_hour),
            ..self.state
        };
        Ok(self.replace(next))
    }

    /// Deactivate the time override. Returns whether it was active.
    pub fn clear_time(&mut self) -> bool {
        let next = OverrideState {
            time_active: false,
            ..self.state
        };
        self.replace(next)
    }

    /// Weather observed in `band`: the override when active, else the
    /// schedule's entry.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::IndexOutOfRange`] when no override is active
    /// and `band` is beyond the schedule.
    pub fn effective_weather(&self, band: usize, schedule: &RotationSchedule) -> Result<Weather, WorldError> {
        match (self.state.weather_active, self.state.weather) {
            (true, Some(weather)) => Ok(weather),
            _ => schedule.weather_for_band(band),
        }
    }

    /// Hour observed by everyone: the override when active, else the clock's.
    pub const fn effective_hour(&self, clock_hour: u8) -> u8 {
        match (self.state.time_active, self.state.time_hour) {
            (true, Some(hour)) => hour,
            _ => clock_hour,
        }
    }

    fn replace(&mut self, next: OverrideState) -> bool {
        let changed = next != self.state;
        self.state = next;
        changed
    }
}
