//! The seam between the transition logic and the game engine.
//!
//! [`WeatherNatives`] is the set of side-effecting engine calls the client
//! makes. The game binding implements it; [`RecordingNatives`] records
//! every call with a timestamp so transition timing can be asserted under
//! paused tokio time.

use std::sync::{Mutex, PoisonError};

use tokio::time::Instant;
use weathervane_types::Weather;

/// Script audio banks used by winter effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioBank {
    /// `ICE_FOOTSTEPS`
    IceFootsteps,
    /// `SNOW_FOOTSTEPS`
    SnowFootsteps,
}

impl AudioBank {
    /// Engine name of the bank.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IceFootsteps => "ICE_FOOTSTEPS",
            Self::SnowFootsteps => "SNOW_FOOTSTEPS",
        }
    }
}

/// Engine calls that change what the player sees and hears.
pub trait WeatherNatives: Send + Sync + 'static {
    /// Drop any engine-level weather override.
    fn clear_override_weather(&self);
    /// Drop the persisted weather type.
    fn clear_weather_type_persist(&self);
    /// Blend towards `weather` over `seconds` and keep it.
    fn set_weather_type_overtime_persist(&self, weather: Weather, seconds: u32);
    /// Persist `weather` as the current type.
    fn set_weather_type_persist(&self, weather: Weather);
    /// Switch to `weather` immediately.
    fn set_weather_type_now(&self, weather: Weather);
    /// Switch to `weather` immediately and persist it.
    fn set_weather_type_now_persist(&self, weather: Weather);
    /// Toggle snow trails behind wheels when unsheltered.
    fn use_snow_wheel_vfx(&self, enabled: bool);
    /// Toggle snow footprints when unsheltered.
    fn use_snow_foot_vfx(&self, enabled: bool);
    /// Toggle footstep events on the local player.
    fn set_footstep_events(&self, enabled: bool);
    /// Load an audio bank.
    fn request_audio_bank(&self, bank: AudioBank);
    /// Unload an audio bank.
    fn release_audio_bank(&self, bank: AudioBank);
    /// Set the in-game clock.
    fn set_clock_time(&self, hour: u8, minute: u8);
}

/// One recorded engine call, mirroring the [`WeatherNatives`] methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeCall {
    /// [`WeatherNatives::clear_override_weather`]
    ClearOverrideWeather,
    /// [`WeatherNatives::clear_weather_type_persist`]
    ClearWeatherTypePersist,
    /// [`WeatherNatives::set_weather_type_overtime_persist`]
    SetWeatherTypeOvertimePersist(Weather, u32),
    /// [`WeatherNatives::set_weather_type_persist`]
    SetWeatherTypePersist(Weather),
    /// [`WeatherNatives::set_weather_type_now`]
    SetWeatherTypeNow(Weather),
    /// [`WeatherNatives::set_weather_type_now_persist`]
    SetWeatherTypeNowPersist(Weather),
    /// [`WeatherNatives::use_snow_wheel_vfx`]
    UseSnowWheelVfx(bool),
    /// [`WeatherNatives::use_snow_foot_vfx`]
    UseSnowFootVfx(bool),
    /// [`WeatherNatives::set_footstep_events`]
    SetFootstepEvents(bool),
    /// [`WeatherNatives::request_audio_bank`]
    RequestAudioBank(AudioBank),
    /// [`WeatherNatives::release_audio_bank`]
    ReleaseAudioBank(AudioBank),
    /// [`WeatherNatives::set_clock_time`]
    SetClockTime(u8, u8),
}

/// Records every call instead of touching an engine.
#[derive(Debug, Default)]
pub struct RecordingNatives {
    calls: Mutex<Vec<(Instant, NativeCall)>>,
}

impl RecordingNatives {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls so far with the time they were made.
    pub fn timed_calls(&self) -> Vec<(Instant, NativeCall)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<NativeCall> {
        self.timed_calls().into_iter().map(|(_, call)| call).collect()
    }

    /// Forget everything recorded.
    pub fn clear(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn record(&self, call: NativeCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((Instant::now(), call));
    }
}

impl WeatherNatives for RecordingNatives {
    fn clear_override_weather(&self) {
        self.record(NativeCall::ClearOverrideWeather);
    }

    fn clear_weather_type_persist(&self) {
        self.record(NativeCall::ClearWeatherTypePersist);
    }

    fn set_weather_type_overtime_persist(&self, weather: Weather, seconds: u32) {
        self.record(NativeCall::SetWeatherTypeOvertimePersist(weather, seconds));
    }

    fn set_weather_type_persist(&self, weather: Weather) {
        self.record(NativeCall::SetWeatherTypePersist(weather));
    }

    fn set_weather_type_now(&self, weather: Weather) {
        self.record(NativeCall::SetWeatherTypeNow(weather));
    }

    fn set_weather_type_now_persist(&self, weather: Weather) {
        self.record(NativeCall::SetWeatherTypeNowPersist(weather));
    }

    fn use_snow_wheel_vfx(&self, enabled: bool) {
        self.record(NativeCall::UseSnowWheelVfx(enabled));
    }

    fn use_snow_foot_vfx(&self, enabled: bool) {
        self.record(NativeCall::UseSnowFootVfx(enabled));
    }

    fn set_footstep_events(&self, enabled: bool) {
        self.record(NativeCall::SetFootstepEvents(enabled));
    }

    fn request_audio_bank(&self, bank: AudioBank) {
        self.record(NativeCall::RequestAudioBank(bank));
    }

    fn release_audio_bank(&self, bank: AudioBank) {
        self.record(NativeCall::ReleaseAudioBank(bank));
    }

    fn set_clock_time(&self, hour: u8, minute: u8) {
        self.record(NativeCall::SetClockTime(hour, minute));
    }
}
