//! Snow visuals and footstep audio that accompany winter weather.

use weathervane_types::Weather;

use crate::natives::{AudioBank, WeatherNatives};

/// Tracks whether winter effects are switched on, so entering winter twice
/// never requests the audio banks twice and leaving it twice never
/// releases them twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnowEffects {
    active: bool,
}

impl SnowEffects {
    /// Whether winter effects are currently on.
    pub const fn is_active(self) -> bool {
        self.active
    }

    /// Bring the effects in line with `next`.
    pub fn apply(&mut self, next: Weather, natives: &impl WeatherNatives) {
        match (next.is_winter(), self.active) {
            (true, false) => {
                natives.use_snow_wheel_vfx(true);
                natives.use_snow_foot_vfx(true);
                natives.set_footstep_events(true);
                natives.request_audio_bank(AudioBank::IceFootsteps);
                natives.request_audio_bank(AudioBank::SnowFootsteps);
                self.active = true;
            }
            (false, true) => {
                natives.release_audio_bank(AudioBank::IceFootsteps);
                natives.release_audio_bank(AudioBank::SnowFootsteps);
                natives.use_snow_wheel_vfx(false);
                natives.use_snow_foot_vfx(false);
                self.active = false;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::natives::{NativeCall, RecordingNatives};

    #[test]
    fn entering_winter_enables_everything_once() {
        let natives = RecordingNatives::new();
        let mut effects = SnowEffects::default();
        effects.apply(Weather::Xmas, &natives);
        effects.apply(Weather::Xmas, &natives);
        assert_eq!(
            natives.calls(),
            vec![
                NativeCall::UseSnowWheelVfx(true),
                NativeCall::UseSnowFootVfx(true),
                NativeCall::SetFootstepEvents(true),
                NativeCall::RequestAudioBank(AudioBank::IceFootsteps),
                NativeCall::RequestAudioBank(AudioBank::SnowFootsteps),
            ]
        );
        assert!(effects.is_active());
    }

    #[test]
    fn leaving_winter_releases_banks() {
        let natives = RecordingNatives::new();
        let mut effects = SnowEffects::default();
        effects.apply(Weather::Xmas, &natives);
        natives.clear();
        effects.apply(Weather::Clear, &natives);
        effects.apply(Weather::Rain, &natives);
        assert_eq!(
            natives.calls(),
            vec![
                NativeCall::ReleaseAudioBank(AudioBank::IceFootsteps),
                NativeCall::ReleaseAudioBank(AudioBank::SnowFootsteps),
                NativeCall::UseSnowWheelVfx(false),
                NativeCall::UseSnowFootVfx(false),
            ]
        );
        assert!(!effects.is_active());
    }

    #[test]
    fn snow_is_not_winter() {
        let natives = RecordingNatives::new();
        let mut effects = SnowEffects::default();
        effects.apply(Weather::Snow, &natives);
        effects.apply(Weather::Blizzard, &natives);
        assert!(natives.calls().is_empty());
    }
}
