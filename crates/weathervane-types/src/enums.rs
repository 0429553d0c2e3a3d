//! Enumeration types shared by the server and the game client.
//!
//! Weather identifiers arrive as untrusted strings from operators and
//! configuration files. They are parsed once into [`Weather`] at the
//! boundary; everything downstream works with the closed enumeration.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A weather type the game client knows how to render.
///
/// Serialized in the client engine's spelling (`EXTRASUNNY`, `SNOWLIGHT`,
/// ...), which is also the form accepted from operators and config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export, export_to = "bindings/")]
pub enum Weather {
    /// Cloudless sky with strong sunlight.
    ExtraSunny,
    /// Clear sky.
    Clear,
    /// Neutral grading, no precipitation.
    Neutral,
    /// Hazy, polluted air.
    Smog,
    /// Low visibility fog.
    Foggy,
    /// Full cloud cover.
    Overcast,
    /// Scattered clouds.
    Clouds,
    /// Clouds breaking up after rain.
    Clearing,
    /// Steady rain.
    Rain,
    /// Rain with thunder and lightning.
    Thunder,
    /// Snowfall.
    Snow,
    /// Heavy snow with wind.
    Blizzard,
    /// Light snow flurries.
    SnowLight,
    /// Festive snow cover with snow-trail effects.
    Xmas,
    /// Dark, foggy seasonal weather.
    Halloween,
}

impl Weather {
    /// Every weather type, in declaration order.
    pub const ALL: [Self; 15] = [
        Self::ExtraSunny,
        Self::Clear,
        Self::Neutral,
        Self::Smog,
        Self::Foggy,
        Self::Overcast,
        Self::Clouds,
        Self::Clearing,
        Self::Rain,
        Self::Thunder,
        Self::Snow,
        Self::Blizzard,
        Self::SnowLight,
        Self::Xmas,
        Self::Halloween,
    ];

    /// The client engine's identifier for this weather.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExtraSunny => "EXTRASUNNY",
            Self::Clear => "CLEAR",
            Self::Neutral => "NEUTRAL",
            Self::Smog => "SMOG",
            Self::Foggy => "FOGGY",
            Self::Overcast => "OVERCAST",
            Self::Clouds => "CLOUDS",
            Self::Clearing => "CLEARING",
            Self::Rain => "RAIN",
            Self::Thunder => "THUNDER",
            Self::Snow => "SNOW",
            Self::Blizzard => "BLIZZARD",
            Self::SnowLight => "SNOWLIGHT",
            Self::Xmas => "XMAS",
            Self::Halloween => "HALLOWEEN",
        }
    }

    /// Whether this is the winter weather that drives snow trails and
    /// icy footstep audio on the client.
    pub const fn is_winter(self) -> bool {
        matches!(self, Self::Xmas)
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A weather name that does not match any [`Weather`] variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0} is not a valid weather type.")]
pub struct UnknownWeather(pub String);

impl FromStr for Weather {
    type Err = UnknownWeather;

    /// Case-insensitive match against the client identifiers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|w| w.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownWeather(s.to_owned()))
    }
}
