//! Configuration loading and typed config structures for the Weathervane server.
//!
//! The canonical configuration lives in `weathervane-config.yaml` next to the
//! server binary. Every field is optional; missing values fall back to the
//! defaults below. Weather names are kept as strings in the file and parsed
//! case-insensitively by [`WeatherSettings::rotation`] and
//! [`WeatherSettings::default_override`].

use std::path::Path;

use serde::Deserialize;
use weathervane_types::Weather;
use weathervane_world::GridSpec;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The file parsed but describes an unusable setup.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WeathervaneConfig {
    /// Clock settings.
    #[serde(default)]
    pub world: WorldSettings,

    /// Spatial grid settings.
    #[serde(default)]
    pub grid: GridSettings,

    /// Rotation and transition settings.
    #[serde(default)]
    pub weather: WeatherSettings,

    /// Client gateway bind address.
    #[serde(default)]
    pub server: ServerSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl WeathervaneConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override the gateway address:
    /// - `WEATHERVANE_HOST` overrides `server.host`
    /// - `WEATHERVANE_PORT` overrides `server.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.server.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.server.apply_env_overrides();
        Ok(config)
    }

    /// Check the cross-field invariants the world service relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.validate()?;
        if self.grid.divisions == 0 {
            return Err(invalid("grid.divisions must be at least 1"));
        }
        let rotation = self.weather.rotation()?;
        let divisions = usize::try_from(self.grid.divisions)
            .map_err(|_err| invalid("grid.divisions exceeds usize range"))?;
        if rotation.len() != divisions {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "weather.rotation has {} entries but grid.divisions is {divisions}",
                    rotation.len()
                ),
            });
        }
        self.weather.default_override()?;
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

/// World clock configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldSettings {
    /// Hour the clock starts at.
    #[serde(default = "default_bootup_hour")]
    pub bootup_hour: u8,

    /// Minute the clock starts at.
    #[serde(default)]
    pub bootup_minute: u8,

    /// Simulated minutes added per tick in manual mode.
    #[serde(default = "default_minutes_per_tick")]
    pub minutes_per_tick: u8,

    /// Real-time milliseconds per tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Follow the server's local wall clock instead of simulating time.
    #[serde(default)]
    pub use_wall_clock: bool,
}

impl WorldSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.bootup_hour > 23 {
            return Err(invalid("world.bootup_hour must be within 0..=23"));
        }
        if self.bootup_minute > 59 {
            return Err(invalid("world.bootup_minute must be within 0..=59"));
        }
        if !(1..=60).contains(&self.minutes_per_tick) {
            return Err(invalid("world.minutes_per_tick must be within 1..=60"));
        }
        if self.tick_interval_ms < 100 {
            return Err(invalid("world.tick_interval_ms must be at least 100"));
        }
        Ok(())
    }
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            bootup_hour: default_bootup_hour(),
            bootup_minute: 0,
            minutes_per_tick: default_minutes_per_tick(),
            tick_interval_ms: default_tick_interval_ms(),
            use_wall_clock: false,
        }
    }
}

/// Spatial grid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GridSettings {
    /// Number of weather bands. Best kept at 6 unless the map changes.
    #[serde(default = "default_divisions")]
    pub divisions: u32,

    /// Southern map bound.
    #[serde(default = "default_map_min_y")]
    pub map_min_y: f64,

    /// Northern map bound.
    #[serde(default = "default_map_max_y")]
    pub map_max_y: f64,

    /// Height of each band.
    #[serde(default = "default_band_height")]
    pub band_height: f64,
}

impl GridSettings {
    /// The grid parameters these settings describe.
    pub const fn spec(&self) -> GridSpec {
        GridSpec {
            divisions: self.divisions,
            map_min: self.map_min_y,
            map_max: self.map_max_y,
            band_height: self.band_height,
        }
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            divisions: default_divisions(),
            map_min_y: default_map_min_y(),
            map_max_y: default_map_max_y(),
            band_height: default_band_height(),
        }
    }
}

/// Weather rotation and transition configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WeatherSettings {
    /// Initial weather per band, band 0 (top of the map) first.
    #[serde(default = "default_rotation")]
    pub rotation: Vec<String>,

    /// Weather used when an override is activated without a name.
    #[serde(default = "default_override_name")]
    pub default_override: String,

    /// Transition length sent with every weather update.
    #[serde(default = "default_transition_seconds")]
    pub transition_seconds: u32,
}

impl WeatherSettings {
    /// Parse the configured rotation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first unknown weather.
    pub fn rotation(&self) -> Result<Vec<Weather>, ConfigError> {
        parse_weathers(&self.rotation)
    }

    /// Parse the configured default override weather.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the name is unknown.
    pub fn default_override(&self) -> Result<Weather, ConfigError> {
        self.default_override
            .parse()
            .map_err(|e: weathervane_types::UnknownWeather| ConfigError::Invalid {
                reason: format!("weather.default_override: {e}"),
            })
    }
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            rotation: default_rotation(),
            default_override: default_override_name(),
            transition_seconds: default_transition_seconds(),
        }
    }
}

/// Parse weather names case-insensitively.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if any name does not match a
/// [`Weather`] variant.
fn parse_weathers(names: &[String]) -> Result<Vec<Weather>, ConfigError> {
    names
        .iter()
        .map(|name| {
            name.parse::<Weather>().map_err(|e| ConfigError::Invalid {
                reason: format!("weather.rotation: {e}"),
            })
        })
        .collect()
}

/// Client gateway bind address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port for the `WebSocket` gateway and operator API.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSettings {
    /// Override fields from environment variables when they are set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("WEATHERVANE_HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("WEATHERVANE_PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
        {
            self.port = port;
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_bootup_hour() -> u8 {
    8
}

const fn default_minutes_per_tick() -> u8 {
    1
}

const fn default_tick_interval_ms() -> u64 {
    60_000
}

const fn default_divisions() -> u32 {
    6
}

const fn default_map_min_y() -> f64 {
    -4000.0
}

const fn default_map_max_y() -> f64 {
    8000.0
}

const fn default_band_height() -> f64 {
    2000.0
}

fn default_rotation() -> Vec<String> {
    [
        Weather::ExtraSunny,
        Weather::Clear,
        Weather::Clouds,
        Weather::Overcast,
        Weather::Rain,
        Weather::Clearing,
    ]
    .iter()
    .map(|w| w.as_str().to_owned())
    .collect()
}

fn default_override_name() -> String {
    Weather::ExtraSunny.as_str().to_owned()
}

const fn default_transition_seconds() -> u32 {
    60
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}
