//! Client configuration loaded from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `WEATHERVANE_POLL_INTERVAL_MS` | `10000` |
//! | `WEATHERVANE_MAX_TRANSITION_SECONDS` | `60` |
//! | `WEATHERVANE_COMMIT_LEAD_MS` | `500` |
//! | `WEATHERVANE_INITIAL_WEATHER` | `OVERCAST` |
//!
//! The poll interval must be non-zero, the maximum transition must lie in
//! `1..=60` seconds, and the commit lead must be shorter than that maximum.

use std::str::FromStr;
use std::time::Duration;

use weathervane_types::Weather;

use crate::error::ClientError;

/// Hard upper bound on any transition, in seconds.
pub const MAX_TRANSITION_SECONDS: u32 = 60;

/// Tunables for the transition controller and the poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// How often to ask the server for a weather update.
    pub poll_interval: Duration,

    /// Upper bound on any transition duration, in seconds.
    pub max_transition_seconds: u32,

    /// How long before the end of a transition the final state is committed.
    pub commit_lead_ms: u64,

    /// Weather assumed to be showing before the first transition.
    pub initial_weather: Weather,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(10_000),
            max_transition_seconds: 60,
            commit_lead_ms: 500,
            initial_weather: Weather::Overcast,
        }
    }
}

impl ClientConfig {
    /// Load from the process environment, using defaults for unset variables.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let poll_ms = parse_var(&lookup, "WEATHERVANE_POLL_INTERVAL_MS")?;
        let initial_weather = match lookup("WEATHERVANE_INITIAL_WEATHER") {
            Some(name) => name.parse::<Weather>()?,
            None => defaults.initial_weather,
        };

        let config = Self {
            poll_interval: poll_ms.map_or(defaults.poll_interval, Duration::from_millis),
            max_transition_seconds: parse_var(&lookup, "WEATHERVANE_MAX_TRANSITION_SECONDS")?
                .unwrap_or(defaults.max_transition_seconds),
            commit_lead_ms: parse_var(&lookup, "WEATHERVANE_COMMIT_LEAD_MS")?.unwrap_or(defaults.commit_lead_ms),
            initial_weather,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the ranges the controller and the poller rely on.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidEnv`] naming the variable whose value is
    /// out of range: a zero poll interval, a maximum transition outside
    /// `1..=60` seconds, or a commit lead that would swallow the whole
    /// maximum window.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.poll_interval.is_zero() {
            return Err(ClientError::InvalidEnv {
                name: "WEATHERVANE_POLL_INTERVAL_MS",
                value: "0".to_owned(),
            });
        }
        if !(1..=MAX_TRANSITION_SECONDS).contains(&self.max_transition_seconds) {
            return Err(ClientError::InvalidEnv {
                name: "WEATHERVANE_MAX_TRANSITION_SECONDS",
                value: self.max_transition_seconds.to_string(),
            });
        }
        let window_ms = u64::from(self.max_transition_seconds).saturating_mul(1000);
        if self.commit_lead_ms >= window_ms {
            return Err(ClientError::InvalidEnv {
                name: "WEATHERVANE_COMMIT_LEAD_MS",
                value: self.commit_lead_ms.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ClientError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|_parse| ClientError::InvalidEnv { name, value })
        })
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn unset_variables_use_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.initial_weather, Weather::Overcast);
    }

    #[test]
    fn variables_override_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("WEATHERVANE_POLL_INTERVAL_MS", "2500"),
            ("WEATHERVANE_MAX_TRANSITION_SECONDS", "30"),
            ("WEATHERVANE_COMMIT_LEAD_MS", "0"),
            ("WEATHERVANE_INITIAL_WEATHER", "clear"),
        ]))
        .unwrap();
        assert_eq!(config.poll_interval, Duration::from_millis(2500));
        assert_eq!(config.max_transition_seconds, 30);
        assert_eq!(config.commit_lead_ms, 0);
        assert_eq!(config.initial_weather, Weather::Clear);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[("WEATHERVANE_COMMIT_LEAD_MS", "soon")])).unwrap_err();
        assert!(matches!(
            err,
            ClientError::InvalidEnv {
                name: "WEATHERVANE_COMMIT_LEAD_MS",
                ..
            }
        ));
        let err = ClientConfig::from_lookup(lookup(&[("WEATHERVANE_INITIAL_WEATHER", "hail")])).unwrap_err();
        assert!(matches!(err, ClientError::Weather { .. }));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[("WEATHERVANE_POLL_INTERVAL_MS", "0")])).unwrap_err();
        assert!(matches!(
            err,
            ClientError::InvalidEnv {
                name: "WEATHERVANE_POLL_INTERVAL_MS",
                ..
            }
        ));
    }

    #[test]
    fn max_transition_must_stay_within_a_minute() {
        for bad in ["0", "61", "120"] {
            let err = ClientConfig::from_lookup(lookup(&[("WEATHERVANE_MAX_TRANSITION_SECONDS", bad)])).unwrap_err();
            assert!(
                matches!(
                    err,
                    ClientError::InvalidEnv {
                        name: "WEATHERVANE_MAX_TRANSITION_SECONDS",
                        ..
                    }
                ),
                "{bad}"
            );
        }
        let edge = ClientConfig::from_lookup(lookup(&[("WEATHERVANE_MAX_TRANSITION_SECONDS", "60")])).unwrap();
        assert_eq!(edge.max_transition_seconds, MAX_TRANSITION_SECONDS);
    }

    #[test]
    fn commit_lead_must_fit_inside_the_window() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("WEATHERVANE_MAX_TRANSITION_SECONDS", "2"),
            ("WEATHERVANE_COMMIT_LEAD_MS", "2000"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ClientError::InvalidEnv {
                name: "WEATHERVANE_COMMIT_LEAD_MS",
                ..
            }
        ));
        assert!(
            ClientConfig::from_lookup(lookup(&[
                ("WEATHERVANE_MAX_TRANSITION_SECONDS", "2"),
                ("WEATHERVANE_COMMIT_LEAD_MS", "1999"),
            ]))
            .is_ok()
        );
    }
}
