//! Operator commands with user-facing replies.
//!
//! Each command validates its raw input, applies it to the
//! [`WorldService`], and returns the lines to show the operator. Rejected
//! commands never mutate state.

use serde::Serialize;
use tracing::info;
use weathervane_types::Weather;

use crate::overrides::HourInput;
use crate::service::WorldService;

/// Outcome of an operator command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "messages", rename_all = "snake_case")]
pub enum CommandReply {
    /// The command took effect; lines to show the operator.
    Applied(Vec<String>),
    /// The command was refused; nothing changed.
    Rejected(String),
}

impl CommandReply {
    /// Whether the command took effect.
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Override the weather everywhere with the named weather.
pub async fn set_weather(service: &WorldService, name: Option<&str>) -> CommandReply {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return CommandReply::Rejected("Must specify a weather name.".to_owned());
    };
    let Ok(weather) = name.parse::<Weather>() else {
        return CommandReply::Rejected(format!("{name} is not a valid weather type."));
    };

    service.set_weather_override(true, Some(weather)).await;
    info!(%weather, "Operator set weather override");
    CommandReply::Applied(vec![
        format!("{name} is now overriding the entire weather system."),
        "Use DELETE /api/operator/weather to stop overriding the weather.".to_owned(),
    ])
}

/// Stop overriding the weather.
pub async fn clear_weather(service: &WorldService) -> CommandReply {
    service.set_weather_override(false, None).await;
    info!("Operator cleared weather override");
    CommandReply::Applied(vec!["Weather override is now disabled.".to_owned()])
}

/// Pin the hour for everyone.
pub async fn set_time(service: &WorldService, hour: Option<&HourInput>) -> CommandReply {
    let Some(hour) = hour else {
        return CommandReply::Rejected("Must specify an hour.".to_owned());
    };
    match service.set_time_override(true, Some(hour)).await {
        Ok(_) => {
            info!(%hour, "Operator set time override");
            CommandReply::Applied(vec![
                format!("Time is now fixed at hour {hour}."),
                "Use DELETE /api/operator/time to stop overriding the time.".to_owned(),
            ])
        }
        Err(_) => CommandReply::Rejected(format!("{hour} is not a valid hour (0-23).")),
    }
}

/// Stop overriding the hour.
pub async fn clear_time(service: &WorldService) -> CommandReply {
    service.clear_time_override().await;
    info!("Operator cleared time override");
    CommandReply::Applied(vec!["Time override is now disabled.".to_owned()])
}

/// Replace the rotation schedule from raw weather names.
pub async fn set_rotation(service: &WorldService, names: &[String]) -> CommandReply {
    let mut sequence = Vec::with_capacity(names.len());
    for name in names {
        match name.parse::<Weather>() {
            Ok(weather) => sequence.push(weather),
            Err(e) => return CommandReply::Rejected(e.to_string()),
        }
    }
    match service.set_weather_rotation(sequence).await {
        Ok(()) => CommandReply::Applied(vec!["Weather rotation updated.".to_owned()]),
        Err(e) => CommandReply::Rejected(e.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::WeathervaneConfig;
    use crate::transport::RecordingTransport;

    fn service() -> WorldService {
        WorldService::new(&WeathervaneConfig::default(), Arc::new(RecordingTransport::new())).unwrap()
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let service = service();
        for name in [None, Some(""), Some("  ")] {
            assert_eq!(
                set_weather(&service, name).await,
                CommandReply::Rejected("Must specify a weather name.".to_owned())
            );
        }
        assert!(!service.snapshot().await.unwrap().overrides.weather_active);
    }

    #[tokio::test]
    async fn unknown_name_is_rejected_without_mutation() {
        let service = service();
        assert_eq!(
            set_weather(&service, Some("sunny")).await,
            CommandReply::Rejected("sunny is not a valid weather type.".to_owned())
        );
        assert!(!service.snapshot().await.unwrap().overrides.weather_active);
    }

    #[tokio::test]
    async fn name_is_case_insensitive_and_echoed() {
        let service = service();
        let reply = set_weather(&service, Some("thunder")).await;
        assert_eq!(
            reply,
            CommandReply::Applied(vec![
                "thunder is now overriding the entire weather system.".to_owned(),
                "Use DELETE /api/operator/weather to stop overriding the weather.".to_owned(),
            ])
        );
        assert_eq!(service.effective_weather(3).await.unwrap(), Weather::Thunder);
    }

    #[tokio::test]
    async fn clear_restores_rotation() {
        let service = service();
        set_weather(&service, Some("SNOW")).await;
        let reply = clear_weather(&service).await;
        assert_eq!(
            reply,
            CommandReply::Applied(vec!["Weather override is now disabled.".to_owned()])
        );
        assert_eq!(service.effective_weather(0).await.unwrap(), Weather::ExtraSunny);
    }

    #[tokio::test]
    async fn time_commands() {
        let service = service();
        assert!(!set_time(&service, None).await.is_applied());
        assert!(!set_time(&service, Some(&HourInput::Text("late".to_owned()))).await.is_applied());
        assert!(set_time(&service, Some(&HourInput::Number(23))).await.is_applied());
        assert_eq!(service.effective_hour().await, 23);
        assert!(clear_time(&service).await.is_applied());
        assert_eq!(service.effective_hour().await, 8);
    }

    #[tokio::test]
    async fn rotation_command_validates_names_and_length() {
        let service = service();
        let bad_name = set_rotation(&service, &["RAIN".to_owned(), "DRIZZLE".to_owned()]).await;
        assert_eq!(
            bad_name,
            CommandReply::Rejected("DRIZZLE is not a valid weather type.".to_owned())
        );
        let short = set_rotation(&service, &["RAIN".to_owned()]).await;
        assert!(!short.is_applied());

        let names: Vec<String> = std::iter::repeat_n("foggy".to_owned(), 6).collect();
        assert!(set_rotation(&service, &names).await.is_applied());
        assert_eq!(service.effective_weather(2).await.unwrap(), Weather::Foggy);
    }

    #[test]
    fn reply_serializes_with_status_tag() {
        let json = serde_json::to_value(CommandReply::Rejected("nope".to_owned())).unwrap();
        assert_eq!(json, serde_json::json!({"status": "rejected", "messages": "nope"}));
    }
}
