//! Wire messages exchanged between the server and game clients.
//!
//! Messages travel as JSON text frames, internally tagged by `"type"`:
//!
//! ```json
//! {"type":"weather_update","weather":"RAIN","durationSeconds":60}
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Weather;

/// A point in world space. Only `y` selects the weather band.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// East-west coordinate.
    pub x: f64,
    /// North-south coordinate; the axis the weather grid is laid over.
    pub y: f64,
    /// Altitude.
    pub z: f64,
}

impl Position {
    /// Create a position from its three coordinates.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Messages sent by a game client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ClientMessage {
    /// Ask for the weather at the client's current position.
    RequestWeatherUpdate,
    /// Report where the client's player currently is.
    PositionUpdate {
        /// The player's position.
        position: Position,
    },
}

/// Messages sent by the server to game clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ServerMessage {
    /// Point-to-point answer to [`ClientMessage::RequestWeatherUpdate`].
    WeatherUpdate {
        /// Weather observed at the client's band.
        weather: Weather,
        /// Seconds the client should take to blend into `weather`.
        #[serde(rename = "durationSeconds")]
        duration_seconds: u32,
    },
    /// Broadcast when an operator pins the weather for everyone.
    WeatherOverride {
        /// The pinned weather.
        weather: Weather,
    },
    /// Authoritative time of day, sent alongside weather updates.
    TimeUpdate {
        /// Hour of day, `0..=23`.
        hour: u8,
        /// Minute of hour, `0..=59`.
        minute: u8,
    },
}
