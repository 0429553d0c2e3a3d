//! Operator REST API handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/operator/weather` | Override the weather everywhere |
//! | `DELETE` | `/api/operator/weather` | Stop overriding the weather |
//! | `POST` | `/api/operator/time` | Pin the hour everywhere |
//! | `DELETE` | `/api/operator/time` | Stop overriding the hour |
//! | `PUT` | `/api/operator/rotation` | Replace the weather rotation |
//! | `GET` | `/api/status` | World snapshot |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use weathervane_core::commands::{self, CommandReply};
use weathervane_core::overrides::HourInput;
use weathervane_core::service::WorldSnapshot;

use crate::error::GatewayError;
use crate::state::AppState;

/// Request body for `POST /api/operator/weather`.
#[derive(Debug, Deserialize)]
pub struct SetWeatherRequest {
    /// Weather name, case-insensitive.
    pub name: Option<String>,
}

/// Request body for `POST /api/operator/time`.
#[derive(Debug, Deserialize)]
pub struct SetTimeRequest {
    /// Hour of day as a number or numeric string.
    pub hour: Option<HourInput>,
}

/// Request body for `PUT /api/operator/rotation`.
#[derive(Debug, Deserialize)]
pub struct SetRotationRequest {
    /// One weather name per band, top of the map first.
    pub weathers: Vec<String>,
}

/// Response to an applied operator command.
#[derive(Debug, Serialize)]
struct OperatorResponse {
    ok: bool,
    messages: Vec<String>,
}

/// Response for `GET /api/status`.
#[derive(Debug, Serialize)]
struct StatusResponse {
    connections: usize,
    transition_seconds: u32,
    world: WorldSnapshot,
}

fn respond(reply: CommandReply) -> Result<Json<OperatorResponse>, GatewayError> {
    match reply {
        CommandReply::Applied(messages) => Ok(Json(OperatorResponse { ok: true, messages })),
        CommandReply::Rejected(message) => Err(GatewayError::Rejected(message)),
    }
}

/// Override the weather in every band.
pub async fn set_weather(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetWeatherRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    respond(commands::set_weather(&state.service, body.name.as_deref()).await)
}

/// Return to the rotation schedule.
pub async fn clear_weather(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, GatewayError> {
    respond(commands::clear_weather(&state.service).await)
}

/// Pin the hour for everyone.
pub async fn set_time(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetTimeRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    respond(commands::set_time(&state.service, body.hour.as_ref()).await)
}

/// Return to the world clock's hour.
pub async fn clear_time(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, GatewayError> {
    respond(commands::clear_time(&state.service).await)
}

/// Replace the rotation schedule. Clients see it on their next poll.
pub async fn set_rotation(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetRotationRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    respond(commands::set_rotation(&state.service, &body.weathers).await)
}

/// Current world state plus connection count.
pub async fn status(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, GatewayError> {
    let world = state.service.snapshot().await?;
    Ok(Json(StatusResponse {
        connections: state.registry.len(),
        transition_seconds: state.service.transition_seconds(),
        world,
    }))
}
