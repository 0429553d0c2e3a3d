//! Axum router construction for the gateway.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::operator;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /ws/weather` -- game client `WebSocket`
/// - `POST|DELETE /api/operator/weather` -- weather override
/// - `POST|DELETE /api/operator/time` -- time override
/// - `PUT /api/operator/rotation` -- replace the rotation schedule
/// - `GET /api/status` -- world snapshot
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws/weather", get(ws::ws_weather))
        .route(
            "/api/operator/weather",
            post(operator::set_weather).delete(operator::clear_weather),
        )
        .route(
            "/api/operator/time",
            post(operator::set_time).delete(operator::clear_time),
        )
        .route("/api/operator/rotation", put(operator::set_rotation))
        .route("/api/status", get(operator::status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
