//! Error types for the gateway.
//!
//! [`GatewayError`] converts into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use weathervane_core::service::ServiceError;

/// Errors that can occur in the gateway's HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// An operator command was refused; nothing changed.
    #[error("{0}")]
    Rejected(String),

    /// The world service failed.
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Rejected(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Service(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
