//! Gateway startup helper for embedding in the engine.
//!
//! [`spawn_gateway`] launches the HTTP + `WebSocket` server on a
//! background Tokio task so it runs alongside the world clock.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use weathervane_core::config::ServerSettings;

use crate::server::{ServerError, socket_addr, start_server};
use crate::state::AppState;

/// Errors that can occur when spawning the gateway.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the gateway on a background task.
///
/// The address is validated before spawning so obvious misconfigurations
/// fail startup instead of a background task.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the configured address is invalid.
pub fn spawn_gateway(
    settings: ServerSettings,
    state: Arc<AppState>,
    shutdown: watch::Receiver<bool>,
) -> Result<JoinHandle<()>, StartupError> {
    let addr = socket_addr(&settings)?;

    let handle = tokio::spawn(async move {
        if let Err(e) = start_server(&settings, state, shutdown).await {
            tracing::error!(error = %e, "Gateway exited with error");
        }
    });

    tracing::info!(%addr, "Gateway spawned on background task");

    Ok(handle)
}
