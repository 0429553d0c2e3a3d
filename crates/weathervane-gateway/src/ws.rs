//! `WebSocket` endpoint for game clients.
//!
//! Clients connect to `GET /ws/weather` and exchange JSON text frames:
//! [`ClientMessage`]s in, [`ServerMessage`]s out. Replies to a client's own
//! requests arrive through its registry outbox; override announcements
//! arrive through the shared broadcast channel.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};
use weathervane_types::{ClientMessage, ConnectionId, ServerMessage};

use crate::state::AppState;

/// Upgrade an HTTP request to a client `WebSocket`.
///
/// # Route
///
/// `GET /ws/weather`
pub async fn ws_weather(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let (id, mut outbox) = state.registry.register();
    let mut broadcasts = state.registry.subscribe();
    debug!(connection = %id, "Client connected");

    loop {
        tokio::select! {
            direct = outbox.recv() => {
                let Some(message) = direct else {
                    break;
                };
                if !send_json(&mut socket, &message).await {
                    break;
                }
            }
            shared = broadcasts.recv() => {
                match shared {
                    Ok(message) => {
                        if !send_json(&mut socket, &message).await {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(connection = %id, skipped = n, "Client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => handle_text(&state, id, text.as_str()).await,
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(connection = %id, "WebSocket error: {e}");
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.registry.unregister(id);
    debug!(connection = %id, "Client disconnected");
}

async fn handle_text(state: &AppState, id: ConnectionId, text: &str) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            debug!(connection = %id, error = %e, "Ignoring malformed client frame");
            return;
        }
    };

    match message {
        ClientMessage::RequestWeatherUpdate => {
            let position = state.registry.position(id);
            if let Err(e) = state.service.weather_update_requested(id, position).await {
                debug!(connection = %id, error = %e, "Weather request failed");
            }
        }
        ClientMessage::PositionUpdate { position } => {
            state.registry.update_position(id, position);
        }
    }
}

/// Serialize and send one frame. Returns `false` once the socket is gone.
async fn send_json(socket: &mut WebSocket, message: &ServerMessage) -> bool {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize server message: {e}");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}
