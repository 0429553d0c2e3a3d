//! Registry of connected game clients.
//!
//! Each `WebSocket` registers here on connect and gets a private outbox
//! for point-to-point messages; broadcasts go out over a shared
//! [`broadcast`] channel every socket subscribes to. The registry also
//! remembers the last position each client reported, which the world
//! service uses to resolve the client's band.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tokio::sync::{broadcast, mpsc};
use tracing::debug;
use weathervane_core::transport::{TransportError, WeatherTransport};
use weathervane_types::{ConnectionId, Position, ServerMessage};

/// Capacity of the broadcast channel.
///
/// A socket that falls further behind than this receives
/// [`broadcast::error::RecvError::Lagged`] and skips to the newest message.
const BROADCAST_CAPACITY: usize = 64;

struct Connection {
    outbox: mpsc::UnboundedSender<ServerMessage>,
    position: Option<Position>,
}

/// All live connections, keyed by [`ConnectionId`].
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, Connection>>,
    broadcast_tx: broadcast::Sender<ServerMessage>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            connections: RwLock::new(HashMap::new()),
            broadcast_tx,
        }
    }

    /// Add a connection. Returns its id and the receiving end of its outbox.
    pub fn register(&self) -> (ConnectionId, mpsc::UnboundedReceiver<ServerMessage>) {
        let id = ConnectionId::new();
        let (outbox, inbox) = mpsc::unbounded_channel();
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                Connection {
                    outbox,
                    position: None,
                },
            );
        debug!(connection = %id, "Connection registered");
        (id, inbox)
    }

    /// Remove a connection. Returns whether it was registered.
    pub fn unregister(&self, id: ConnectionId) -> bool {
        let removed = self
            .connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some();
        if removed {
            debug!(connection = %id, "Connection unregistered");
        }
        removed
    }

    /// Subscribe to messages sent to every connection.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.broadcast_tx.subscribe()
    }

    /// Record where a client is. Returns `false` if the connection is unknown.
    pub fn update_position(&self, id: ConnectionId, position: Position) -> bool {
        let mut connections = self.connections.write().unwrap_or_else(PoisonError::into_inner);
        let Some(conn) = connections.get_mut(&id) else {
            return false;
        };
        conn.position = Some(position);
        true
    }

    /// Last position a client reported.
    pub fn position(&self, id: ConnectionId) -> Option<Position> {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .and_then(|conn| conn.position)
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no client is connected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl core::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("connections", &self.len())
            .finish_non_exhaustive()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherTransport for ConnectionRegistry {
    fn send_to(&self, connection: ConnectionId, message: ServerMessage) -> Result<(), TransportError> {
        let connections = self.connections.read().unwrap_or_else(PoisonError::into_inner);
        connections
            .get(&connection)
            .and_then(|conn| conn.outbox.send(message).ok())
            .ok_or(TransportError::ConnectionClosed(connection))
    }

    fn broadcast(&self, message: ServerMessage) -> usize {
        self.broadcast_tx.send(message).unwrap_or(0)
    }
}
