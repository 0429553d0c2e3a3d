//! Outbound delivery of server messages to connected observers.
//!
//! The world service only knows connections by [`ConnectionId`]; the
//! gateway owns the sockets and implements [`WeatherTransport`] on top of
//! them. [`RecordingTransport`] captures traffic in memory for tests.

use std::sync::{Mutex, PoisonError};

use weathervane_types::{ConnectionId, ServerMessage};

/// Errors that can occur when delivering a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The connection is unknown or its socket has gone away.
    #[error("connection {0} is closed")]
    ConnectionClosed(ConnectionId),
}

/// Delivery of [`ServerMessage`]s to one observer or to all of them.
pub trait WeatherTransport: Send + Sync {
    /// Send a message to a single connection.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ConnectionClosed`] if the connection is gone.
    fn send_to(&self, connection: ConnectionId, message: ServerMessage) -> Result<(), TransportError>;

    /// Send a message to every connection. Returns how many were reached.
    fn broadcast(&self, message: ServerMessage) -> usize;
}

/// Who a recorded message was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// A single connection.
    One(ConnectionId),
    /// Every connection.
    All,
}

/// In-memory transport that records every message it is asked to deliver.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(Recipient, ServerMessage)>>,
    closed: Mutex<Vec<ConnectionId>>,
}

impl RecordingTransport {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends to `connection` fail.
    pub fn close(&self, connection: ConnectionId) {
        self.closed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(connection);
    }

    /// Everything delivered so far, in order.
    pub fn sent(&self) -> Vec<(Recipient, ServerMessage)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages delivered to `connection` directly.
    pub fn sent_to(&self, connection: ConnectionId) -> Vec<ServerMessage> {
        self.sent()
            .into_iter()
            .filter_map(|(to, msg)| (to == Recipient::One(connection)).then_some(msg))
            .collect()
    }

    /// Messages broadcast to everyone.
    pub fn broadcasts(&self) -> Vec<ServerMessage> {
        self.sent()
            .into_iter()
            .filter_map(|(to, msg)| (to == Recipient::All).then_some(msg))
            .collect()
    }

    fn record(&self, to: Recipient, message: ServerMessage) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((to, message));
    }
}

impl WeatherTransport for RecordingTransport {
    fn send_to(&self, connection: ConnectionId, message: ServerMessage) -> Result<(), TransportError> {
        let closed = self
            .closed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&connection);
        if closed {
            return Err(TransportError::ConnectionClosed(connection));
        }
        self.record(Recipient::One(connection), message);
        Ok(())
    }

    fn broadcast(&self, message: ServerMessage) -> usize {
        self.record(Recipient::All, message);
        1
    }
}
