//! A client's conversation with the server.
//!
//! [`ClientSession`] turns incoming [`ServerMessage`]s into transitions and
//! clock updates, and sends requests back through a [`ServerLink`].
//! [`run_poller`] asks for a weather update on a fixed period.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use weathervane_types::{ClientMessage, Position, ServerMessage, Weather};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::natives::WeatherNatives;
use crate::transition::{TransitionController, TransitionOutcome};

/// Outbound half of the connection to the server.
pub trait ServerLink: Send + Sync + 'static {
    /// Send a message to the server.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LinkClosed`] if the connection is gone.
    fn send(&self, message: ClientMessage) -> Result<(), ClientError>;
}

/// Link that keeps every message it is given.
#[derive(Debug, Default)]
pub struct RecordingLink {
    sent: Mutex<Vec<ClientMessage>>,
}

impl RecordingLink {
    /// Create an empty link.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far.
    pub fn sent(&self) -> Vec<ClientMessage> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ServerLink for RecordingLink {
    fn send(&self, message: ClientMessage) -> Result<(), ClientError> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
        Ok(())
    }
}

/// What handling one server message set in motion.
#[derive(Debug)]
pub enum Dispatch {
    /// A transition was requested; the handle resolves once it has started
    /// or been skipped.
    Transition(JoinHandle<TransitionOutcome>),
    /// The in-game clock was set.
    ClockSet,
}

/// One connected client: its transition controller plus its link.
pub struct ClientSession<N, L> {
    controller: TransitionController<N>,
    natives: Arc<N>,
    link: Arc<L>,
    override_seconds: u32,
}

impl<N: WeatherNatives, L: ServerLink> ClientSession<N, L> {
    /// Create a session with a fresh controller.
    pub fn new(natives: Arc<N>, link: Arc<L>, config: &ClientConfig) -> Self {
        Self {
            controller: TransitionController::new(Arc::clone(&natives), config),
            natives,
            link,
            override_seconds: config.max_transition_seconds,
        }
    }

    /// The session's transition controller.
    pub const fn controller(&self) -> &TransitionController<N> {
        &self.controller
    }

    /// Act on a server message.
    ///
    /// Transitions run on their own task because they may wait for the
    /// previous one to finish.
    pub fn handle(&self, message: ServerMessage) -> Dispatch {
        match message {
            ServerMessage::WeatherUpdate {
                weather,
                duration_seconds,
            } => self.spawn_transition(weather, duration_seconds),
            ServerMessage::WeatherOverride { weather } => {
                info!(%weather, "Weather override received");
                self.spawn_transition(weather, self.override_seconds)
            }
            ServerMessage::TimeUpdate { hour, minute } => {
                self.natives.set_clock_time(hour, minute);
                debug!(hour, minute, "Clock synchronized");
                Dispatch::ClockSet
            }
        }
    }

    /// Decode and act on a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Decode`] if the frame is not a server message.
    pub fn handle_frame(&self, frame: &str) -> Result<Dispatch, ClientError> {
        let message: ServerMessage = serde_json::from_str(frame)?;
        Ok(self.handle(message))
    }

    /// Ask the server for this client's weather.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LinkClosed`] if the link is gone.
    pub fn request_update(&self) -> Result<(), ClientError> {
        self.link.send(ClientMessage::RequestWeatherUpdate)
    }

    /// Tell the server where the player is.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LinkClosed`] if the link is gone.
    pub fn report_position(&self, position: Position) -> Result<(), ClientError> {
        self.link.send(ClientMessage::PositionUpdate { position })
    }

    fn spawn_transition(&self, weather: Weather, seconds: u32) -> Dispatch {
        let controller = self.controller.clone();
        Dispatch::Transition(tokio::spawn(async move {
            controller.request_transition(weather, seconds).await
        }))
    }
}

/// Request a weather update every `period` until `shutdown` becomes `true`
/// or its sender is dropped. The first request goes out immediately.
/// Returns the number of requests sent; a zero `period` sends none.
pub async fn run_poller<N, L>(
    session: Arc<ClientSession<N, L>>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> u64
where
    N: WeatherNatives,
    L: ServerLink,
{
    if period.is_zero() {
        warn!("Weather poll period is zero; poller not started");
        return 0;
    }
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut sent: u64 = 0;

    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            _ = interval.tick() => {
                match session.request_update() {
                    Ok(()) => sent = sent.saturating_add(1),
                    Err(e) => warn!(error = %e, "Weather poll failed"),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    debug!(sent, "Weather poller stopped");
    sent
}
