//! Server message dispatch and the poll loop.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use weathervane_client::natives::{NativeCall, RecordingNatives};
use weathervane_client::session::{ClientSession, Dispatch, RecordingLink, run_poller};
use weathervane_client::transition::TransitionOutcome;
use weathervane_client::{ClientConfig, ClientError};
use weathervane_types::{ClientMessage, Position, ServerMessage, Weather};

type Session = ClientSession<RecordingNatives, RecordingLink>;

fn session() -> (Arc<Session>, Arc<RecordingNatives>, Arc<RecordingLink>) {
    let natives = Arc::new(RecordingNatives::new());
    let link = Arc::new(RecordingLink::new());
    let session = ClientSession::new(Arc::clone(&natives), Arc::clone(&link), &ClientConfig::default());
    (Arc::new(session), natives, link)
}

async fn outcome(dispatch: Dispatch) -> Option<TransitionOutcome> {
    match dispatch {
        Dispatch::Transition(handle) => Some(handle.await.unwrap()),
        Dispatch::ClockSet => None,
    }
}

#[tokio::test(start_paused = true)]
async fn weather_update_frame_starts_a_transition() {
    let (session, natives, _) = session();
    let dispatch = session
        .handle_frame(r#"{"type":"weather_update","weather":"RAIN","durationSeconds":10}"#)
        .unwrap();
    assert!(matches!(
        outcome(dispatch).await,
        Some(TransitionOutcome::Started { .. })
    ));
    assert!(
        natives
            .calls()
            .contains(&NativeCall::SetWeatherTypeOvertimePersist(Weather::Rain, 10))
    );
    assert_eq!(session.controller().current_weather(), Weather::Rain);
}

#[tokio::test(start_paused = true)]
async fn override_uses_the_maximum_duration() {
    let (session, natives, _) = session();
    let dispatch = session.handle(ServerMessage::WeatherOverride {
        weather: Weather::Halloween,
    });
    outcome(dispatch).await;
    assert!(
        natives
            .calls()
            .contains(&NativeCall::SetWeatherTypeOvertimePersist(Weather::Halloween, 60))
    );
}

#[tokio::test]
async fn time_update_sets_the_clock() {
    let (session, natives, _) = session();
    let dispatch = session.handle(ServerMessage::TimeUpdate { hour: 21, minute: 15 });
    assert!(outcome(dispatch).await.is_none());
    assert_eq!(natives.calls(), vec![NativeCall::SetClockTime(21, 15)]);
}

#[tokio::test]
async fn malformed_frames_are_rejected() {
    let (session, natives, _) = session();
    for frame in [
        "not json",
        r#"{"type":"weather_update","weather":"HAIL","durationSeconds":10}"#,
        r#"{"type":"unknown"}"#,
    ] {
        assert!(matches!(session.handle_frame(frame), Err(ClientError::Decode { .. })));
    }
    assert!(natives.calls().is_empty());
}

#[tokio::test]
async fn requests_go_through_the_link() {
    let (session, _, link) = session();
    session.request_update().unwrap();
    session.report_position(Position::new(10.0, 2500.0, 30.0)).unwrap();
    assert_eq!(
        link.sent(),
        vec![
            ClientMessage::RequestWeatherUpdate,
            ClientMessage::PositionUpdate {
                position: Position::new(10.0, 2500.0, 30.0),
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn poller_requests_on_its_period() {
    let (session, _, link) = session();
    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(run_poller(Arc::clone(&session), Duration::from_secs(10), rx));

    tokio::time::sleep(Duration::from_secs(25)).await;
    tx.send(true).unwrap();
    assert_eq!(handle.await.unwrap(), 3);
    assert!(
        link.sent()
            .iter()
            .all(|m| *m == ClientMessage::RequestWeatherUpdate)
    );
}

#[tokio::test(start_paused = true)]
async fn zero_poll_period_sends_nothing() {
    let (session, _, link) = session();
    let (_tx, rx) = watch::channel(false);
    assert_eq!(run_poller(Arc::clone(&session), Duration::ZERO, rx).await, 0);
    assert!(link.sent().is_empty());
}
