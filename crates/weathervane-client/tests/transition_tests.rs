//! Timing and ordering properties of the transition controller.
//!
//! All tests run on paused tokio time, so sleeps advance instantly and
//! recorded native-call timestamps are exact.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use weathervane_client::ClientConfig;
use weathervane_client::natives::{AudioBank, NativeCall, RecordingNatives};
use weathervane_client::transition::{Phase, TransitionController, TransitionOutcome};
use weathervane_types::Weather;

fn controller() -> (TransitionController<RecordingNatives>, Arc<RecordingNatives>) {
    let natives = Arc::new(RecordingNatives::new());
    let controller = TransitionController::new(Arc::clone(&natives), &ClientConfig::default());
    (controller, natives)
}

/// Times at which `SetWeatherTypeNow` was issued, with its weather.
fn commits(natives: &RecordingNatives) -> Vec<(Instant, Weather)> {
    natives
        .timed_calls()
        .into_iter()
        .filter_map(|(at, call)| match call {
            NativeCall::SetWeatherTypeNow(weather) => Some((at, weather)),
            _ => None,
        })
        .collect()
}

fn count(natives: &RecordingNatives, wanted: NativeCall) -> usize {
    natives.calls().into_iter().filter(|call| *call == wanted).count()
}

#[tokio::test(start_paused = true)]
async fn queued_transition_commits_after_the_first() {
    let (controller, natives) = controller();
    let start = Instant::now();

    controller.request_transition(Weather::Snow, 5).await;

    let second = controller.clone();
    let handle = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        second.request_transition(Weather::Clear, 60).await
    });

    // The second request waited for the first commit at 4.5s.
    assert_eq!(
        handle.await.unwrap(),
        TransitionOutcome::Started {
            commit_at: start + Duration::from_millis(4500 + 59_500),
        }
    );

    tokio::time::sleep(Duration::from_secs(70)).await;
    let commits = commits(&natives);
    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0].1, Weather::Snow);
    assert_eq!(commits[1].1, Weather::Clear);
    assert!(commits[1].0 >= commits[0].0);
    assert_eq!(controller.phase(), Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn same_weather_makes_no_native_calls() {
    let (controller, natives) = controller();
    controller.request_transition(Weather::Rain, 2).await;
    tokio::time::sleep(Duration::from_secs(3)).await;
    natives.clear();

    assert_eq!(
        controller.request_transition(Weather::Rain, 2).await,
        TransitionOutcome::Unchanged
    );
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(natives.calls().is_empty());
    assert_eq!(controller.phase(), Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn long_durations_are_clamped() {
    let (controller, natives) = controller();
    let start = Instant::now();
    let outcome = controller.request_transition(Weather::Thunder, 120).await;
    assert_eq!(
        outcome,
        TransitionOutcome::Started {
            commit_at: start + Duration::from_millis(59_500),
        }
    );
    assert!(
        natives
            .calls()
            .contains(&NativeCall::SetWeatherTypeOvertimePersist(Weather::Thunder, 60))
    );
}

#[tokio::test(start_paused = true)]
async fn winter_effects_are_requested_once_per_entry() {
    let (controller, natives) = controller();

    controller.request_transition(Weather::Xmas, 1).await;
    controller.request_transition(Weather::Xmas, 1).await;
    assert_eq!(count(&natives, NativeCall::RequestAudioBank(AudioBank::IceFootsteps)), 1);
    assert!(controller.state().winter_effects);

    controller.request_transition(Weather::Clear, 1).await;
    controller.request_transition(Weather::Rain, 1).await;
    assert_eq!(count(&natives, NativeCall::ReleaseAudioBank(AudioBank::SnowFootsteps)), 1);
    assert!(!controller.state().winter_effects);

    controller.request_transition(Weather::Xmas, 1).await;
    assert_eq!(count(&natives, NativeCall::RequestAudioBank(AudioBank::IceFootsteps)), 2);
}

#[tokio::test(start_paused = true)]
async fn waiter_gives_up_after_its_own_duration() {
    let (controller, natives) = controller();
    let start = Instant::now();
    controller.request_transition(Weather::Rain, 60).await;

    // Rain commits at 59.5s; a 5s request stops waiting at 5s.
    let outcome = controller.request_transition(Weather::Clear, 5).await;
    assert_eq!(Instant::now() - start, Duration::from_secs(5));
    assert_eq!(
        outcome,
        TransitionOutcome::Started {
            commit_at: start + Duration::from_millis(9500),
        }
    );

    tokio::time::sleep(Duration::from_secs(60)).await;
    // The superseded rain commit never snaps the weather back.
    let commits = commits(&natives);
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].1, Weather::Clear);
    assert_eq!(controller.phase(), Phase::Idle);
    assert_eq!(controller.current_weather(), Weather::Clear);
}

#[tokio::test(start_paused = true)]
async fn commit_lead_is_configurable() {
    let natives = Arc::new(RecordingNatives::new());
    let config = ClientConfig {
        commit_lead_ms: 0,
        ..ClientConfig::default()
    };
    let controller = TransitionController::new(Arc::clone(&natives), &config);
    let start = Instant::now();
    let outcome = controller.request_transition(Weather::Foggy, 10).await;
    assert_eq!(
        outcome,
        TransitionOutcome::Started {
            commit_at: start + Duration::from_secs(10),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn matching_request_after_timeout_keeps_the_controller_busy() {
    let (controller, natives) = controller();
    let start = Instant::now();
    controller.request_transition(Weather::Rain, 60).await;

    // Rain is already the target; the 5s wait times out and changes nothing.
    assert_eq!(
        controller.request_transition(Weather::Rain, 5).await,
        TransitionOutcome::Unchanged
    );
    assert_eq!(controller.phase(), Phase::Transitioning);
    assert!(controller.state().in_progress);

    // A different target still has to wait out its own duration.
    let outcome = controller.request_transition(Weather::Clear, 10).await;
    assert_eq!(Instant::now() - start, Duration::from_secs(15));
    assert_eq!(
        outcome,
        TransitionOutcome::Started {
            commit_at: start + Duration::from_millis(24_500),
        }
    );

    tokio::time::sleep(Duration::from_secs(60)).await;
    let commits = commits(&natives);
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].1, Weather::Clear);
    assert_eq!(controller.phase(), Phase::Idle);
    assert_eq!(controller.current_weather(), Weather::Clear);
}

#[tokio::test(start_paused = true)]
async fn simultaneous_requests_commit_in_sequence() {
    let (controller, natives) = controller();

    let snow = controller.clone();
    let clear = controller.clone();
    let first = tokio::spawn(async move { snow.request_transition(Weather::Snow, 10).await });
    let second = tokio::spawn(async move { clear.request_transition(Weather::Clear, 10).await });
    let outcomes = [first.await.unwrap(), second.await.unwrap()];
    assert!(
        outcomes
            .iter()
            .all(|outcome| matches!(outcome, TransitionOutcome::Started { .. }))
    );

    tokio::time::sleep(Duration::from_secs(30)).await;
    let commits = commits(&natives);
    assert_eq!(commits.len(), 2);
    assert_ne!(commits[0].1, commits[1].1);
    // The later request waited for the earlier commit before blending.
    assert!(commits[1].0 - commits[0].0 >= Duration::from_millis(9500));
    assert_eq!(controller.phase(), Phase::Idle);
    assert_eq!(controller.current_weather(), commits[1].1);
}

#[tokio::test(start_paused = true)]
async fn oversized_configured_maximum_is_capped_at_a_minute() {
    let natives = Arc::new(RecordingNatives::new());
    let config = ClientConfig {
        max_transition_seconds: 120,
        ..ClientConfig::default()
    };
    let controller = TransitionController::new(Arc::clone(&natives), &config);
    controller.request_transition(Weather::Rain, 120).await;
    assert!(
        natives
            .calls()
            .contains(&NativeCall::SetWeatherTypeOvertimePersist(Weather::Rain, 60))
    );
}
