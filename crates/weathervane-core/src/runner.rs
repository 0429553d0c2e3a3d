//! Fixed-period driver for the world clock.
//!
//! [`run_world_clock`] ticks the [`WorldService`] on an absolute schedule
//! (`tokio::time::interval`), so slow ticks do not push later ones back.
//! The first tick fires immediately. Missed ticks are skipped rather than
//! replayed in a burst.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::service::WorldService;

/// Tick `service` every `period` until `shutdown` becomes `true` or its
/// sender is dropped. Returns the number of ticks executed.
pub async fn run_world_clock(
    service: Arc<WorldService>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> u64 {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut ticks: u64 = 0;

    info!(?period, "World clock starting");

    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            _ = interval.tick() => {
                service.tick().await;
                ticks = ticks.saturating_add(1);
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    info!(ticks, "World clock stopped");
    ticks
}
