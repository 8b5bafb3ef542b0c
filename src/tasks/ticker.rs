//! Background task that drives the engine while it runs

use std::sync::Arc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::state::AppState;

/// Tick the engine at the configured cadence for as long as it reports itself running.
///
/// The running flag in the published snapshot is the only cancellation signal:
/// as soon as a snapshot says the engine stopped (user pause or phase expiry)
/// the interval is dropped, so ticks never overlap or outlive a pause.
pub async fn ticker_task(state: Arc<AppState>) {
    info!("Starting ticker task ({:?} cadence)", state.tick_interval);

    let mut snapshot_rx = state.subscribe_snapshots();

    loop {
        // Wait for the engine to start running
        let running = snapshot_rx.borrow_and_update().running;
        if !running {
            if snapshot_rx.changed().await.is_err() {
                warn!("Snapshot channel closed, stopping ticker task");
                return;
            }
            continue;
        }

        debug!("Engine running, scheduling ticks");
        let period = state.tick_interval;
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match state.tick() {
                        Ok(true) => {}
                        Ok(false) => {
                            debug!("Engine stopped during tick");
                            break;
                        }
                        Err(e) => {
                            error!("Failed to tick timer: {}", e);
                            break;
                        }
                    }
                }

                changed = snapshot_rx.changed() => {
                    if changed.is_err() {
                        warn!("Snapshot channel closed, stopping ticker task");
                        return;
                    }
                    if !snapshot_rx.borrow_and_update().running {
                        debug!("Engine paused, cancelling ticks");
                        break;
                    }
                }
            }
        }
    }
}
