//! Background task that turns engine alerts into a cue for the user

use std::{
    io::{self, Write},
    sync::Arc,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::{engine::Alert, state::{AppState, Mode, Phase}};

/// Log every end-of-phase alert and, when `bell` is set, ring the terminal bell
pub async fn alert_cue_task(state: Arc<AppState>, bell: bool) {
    info!("Starting alert cue task");

    let mut alert_rx = state.subscribe_alerts();

    loop {
        match alert_rx.recv().await {
            Ok(alert) => {
                info!("{}", cue_message(&alert));
                if bell {
                    ring_bell();
                }
            }
            Err(RecvError::Lagged(missed)) => {
                warn!("Alert cue task fell behind, {} alerts dropped", missed);
            }
            Err(RecvError::Closed) => {
                info!("Alert channel closed, stopping alert cue task");
                return;
            }
        }
    }
}

/// Human readable line for an alert
pub fn cue_message(alert: &Alert) -> &'static str {
    match (alert.mode, alert.ended) {
        (Mode::Flow, Phase::Resting) => "Banked break used up, time to flow again",
        (Mode::Flow, Phase::Working) => "Flow session ended",
        (Mode::Fixed, Phase::Working) => "Pomodoro finished, take a break",
        (Mode::Fixed, Phase::Resting) => "Break over, back to work",
    }
}

fn ring_bell() {
    let mut stdout = io::stdout();
    if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
        warn!("Failed to ring terminal bell: {}", e);
    }
}
