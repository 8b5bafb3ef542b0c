//! Presenter that publishes onto tokio channels

use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use crate::engine::{Alert, Presenter, Snapshot};

/// Forwards snapshots to a watch channel and alerts to a broadcast channel.
///
/// The HTTP layer and the background tasks subscribe to these.
#[derive(Debug, Clone)]
pub struct ChannelPresenter {
    snapshot_tx: watch::Sender<Snapshot>,
    alert_tx: broadcast::Sender<Alert>,
}

impl ChannelPresenter {
    pub fn new(snapshot_tx: watch::Sender<Snapshot>, alert_tx: broadcast::Sender<Alert>) -> Self {
        Self {
            snapshot_tx,
            alert_tx,
        }
    }
}

impl Presenter for ChannelPresenter {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        if let Err(e) = self.snapshot_tx.send(snapshot.clone()) {
            warn!("Failed to publish timer snapshot: {}", e);
        }
    }

    fn on_alert(&mut self, alert: &Alert) {
        // Nobody listening is fine, the alert is still logged by the engine
        if let Err(e) = self.alert_tx.send(*alert) {
            debug!("No alert listeners: {}", e);
        }
    }
}
