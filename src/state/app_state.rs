//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::{
    engine::{Alert, Snapshot, Store, TimerEngine, TotalWorkInput},
    services::ChannelPresenter,
};

/// The engine as hosted by the server
pub type HostedEngine = TimerEngine<ChannelPresenter, Box<dyn Store + Send>>;

/// Main application state that hosts the timer engine
pub struct AppState {
    /// The engine; only ever locked for the duration of one command or tick
    pub engine: Arc<Mutex<HostedEngine>>,
    /// Nominal cadence of the background ticker
    pub tick_interval: Duration,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel carrying every snapshot the engine publishes
    pub snapshot_tx: watch::Sender<Snapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _snapshot_rx: watch::Receiver<Snapshot>,
    /// Channel for end-of-phase alerts
    pub alert_tx: broadcast::Sender<Alert>,
}

impl AppState {
    /// Create a new AppState, restoring the engine from `store`
    pub fn new(
        port: u16,
        host: String,
        tick_interval: Duration,
        store: Box<dyn Store + Send>,
    ) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::default());
        let (alert_tx, _) = broadcast::channel(16);
        let presenter = ChannelPresenter::new(snapshot_tx.clone(), alert_tx.clone());

        Self {
            engine: Arc::new(Mutex::new(TimerEngine::restore(presenter, store))),
            tick_interval,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
            alert_tx,
        }
    }

    /// Run a user command against the engine and return the resulting snapshot
    pub fn command<F>(&self, action: &str, command: F) -> Result<Snapshot, String>
    where
        F: FnOnce(&mut HostedEngine),
    {
        let mut engine = self.engine.lock()
            .map_err(|e| format!("Failed to lock timer engine: {}", e))?;

        command(&mut *engine);
        let snapshot = engine.snapshot();
        drop(engine); // Release the lock early

        // Update last action tracking
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        debug!("Command '{}' applied", action);
        Ok(snapshot)
    }

    /// Start or pause the timer
    pub fn toggle(&self) -> Result<Snapshot, String> {
        self.command("toggle", |engine| {
            let now = Utc::now();
            let was_running = engine.is_running();
            // Account for the partial interval before freezing
            engine.tick(now);
            if was_running {
                engine.pause();
            } else {
                engine.start(now);
            }
        })
    }

    pub fn start(&self) -> Result<Snapshot, String> {
        self.command("start", |engine| engine.start(Utc::now()))
    }

    pub fn pause(&self) -> Result<Snapshot, String> {
        self.command("pause", |engine| {
            engine.tick(Utc::now());
            engine.pause();
        })
    }

    pub fn switch_phase(&self) -> Result<Snapshot, String> {
        self.command("switch-phase", |engine| {
            let phase = engine.state().phase;
            engine.tick(Utc::now());
            // The flush may already have ended the phase
            if engine.state().phase == phase {
                engine.switch_phase();
            }
        })
    }

    pub fn switch_mode(&self) -> Result<Snapshot, String> {
        self.command("switch-mode", |engine| {
            engine.tick(Utc::now());
            engine.switch_mode();
        })
    }

    pub fn reset_banked_break(&self) -> Result<Snapshot, String> {
        self.command("reset-break", |engine| engine.reset_banked_break())
    }

    pub fn begin_edit_total_work(&self) -> Result<Snapshot, String> {
        self.command("edit-total", |engine| {
            engine.tick(Utc::now());
            engine.begin_edit_total_work();
        })
    }

    pub fn stage_edit_total_work(&self, input: TotalWorkInput) -> Result<Snapshot, String> {
        self.command("stage-total", |engine| engine.stage_edit_total_work(input))
    }

    pub fn commit_edit_total_work(&self, input: TotalWorkInput) -> Result<Snapshot, String> {
        info!("Committing total work edit: {:?}", input);
        self.command("commit-total", |engine| {
            engine.tick(Utc::now());
            engine.commit_edit_total_work(&input);
        })
    }

    pub fn cancel_edit_total_work(&self) -> Result<Snapshot, String> {
        self.command("cancel-total", |engine| engine.cancel_edit_total_work())
    }

    /// Advance the engine to now. Returns whether it is still running.
    pub fn tick(&self) -> Result<bool, String> {
        let mut engine = self.engine.lock()
            .map_err(|e| format!("Failed to lock timer engine: {}", e))?;

        engine.tick(Utc::now());
        Ok(engine.is_running())
    }

    /// Get the current snapshot
    pub fn get_snapshot(&self) -> Result<Snapshot, String> {
        self.engine.lock()
            .map(|engine| engine.snapshot())
            .map_err(|e| format!("Failed to lock timer engine: {}", e))
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    pub fn subscribe_snapshots(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn subscribe_alerts(&self) -> broadcast::Receiver<Alert> {
        self.alert_tx.subscribe()
    }
}
