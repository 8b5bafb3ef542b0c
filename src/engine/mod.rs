//! Timer engine
//!
//! The engine owns the timer state and applies the time-accounting rules. It
//! never schedules anything itself: the host calls [`TimerEngine::tick`] while
//! the engine reports itself running and forwards user commands. Rendering and
//! persistence go out through the [`Presenter`] and [`Store`] seams.

pub mod edit;
pub mod snapshot;
pub mod timer;

pub use edit::TotalWorkInput;
pub use snapshot::{Alert, Snapshot, Status};
pub use timer::TimerEngine;

use crate::state::TimerRecord;

/// Receives everything the engine wants shown
pub trait Presenter {
    fn on_snapshot(&mut self, snapshot: &Snapshot);
    fn on_alert(&mut self, alert: &Alert);
}

/// Keeps the single persisted record
pub trait Store {
    fn save(&mut self, record: &TimerRecord) -> anyhow::Result<()>;
    /// `Ok(None)` when nothing has been saved yet
    fn load(&self) -> anyhow::Result<Option<TimerRecord>>;
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn save(&mut self, record: &TimerRecord) -> anyhow::Result<()> {
        (**self).save(record)
    }

    fn load(&self) -> anyhow::Result<Option<TimerRecord>> {
        (**self).load()
    }
}
