//! Flomodoro - A flow/pomodoro work timer
//! 
//! This library provides the timer engine (flow mode with a banked break
//! allowance, fixed mode with preset countdowns) and the pieces that host it
//! as a small local HTTP service.

pub mod config;
pub mod engine;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::{Presenter, Snapshot, Store, TimerEngine};
pub use state::{AppState, TimerState};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
