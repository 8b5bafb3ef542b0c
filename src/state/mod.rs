//! State management module
//! 
//! This module contains the timer state itself and the shared application
//! state that hosts the engine.

pub mod app_state;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, HostedEngine};
pub use timer_state::{
    Mode, Phase, TimerRecord, TimerState, FIXED_REST_SECONDS, FIXED_WORK_SECONDS,
    FLOW_BREAK_RATIO,
};
