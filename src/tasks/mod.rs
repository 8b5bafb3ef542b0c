//! Background tasks module
//! 
//! This module contains background tasks that run alongside the HTTP server.

pub mod alert_cue;
pub mod ticker;

// Re-export main functions
pub use alert_cue::alert_cue_task;
pub use ticker::ticker_task;
