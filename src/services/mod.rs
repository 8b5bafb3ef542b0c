//! Collaborators the timer engine talks to
//! 
//! This module contains the store that keeps the timer record on disk and the
//! presenter that fans engine output out to the rest of the application.

pub mod presenter;
pub mod store;

// Re-export main types
pub use presenter::ChannelPresenter;
pub use store::{JsonFileStore, MemoryStore, STORE_KEY};
