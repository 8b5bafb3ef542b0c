//! HTTP API module
//! 
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/toggle", post(toggle_handler))
        .route("/start", post(start_handler))
        .route("/pause", post(pause_handler))
        .route("/phase", post(switch_phase_handler))
        .route("/mode", post(switch_mode_handler))
        .route("/break/reset", post(reset_break_handler))
        .route("/total/edit", post(begin_edit_handler).put(stage_edit_handler))
        .route("/total/commit", post(commit_edit_handler))
        .route("/total/cancel", post(cancel_edit_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
