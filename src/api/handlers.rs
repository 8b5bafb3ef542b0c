//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{engine::Snapshot, state::AppState};
use super::responses::{ApiResponse, HealthResponse, StatusResponse, TotalWorkRequest};

type CommandResult = Result<Json<ApiResponse>, StatusCode>;

/// A missing or unreadable body counts as all components blank, which coerce to zero
fn lenient_body(body: Result<Json<TotalWorkRequest>, JsonRejection>) -> TotalWorkRequest {
    match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Treating unreadable total work body as empty: {}", rejection);
            TotalWorkRequest::default()
        }
    }
}

/// Turn an engine command outcome into a response
fn respond(outcome: Result<Snapshot, String>, message: &str) -> CommandResult {
    match outcome {
        Ok(snapshot) => {
            info!("{}", message);
            Ok(Json(ApiResponse::new(message, snapshot)))
        }
        Err(e) => {
            error!("Command failed ({}): {}", message, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /toggle - Start or pause the timer
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    let outcome = state.toggle();
    let message = match &outcome {
        Ok(snapshot) if snapshot.running => "Timer started",
        _ => "Timer paused",
    };
    respond(outcome, message)
}

/// Handle POST /start - Start the timer
pub async fn start_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    respond(state.start(), "Timer started")
}

/// Handle POST /pause - Pause the timer
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    respond(state.pause(), "Timer paused")
}

/// Handle POST /phase - Switch between working and resting
pub async fn switch_phase_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    respond(state.switch_phase(), "Phase switched")
}

/// Handle POST /mode - Switch between flow and fixed mode
pub async fn switch_mode_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    respond(state.switch_mode(), "Mode switched")
}

/// Handle POST /break/reset - Discard banked break time
pub async fn reset_break_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    respond(state.reset_banked_break(), "Banked break reset")
}

/// Handle POST /total/edit - Begin editing the total work figure
pub async fn begin_edit_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    respond(state.begin_edit_total_work(), "Editing total work")
}

/// Handle PUT /total/edit - Stage edited values without committing
pub async fn stage_edit_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TotalWorkRequest>, JsonRejection>,
) -> CommandResult {
    respond(state.stage_edit_total_work(lenient_body(body).into()), "Total work edit staged")
}

/// Handle POST /total/commit - Commit the total work figure
pub async fn commit_edit_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TotalWorkRequest>, JsonRejection>,
) -> CommandResult {
    respond(state.commit_edit_total_work(lenient_body(body).into()), "Total work updated")
}

/// Handle POST /total/cancel - Abandon the total work edit
pub async fn cancel_edit_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    respond(state.cancel_edit_total_work(), "Total work edit cancelled")
}

/// Handle GET /status - Return the current timer snapshot
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.get_snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Failed to get timer snapshot: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
