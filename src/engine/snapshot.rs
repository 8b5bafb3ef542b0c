//! Snapshots and alerts pushed to presenters

use serde::Serialize;

use super::edit::TotalWorkInput;
use crate::{
    state::{Mode, Phase, TimerState},
    utils::format_hms,
};

/// Status line shown next to the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    ReadyToWork,
    ReadyToRest,
    Flowing,
    Recharging,
    Paused,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::ReadyToWork => "Ready to Flow",
            Status::ReadyToRest => "Ready to Recharge",
            Status::Flowing => "Flowing...",
            Status::Recharging => "Recharging...",
            Status::Paused => "Paused",
        }
    }

    /// Idle status for the given phase
    pub fn ready_for(phase: Phase) -> Self {
        match phase {
            Phase::Working => Status::ReadyToWork,
            Phase::Resting => Status::ReadyToRest,
        }
    }

    /// Live status for the given phase
    pub fn running_in(phase: Phase) -> Self {
        match phase {
            Phase::Working => Status::Flowing,
            Phase::Resting => Status::Recharging,
        }
    }
}

/// Everything a presenter needs to render the timer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub mode: Mode,
    pub phase: Phase,
    pub running: bool,
    pub editing: bool,
    pub title: &'static str,
    pub status: Status,
    pub status_label: &'static str,
    /// Main clock face, `HH:MM:SS`
    pub display: String,
    pub total_work: String,
    pub banked_break: String,
    /// Break statistics are hidden in fixed mode
    pub show_break_stats: bool,
    pub total_work_seconds: f64,
    pub banked_break_seconds: f64,
    pub current_session_seconds: f64,
    pub fixed_phase_remaining_seconds: f64,
    /// Input driving the total work figure while editing
    pub staged_edit: Option<TotalWorkInput>,
}

impl Snapshot {
    pub fn capture(state: &TimerState, status: Status, edit: Option<&TotalWorkInput>) -> Self {
        Self {
            mode: state.mode,
            phase: state.phase,
            running: state.running,
            editing: edit.is_some(),
            title: state.mode.title(),
            status,
            status_label: status.label(),
            display: format_hms(state.display_seconds()),
            total_work: format_hms(state.total_work_seconds),
            banked_break: format_hms(state.banked_break_seconds),
            show_break_stats: state.mode == Mode::Flow,
            total_work_seconds: state.total_work_seconds,
            banked_break_seconds: state.banked_break_seconds,
            current_session_seconds: state.current_session_seconds,
            fixed_phase_remaining_seconds: state.fixed_phase_remaining_seconds,
            staged_edit: edit.cloned(),
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::capture(&TimerState::new(), Status::ReadyToWork, None)
    }
}

/// End-of-phase cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub mode: Mode,
    /// Phase that just ran out
    pub ended: Phase,
}
