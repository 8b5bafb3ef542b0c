//! Timer state structure and its persisted record

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::value::RawValue;

/// Seconds of work needed to bank one second of break in flow mode
pub const FLOW_BREAK_RATIO: f64 = 5.0;
/// Fixed-mode work countdown (25 minutes)
pub const FIXED_WORK_SECONDS: f64 = 25.0 * 60.0;
/// Fixed-mode rest countdown (5 minutes)
pub const FIXED_REST_SECONDS: f64 = 5.0 * 60.0;

/// Timing discipline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Open-ended work sessions that bank break time
    #[default]
    #[serde(alias = "flomodoro")]
    Flow,
    /// Preset work/rest countdowns
    #[serde(alias = "pomodoro")]
    Fixed,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Flow => Mode::Fixed,
            Mode::Fixed => Mode::Flow,
        }
    }

    /// Heading shown by presenters
    pub fn title(self) -> &'static str {
        match self {
            Mode::Flow => "FLOMODORO",
            Mode::Fixed => "POMODORO",
        }
    }
}

/// Current half-cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Working,
    Resting,
}

impl Phase {
    pub fn flipped(self) -> Self {
        match self {
            Phase::Working => Phase::Resting,
            Phase::Resting => Phase::Working,
        }
    }

    /// Countdown preset for this phase in fixed mode
    pub fn fixed_preset(self) -> f64 {
        match self {
            Phase::Working => FIXED_WORK_SECONDS,
            Phase::Resting => FIXED_REST_SECONDS,
        }
    }
}

/// All counters and flags owned by the timer engine
#[derive(Debug, Clone, PartialEq)]
pub struct TimerState {
    pub mode: Mode,
    pub phase: Phase,
    pub running: bool,
    pub total_work_seconds: f64,
    pub banked_break_seconds: f64,
    pub current_session_seconds: f64,
    pub fixed_phase_remaining_seconds: f64,
    /// Wall-clock time of the last accounting update, only set while running
    pub last_tick: Option<DateTime<Utc>>,
}

impl TimerState {
    /// Create a fresh state: flow mode, working, nothing accrued
    pub fn new() -> Self {
        Self {
            mode: Mode::Flow,
            phase: Phase::Working,
            running: false,
            total_work_seconds: 0.0,
            banked_break_seconds: 0.0,
            current_session_seconds: 0.0,
            fixed_phase_remaining_seconds: FIXED_WORK_SECONDS,
            last_tick: None,
        }
    }

    /// Rebuild a paused state from a persisted record
    pub fn from_record(record: &TimerRecord) -> Self {
        Self {
            mode: record.mode,
            phase: record.phase,
            running: false,
            total_work_seconds: record.total_work_seconds,
            banked_break_seconds: record.banked_break_seconds,
            current_session_seconds: record.current_session_seconds,
            fixed_phase_remaining_seconds: record.fixed_phase_remaining_seconds,
            last_tick: None,
        }
    }

    /// Capture the persistable part of this state
    pub fn to_record(&self, saved_at: DateTime<Utc>) -> TimerRecord {
        TimerRecord {
            total_work_seconds: self.total_work_seconds,
            banked_break_seconds: self.banked_break_seconds,
            mode: self.mode,
            fixed_phase_remaining_seconds: self.fixed_phase_remaining_seconds,
            current_session_seconds: self.current_session_seconds,
            phase: self.phase,
            saved_at,
        }
    }

    /// Seconds shown on the main clock face
    pub fn display_seconds(&self) -> f64 {
        match (self.mode, self.phase) {
            (Mode::Flow, Phase::Working) => self.current_session_seconds,
            (Mode::Flow, Phase::Resting) => self.banked_break_seconds,
            (Mode::Fixed, _) => self.fixed_phase_remaining_seconds,
        }
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

/// The single record kept by a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerRecord {
    pub total_work_seconds: f64,
    pub banked_break_seconds: f64,
    pub mode: Mode,
    pub fixed_phase_remaining_seconds: f64,
    pub current_session_seconds: f64,
    pub phase: Phase,
    pub saved_at: DateTime<Utc>,
}

impl TimerRecord {
    /// Encode the record as JSON text
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Decode a record leniently.
    ///
    /// Returns `None` unless the text is a JSON object. Each field is decoded on
    /// its own; a missing or unusable field takes its fresh-state default.
    pub fn from_json(text: &str) -> Option<Self> {
        // Values stay raw so one unparsable number only spoils its own field
        let object = serde_json::from_str::<RawObject>(text).ok()?;
        let fresh = TimerState::new();

        Some(Self {
            total_work_seconds: counter(&object, "totalWorkSeconds")
                .unwrap_or(fresh.total_work_seconds),
            banked_break_seconds: counter(&object, "bankedBreakSeconds")
                .unwrap_or(fresh.banked_break_seconds),
            mode: field(&object, "mode").unwrap_or(fresh.mode),
            fixed_phase_remaining_seconds: counter(&object, "fixedPhaseRemainingSeconds")
                .unwrap_or(fresh.fixed_phase_remaining_seconds),
            current_session_seconds: counter(&object, "currentSessionSeconds")
                .unwrap_or(fresh.current_session_seconds),
            phase: field(&object, "phase").unwrap_or(fresh.phase),
            saved_at: field(&object, "savedAt").unwrap_or_default(),
        })
    }
}

type RawObject = HashMap<String, Box<RawValue>>;

fn field<T: DeserializeOwned>(object: &RawObject, key: &str) -> Option<T> {
    object
        .get(key)
        .and_then(|raw| serde_json::from_str(raw.get()).ok())
}

fn counter(object: &RawObject, key: &str) -> Option<f64> {
    field::<f64>(object, key).filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
}
