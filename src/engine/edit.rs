//! Staged input for editing the total work figure

use serde::Serialize;
use serde_json::Value;

/// Raw hours/minutes/seconds text as typed by the user.
///
/// Values stay unparsed until committed so that whatever is staged can be
/// committed as-is, including garbage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TotalWorkInput {
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
}

impl TotalWorkInput {
    pub fn new(
        hours: impl Into<String>,
        minutes: impl Into<String>,
        seconds: impl Into<String>,
    ) -> Self {
        Self {
            hours: hours.into(),
            minutes: minutes.into(),
            seconds: seconds.into(),
        }
    }

    /// Split a total into its h/m/s components, as an input form would be prefilled
    pub fn from_total_seconds(total: f64) -> Self {
        let whole = if total.is_finite() && total > 0.0 {
            total.floor() as u64
        } else {
            0
        };
        Self::new(
            (whole / 3600).to_string(),
            (whole % 3600 / 60).to_string(),
            (whole % 60).to_string(),
        )
    }

    /// Accept loosely typed JSON for each component (numbers, strings, anything)
    pub fn from_json_values(hours: &Value, minutes: &Value, seconds: &Value) -> Self {
        Self::new(raw_text(hours), raw_text(minutes), raw_text(seconds))
    }

    /// Total seconds after coercing each component to a non-negative integer
    pub fn total_seconds(&self) -> u64 {
        coerce_component(&self.hours)
            .saturating_mul(3600)
            .saturating_add(coerce_component(&self.minutes).saturating_mul(60))
            .saturating_add(coerce_component(&self.seconds))
    }
}

fn raw_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    }
}

/// Parse one component; anything that is not a non-negative number becomes 0
pub fn coerce_component(raw: &str) -> u64 {
    let raw = raw.trim();
    if let Ok(whole) = raw.parse::<u64>() {
        return whole;
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value.floor() as u64,
        _ => 0,
    }
}
