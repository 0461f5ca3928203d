//! Slot tokens and networking window generation.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

const MAX_SLOT_LEN: usize = 32;

/// Minutes between the end of the day's sessions and the first networking slot.
pub const NETWORKING_OFFSET_MINUTES: i64 = 15;

/// Spacing between generated networking slots.
pub const SLOT_INTERVAL_MINUTES: i64 = 15;

/// Opaque label for one atomic networking slot, e.g. `"10:00-10:30"`.
///
/// Slots are compared by exact token equality; overlapping ranges are not
/// interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot(String);

impl TimeSlot {
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        let token = raw.trim();
        if token.is_empty() {
            return Err(ValidationError::empty_field("time_slot"));
        }
        let len = token.chars().count();
        if len > MAX_SLOT_LEN {
            return Err(ValidationError::too_long("time_slot", MAX_SLOT_LEN, len));
        }
        if token.chars().any(char::is_control) {
            return Err(ValidationError::invalid_format(
                "time_slot",
                "control characters are not allowed",
            ));
        }
        Ok(Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.0
    }
}

/// Networking period that follows the day's programme.
///
/// Slots start [`NETWORKING_OFFSET_MINUTES`] after `end_time` and repeat every
/// [`SLOT_INTERVAL_MINUTES`] for `hours`, labelled `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkingWindow {
    end_time: NaiveTime,
    hours: f64,
}

impl NetworkingWindow {
    pub fn new(end_time: NaiveTime, hours: f64) -> Result<Self, ValidationError> {
        if !hours.is_finite() || !(0.0..=24.0).contains(&hours) {
            return Err(ValidationError::invalid_format(
                "networking_hours",
                "must be between 0 and 24",
            ));
        }
        Ok(Self { end_time, hours })
    }

    /// Generates the slot tokens for this window. Zero hours yields no slots.
    pub fn slots(&self) -> Vec<TimeSlot> {
        let total_minutes = (self.hours * 60.0).round() as i64;
        let start = self.end_time + Duration::minutes(NETWORKING_OFFSET_MINUTES);

        (0..total_minutes)
            .step_by(SLOT_INTERVAL_MINUTES as usize)
            .map(|offset| {
                let at = start + Duration::minutes(offset);
                TimeSlot(at.format("%H:%M").to_string())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn labels(slots: &[TimeSlot]) -> Vec<&str> {
        slots.iter().map(TimeSlot::as_str).collect()
    }

    #[test]
    fn time_slot_trims_and_keeps_token() {
        assert_eq!(TimeSlot::new(" 10:00-10:30 ").unwrap().as_str(), "10:00-10:30");
    }

    #[test]
    fn time_slot_rejects_empty_and_oversized() {
        assert!(TimeSlot::new("  ").is_err());
        assert!(TimeSlot::new("x".repeat(33)).is_err());
    }

    #[test]
    fn window_starts_after_offset_and_steps_quarter_hours() {
        let window = NetworkingWindow::new(time(17, 0), 1.0).unwrap();
        assert_eq!(
            labels(&window.slots()),
            vec!["17:15", "17:30", "17:45", "18:00"]
        );
    }

    #[test]
    fn window_handles_fractional_hours() {
        let window = NetworkingWindow::new(time(18, 0), 0.5).unwrap();
        assert_eq!(labels(&window.slots()), vec!["18:15", "18:30"]);
    }

    #[test]
    fn zero_hour_window_has_no_slots() {
        let window = NetworkingWindow::new(time(18, 0), 0.0).unwrap();
        assert!(window.slots().is_empty());
    }

    #[test]
    fn window_rejects_negative_hours() {
        assert!(NetworkingWindow::new(time(18, 0), -1.0).is_err());
    }

    #[test]
    fn window_wraps_past_midnight() {
        let window = NetworkingWindow::new(time(23, 30), 0.5).unwrap();
        assert_eq!(labels(&window.slots()), vec!["23:45", "00:00"]);
    }
}
