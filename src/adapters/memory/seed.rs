//! YAML seed loader for the in-memory backend.
//!
//! Events and attendees normally come from the organiser back office. For
//! local runs and demos the memory backend is populated from a file like:
//!
//! ```yaml
//! events:
//!   - code: A1B2C3D4
//!     name: Expo 2026
//!     networking_window: { end_time: "17:00", hours: 1.5 }
//!     attendees:
//!       - full_name: Ada Obi
//!         organization: Northwind
//!         position: CTO
//!         email: ada@northwind.example
//!         access_code: K7P2M9QX4RTA
//!         code_verified: true
//!         available_slots: ["17:15", "17:30"]
//! ```
//!
//! Access codes are hashed on load; the plaintext is not kept.

use chrono::NaiveTime;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::domain::attendee::{AccessCode, Attendee, AttendeeProfile};
use crate::domain::event::{Event, EventCode, NetworkingWindow, TimeSlot};
use crate::domain::foundation::{AttendeeId, DomainError, EventId, ValidationError};

use super::InMemoryNetworkingStore;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid seed value: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Seed rejected: {0}")]
    Rejected(#[from] DomainError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFile {
    #[serde(default)]
    pub events: Vec<SeedEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedEvent {
    /// Generated when omitted.
    pub code: Option<String>,
    pub name: String,
    #[serde(default)]
    pub networking_slots: Vec<String>,
    pub networking_window: Option<SeedWindow>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub attendees: Vec<SeedAttendee>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedWindow {
    /// `HH:MM`
    pub end_time: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedAttendee {
    #[serde(flatten)]
    pub profile: AttendeeProfile,
    pub access_code: String,
    #[serde(default)]
    pub code_verified: bool,
    #[serde(default)]
    pub available_slots: Vec<String>,
}

fn default_active() -> bool {
    true
}

/// Counts of what a seed run created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub events: usize,
    pub attendees: usize,
}

impl SeedFile {
    pub fn from_yaml(yaml: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub async fn load(path: &Path) -> Result<Self, SeedError> {
        let yaml = tokio::fs::read_to_string(path).await?;
        Self::from_yaml(&yaml)
    }

    /// Inserts every event and attendee into `store`.
    pub async fn apply(&self, store: &InMemoryNetworkingStore) -> Result<SeedSummary, SeedError> {
        let mut summary = SeedSummary::default();

        for seed in &self.events {
            let event = seed.build_event()?;
            store.add_event(event.clone()).await?;
            summary.events += 1;

            for attendee in &seed.attendees {
                store.add_attendee(attendee.build(&event)?).await?;
                summary.attendees += 1;
            }
        }

        Ok(summary)
    }
}

impl SeedEvent {
    fn build_event(&self) -> Result<Event, SeedError> {
        let code = match &self.code {
            Some(raw) => EventCode::parse(raw)?,
            None => EventCode::generate(),
        };

        let slots = match (&self.networking_window, self.networking_slots.is_empty()) {
            (Some(_), false) => {
                return Err(ValidationError::invalid_format(
                    "networking_slots",
                    "set either networking_slots or networking_window, not both",
                )
                .into())
            }
            (Some(window), true) => {
                let end_time = NaiveTime::parse_from_str(&window.end_time, "%H:%M").map_err(
                    |e| ValidationError::invalid_format("end_time", e.to_string()),
                )?;
                NetworkingWindow::new(end_time, window.hours)?.slots()
            }
            (None, _) => parse_slots(&self.networking_slots)?,
        };

        let mut event = Event::new(EventId::new(), code, self.name.clone(), slots)?;
        if !self.is_active {
            event.deactivate();
        }
        Ok(event)
    }
}

impl SeedAttendee {
    fn build(&self, event: &Event) -> Result<Attendee, SeedError> {
        let code = AccessCode::parse(&self.access_code)?;
        let mut attendee =
            Attendee::register(AttendeeId::new(), event, self.profile.clone(), &code)?;
        attendee.set_availability(event, &parse_slots(&self.available_slots)?)?;
        if self.code_verified {
            attendee.mark_code_verified();
        }
        Ok(attendee)
    }
}

fn parse_slots(raw: &[String]) -> Result<Vec<TimeSlot>, ValidationError> {
    raw.iter().map(|s| TimeSlot::new(s.as_str())).collect()
}
