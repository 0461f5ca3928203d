//! Authentication types for the domain layer.
//!
//! Attendees authenticate with a per-registration access code instead of an
//! account. The `AccessGate` port turns `(event_code, access_code)` into an
//! `AuthenticatedAttendee`; every failure collapses into one
//! `AuthError::InvalidCredential` so callers cannot tell which part was wrong.

use super::{AttendeeId, EventId};
use thiserror::Error;

/// Attendee identity resolved from an access code, scoped to a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedAttendee {
    pub attendee_id: AttendeeId,
    pub event_id: EventId,
}

impl AuthenticatedAttendee {
    pub fn new(attendee_id: AttendeeId, event_id: EventId) -> Self {
        Self {
            attendee_id,
            event_id,
        }
    }
}

/// Authentication errors raised by the access gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Unknown event, inactive event, or unknown code.
    #[error("Invalid event code or access code")]
    InvalidCredential,

    /// Backing store could not be queried.
    #[error("Access gate unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}
