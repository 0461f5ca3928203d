//! Command infrastructure for CQRS handlers.
//!
//! Every handler receives a `CommandMetadata` carrying the resolved caller
//! identity plus correlation context. The identity always comes from the
//! access gate, never from the request body, so a handler can only act on
//! behalf of the attendee that presented the credential.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AttendeeId, AuthenticatedAttendee, EventId};

/// Metadata context for command handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    /// The attendee executing this command.
    pub attendee_id: AttendeeId,

    /// The event the attendee's credential is scoped to.
    pub event_id: EventId,

    /// Ties every event emitted by one command together. Generated once
    /// unless the caller supplies one.
    correlation_id: String,

    /// Source of this command (e.g., "http", "seed").
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl CommandMetadata {
    /// Creates metadata for an identity resolved by the access gate.
    pub fn new(actor: &AuthenticatedAttendee) -> Self {
        Self {
            attendee_id: actor.attendee_id,
            event_id: actor.event_id,
            correlation_id: Uuid::new_v4().to_string(),
            source: None,
        }
    }

    /// Builder: Add correlation ID for request tracing.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = id.into();
        self
    }

    /// Builder: Add source identifier.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// Returns the source if set.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

#[cfg(test)]
impl CommandMetadata {
    /// Metadata for an arbitrary attendee of an arbitrary event.
    pub fn test_fixture(attendee_id: AttendeeId, event_id: EventId) -> Self {
        Self::new(&AuthenticatedAttendee::new(attendee_id, event_id))
            .with_correlation_id("test-correlation-id")
            .with_source("test")
    }
}
