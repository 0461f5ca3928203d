//! Attendee domain events.

use serde::{Deserialize, Serialize};

use crate::domain::event::TimeSlot;
use crate::domain::foundation::{domain_event, AttendeeId, EnvelopeId, EventId, Timestamp};

/// Published when an attendee replaces their declared availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityUpdated {
    pub envelope_id: EnvelopeId,
    pub attendee_id: AttendeeId,
    pub event_id: EventId,
    pub available_slots: Vec<TimeSlot>,
    pub updated_at: Timestamp,
}

domain_event!(
    AvailabilityUpdated,
    event_type = "attendee.availability_updated.v1",
    schema_version = 1,
    aggregate_id = attendee_id,
    aggregate_type = "Attendee",
    occurred_at = updated_at,
    envelope_id = envelope_id
);

/// Published the first time an attendee verifies their access code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCodeVerified {
    pub envelope_id: EnvelopeId,
    pub attendee_id: AttendeeId,
    pub event_id: EventId,
    pub verified_at: Timestamp,
}

domain_event!(
    AccessCodeVerified,
    event_type = "attendee.code_verified.v1",
    schema_version = 1,
    aggregate_id = attendee_id,
    aggregate_type = "Attendee",
    occurred_at = verified_at,
    envelope_id = envelope_id
);

/// Published when an attendee edits their own profile. Carries field names
/// only; contact values stay out of the event stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdated {
    pub envelope_id: EnvelopeId,
    pub attendee_id: AttendeeId,
    pub event_id: EventId,
    pub changed_fields: Vec<String>,
    pub updated_at: Timestamp,
}

domain_event!(
    ProfileUpdated,
    event_type = "attendee.profile_updated.v1",
    schema_version = 1,
    aggregate_id = attendee_id,
    aggregate_type = "Attendee",
    occurred_at = updated_at,
    envelope_id = envelope_id
);
