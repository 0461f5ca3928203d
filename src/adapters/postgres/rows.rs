//! Row types shared by the PostgreSQL adapters.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::attendee::{AccessCodeDigest, Attendee, AttendeeProfile};
use crate::domain::event::{Event, EventCode, TimeSlot};
use crate::domain::foundation::{
    AttendeeId, DomainError, ErrorCode, EventId, RequestId, Timestamp,
};
use crate::domain::networking::{NetworkingRequest, RequestStatus};

pub(super) const EVENT_COLUMNS: &str =
    "id, event_code, name, networking_slots, is_active, created_at";

pub(super) const ATTENDEE_COLUMNS: &str = "id, event_id, full_name, organization, position, \
     bio, interests, linkedin_url, email, phone, photo_url, access_code_hash, code_verified, \
     available_slots, created_at, updated_at";

pub(super) const REQUEST_COLUMNS: &str = "id, event_id, requester_id, target_id, time_slot, \
     message, status, created_at, updated_at";

pub(super) fn db_error(action: &str) -> impl Fn(sqlx::Error) -> DomainError + '_ {
    move |e| DomainError::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", action, e))
}

fn corrupt(what: &str, reason: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} in database: {}", what, reason),
    )
}

fn parse_slots(raw: Vec<String>) -> Result<Vec<TimeSlot>, DomainError> {
    raw.into_iter()
        .map(|s| TimeSlot::new(s).map_err(|e| corrupt("time slot", e)))
        .collect()
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct EventRow {
    pub id: Uuid,
    pub event_code: String,
    pub name: String,
    pub networking_slots: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = DomainError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let code = EventCode::parse(&row.event_code).map_err(|e| corrupt("event code", e))?;
        Ok(Event::reconstitute(
            EventId::from_uuid(row.id),
            code,
            row.name,
            parse_slots(row.networking_slots)?,
            row.is_active,
            Timestamp::from_datetime(row.created_at),
        ))
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct AttendeeRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub full_name: String,
    pub organization: String,
    pub position: String,
    pub bio: String,
    pub interests: Vec<String>,
    pub linkedin_url: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub access_code_hash: String,
    pub code_verified: bool,
    pub available_slots: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AttendeeRow> for Attendee {
    type Error = DomainError;

    fn try_from(row: AttendeeRow) -> Result<Self, Self::Error> {
        let profile = AttendeeProfile {
            full_name: row.full_name,
            organization: row.organization,
            position: row.position,
            bio: row.bio,
            interests: row.interests,
            linkedin_url: row.linkedin_url,
            email: row.email,
            phone: row.phone,
            photo_url: row.photo_url,
        };
        Ok(Attendee::reconstitute(
            AttendeeId::from_uuid(row.id),
            EventId::from_uuid(row.event_id),
            profile,
            AccessCodeDigest::from_hex(row.access_code_hash),
            row.code_verified,
            parse_slots(row.available_slots)?,
            Timestamp::from_datetime(row.created_at),
            Timestamp::from_datetime(row.updated_at),
        ))
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct RequestRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub requester_id: Uuid,
    pub target_id: Uuid,
    pub time_slot: String,
    pub message: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<RequestRow> for NetworkingRequest {
    type Error = DomainError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        let status: RequestStatus = row.status.parse().map_err(|e| corrupt("status", e))?;
        let time_slot = TimeSlot::new(row.time_slot).map_err(|e| corrupt("time slot", e))?;
        Ok(NetworkingRequest::reconstitute(
            RequestId::from_uuid(row.id),
            EventId::from_uuid(row.event_id),
            AttendeeId::from_uuid(row.requester_id),
            AttendeeId::from_uuid(row.target_id),
            time_slot,
            row.message,
            status,
            Timestamp::from_datetime(row.created_at),
            Timestamp::from_datetime(row.updated_at),
        ))
    }
}

pub(super) fn slots_to_strings(slots: &[TimeSlot]) -> Vec<String> {
    slots.iter().map(|s| s.as_str().to_string()).collect()
}
