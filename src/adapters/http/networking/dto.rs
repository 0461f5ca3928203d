//! HTTP DTOs for the public event endpoints.
//!
//! Request bodies reject unknown fields. Responses never carry another
//! attendee's contact details except inside an accepted request.

use serde::{Deserialize, Serialize};

use crate::application::handlers::{AttendeeProfileView, Decision, DirectoryEntry, DirectoryView};
use crate::domain::attendee::{Attendee, ProfileChanges};
use crate::domain::event::{Event, TimeSlot};
use crate::domain::networking::{CounterpartView, PartyRole, RequestStatus, RequestView};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /verify`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyRequest {
    pub access_code: String,
}

/// `?access_code=` on GET and DELETE routes.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessCodeQuery {
    #[serde(default)]
    pub access_code: String,
}

/// Body of `PATCH /availability`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateAvailabilityRequest {
    pub access_code: String,
    pub slots: Vec<String>,
}

/// Body of `PATCH /profile`. Omitted fields are left unchanged.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub access_code: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub interests: Option<Vec<String>>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl UpdateProfileRequest {
    pub fn into_changes(self) -> ProfileChanges {
        ProfileChanges {
            full_name: self.full_name,
            organization: self.organization,
            position: self.position,
            bio: self.bio,
            interests: self.interests,
            linkedin_url: self.linkedin_url,
            phone: self.phone,
            photo_url: self.photo_url,
        }
    }
}

/// Body of `POST /networking/request`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateNetworkingRequest {
    pub access_code: String,
    /// Attendee id of the person being asked.
    pub profile_id: String,
    pub time_slot: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// The only statuses a target may set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestDecision {
    Accepted,
    Rejected,
}

impl From<RequestDecision> for Decision {
    fn from(decision: RequestDecision) -> Self {
        match decision {
            RequestDecision::Accepted => Decision::Accept,
            RequestDecision::Rejected => Decision::Reject,
        }
    }
}

/// Body of `PATCH /networking/:request_id`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RespondRequest {
    pub access_code: String,
    pub status: RequestDecision,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct EventSummaryResponse {
    pub code: String,
    pub name: String,
    pub networking_slots: Vec<String>,
}

impl From<&Event> for EventSummaryResponse {
    fn from(event: &Event) -> Self {
        Self {
            code: event.code().to_string(),
            name: event.name().to_string(),
            networking_slots: slot_strings(event.networking_slots()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CounterpartResponse {
    pub id: String,
    pub full_name: String,
    pub organization: String,
    pub position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl From<CounterpartView> for CounterpartResponse {
    fn from(view: CounterpartView) -> Self {
        Self {
            id: view.attendee_id.to_string(),
            full_name: view.full_name,
            organization: view.organization,
            position: view.position,
            photo_url: view.photo_url,
            email: view.email,
            phone: view.phone,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkingRequestResponse {
    pub id: String,
    pub role: PartyRole,
    pub time_slot: String,
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub counterpart: CounterpartResponse,
}

impl From<RequestView> for NetworkingRequestResponse {
    fn from(view: RequestView) -> Self {
        Self {
            id: view.id.to_string(),
            role: view.role,
            time_slot: view.time_slot.to_string(),
            status: view.status,
            message: view.message,
            created_at: view.created_at.to_string(),
            updated_at: view.updated_at.to_string(),
            counterpart: view.counterpart.into(),
        }
    }
}

/// The caller's own profile, including their own contact fields.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub event: EventSummaryResponse,
    pub full_name: String,
    pub organization: String,
    pub position: String,
    pub bio: String,
    pub interests: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub code_verified: bool,
    pub available_slots: Vec<String>,
    pub open_slots: Vec<String>,
    pub received: Vec<NetworkingRequestResponse>,
    pub sent: Vec<NetworkingRequestResponse>,
}

impl From<AttendeeProfileView> for ProfileResponse {
    fn from(view: AttendeeProfileView) -> Self {
        let AttendeeProfileView {
            event,
            attendee,
            open_slots,
            networking,
        } = view;
        let profile = attendee.profile().clone();

        Self {
            id: attendee.id().to_string(),
            event: (&event).into(),
            full_name: profile.full_name,
            organization: profile.organization,
            position: profile.position,
            bio: profile.bio,
            interests: profile.interests,
            linkedin_url: profile.linkedin_url,
            email: profile.email,
            phone: profile.phone,
            photo_url: profile.photo_url,
            code_verified: attendee.code_verified(),
            available_slots: slot_strings(attendee.available_slots()),
            open_slots: slot_strings(&open_slots),
            received: networking.received.into_iter().map(Into::into).collect(),
            sent: networking.sent.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyResponse {
    pub verified: bool,
    pub profile: ProfileResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityResponse {
    pub id: String,
    pub available_slots: Vec<String>,
    pub updated_at: String,
}

impl From<&Attendee> for AvailabilityResponse {
    fn from(attendee: &Attendee) -> Self {
        Self {
            id: attendee.id().to_string(),
            available_slots: slot_strings(attendee.available_slots()),
            updated_at: attendee.updated_at().to_string(),
        }
    }
}

/// Public listing entry: no email or phone.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryAttendeeResponse {
    pub id: String,
    pub full_name: String,
    pub organization: String,
    pub position: String,
    pub bio: String,
    pub interests: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub available_slots: Vec<String>,
}

impl From<DirectoryEntry> for DirectoryAttendeeResponse {
    fn from(entry: DirectoryEntry) -> Self {
        let profile = entry.attendee.profile().clone();
        Self {
            id: entry.attendee.id().to_string(),
            full_name: profile.full_name,
            organization: profile.organization,
            position: profile.position,
            bio: profile.bio,
            interests: profile.interests,
            linkedin_url: profile.linkedin_url,
            photo_url: profile.photo_url,
            available_slots: slot_strings(&entry.open_slots),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectoryResponse {
    pub event: EventSummaryResponse,
    pub attendees: Vec<DirectoryAttendeeResponse>,
    pub received: Vec<NetworkingRequestResponse>,
    pub sent: Vec<NetworkingRequestResponse>,
}

impl From<DirectoryView> for DirectoryResponse {
    fn from(view: DirectoryView) -> Self {
        Self {
            event: (&view.event).into(),
            attendees: view.entries.into_iter().map(Into::into).collect(),
            received: view.networking.received.into_iter().map(Into::into).collect(),
            sent: view.networking.sent.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Error body shared by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl ToString, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

fn slot_strings(slots: &[TimeSlot]) -> Vec<String> {
    slots.iter().map(|s| s.as_str().to_string()).collect()
}
