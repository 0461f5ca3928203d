//! Attendee aggregate.
//!
//! One attendee per event registration. Holds the public profile, contact
//! fields that are only revealed through accepted networking requests, the
//! access code digest and the declared slot availability.

use crate::domain::event::{Event, TimeSlot};
use crate::domain::foundation::{AttendeeId, DomainError, ErrorCode, EventId, Timestamp};
use serde::{Deserialize, Serialize};

use super::{AccessCode, AccessCodeDigest};

pub const MAX_NAME_LENGTH: usize = 200;
pub const MAX_BIO_LENGTH: usize = 2000;

/// Profile data supplied at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeProfile {
    pub full_name: String,
    pub organization: String,
    pub position: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl AttendeeProfile {
    fn validate(&self) -> Result<(), DomainError> {
        for (field, value) in [
            ("full_name", &self.full_name),
            ("organization", &self.organization),
            ("position", &self.position),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::validation(field, format!("{} cannot be empty", field)));
            }
            if value.chars().count() > MAX_NAME_LENGTH {
                return Err(DomainError::validation(
                    field,
                    format!("{} cannot exceed {} characters", field, MAX_NAME_LENGTH),
                ));
            }
        }
        if self.bio.chars().count() > MAX_BIO_LENGTH {
            return Err(DomainError::validation(
                "bio",
                format!("bio cannot exceed {} characters", MAX_BIO_LENGTH),
            ));
        }
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(DomainError::validation("email", "email address is not valid")),
        }
    }

    fn normalized(mut self) -> Self {
        self.full_name = self.full_name.trim().to_string();
        self.organization = self.organization.trim().to_string();
        self.position = self.position.trim().to_string();
        self.email = self.email.trim().to_ascii_lowercase();
        self.interests = self
            .interests
            .into_iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();
        self
    }
}

/// Partial edit of the self-service profile fields.
///
/// `None` leaves a field as it is. For the optional contact fields an empty
/// string clears the value. Email and the access code are not editable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub full_name: Option<String>,
    pub organization: Option<String>,
    pub position: Option<String>,
    pub bio: Option<String>,
    pub interests: Option<Vec<String>>,
    pub linkedin_url: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Attendee registered for one event.
///
/// # Invariants
///
/// - `available_slots` is a subset of the event's slots, stored in event order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attendee {
    id: AttendeeId,
    event_id: EventId,
    profile: AttendeeProfile,
    access_code_digest: AccessCodeDigest,
    code_verified: bool,
    available_slots: Vec<TimeSlot>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Attendee {
    /// Registers an attendee for `event` with the code they were issued.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if a required profile field is empty or malformed
    pub fn register(
        id: AttendeeId,
        event: &Event,
        profile: AttendeeProfile,
        access_code: &AccessCode,
    ) -> Result<Self, DomainError> {
        profile.validate()?;

        let now = Timestamp::now();
        Ok(Self {
            id,
            event_id: *event.id(),
            profile: profile.normalized(),
            access_code_digest: access_code.digest(),
            code_verified: false,
            available_slots: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitute an attendee from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: AttendeeId,
        event_id: EventId,
        profile: AttendeeProfile,
        access_code_digest: AccessCodeDigest,
        code_verified: bool,
        available_slots: Vec<TimeSlot>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            event_id,
            profile,
            access_code_digest,
            code_verified,
            available_slots,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &AttendeeId {
        &self.id
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn profile(&self) -> &AttendeeProfile {
        &self.profile
    }

    pub fn full_name(&self) -> &str {
        &self.profile.full_name
    }

    pub fn access_code_digest(&self) -> &AccessCodeDigest {
        &self.access_code_digest
    }

    pub fn code_verified(&self) -> bool {
        self.code_verified
    }

    /// Declared availability in event order.
    pub fn available_slots(&self) -> &[TimeSlot] {
        &self.available_slots
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn is_available_at(&self, slot: &TimeSlot) -> bool {
        self.available_slots.contains(slot)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Replaces the declared availability. Existing requests are untouched.
    ///
    /// # Errors
    ///
    /// - `InvalidSlot` if any token is not one of the event's slots
    /// - `Forbidden` if `event` is not the attendee's event
    pub fn set_availability(
        &mut self,
        event: &Event,
        slots: &[TimeSlot],
    ) -> Result<(), DomainError> {
        if event.id() != &self.event_id {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Attendee does not belong to this event",
            ));
        }

        self.available_slots = event.normalize_availability(slots)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Applies a partial profile edit and returns the names of the fields
    /// that actually changed. Nothing is modified if validation fails.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the edited profile is not valid
    pub fn update_profile(
        &mut self,
        changes: ProfileChanges,
    ) -> Result<Vec<&'static str>, DomainError> {
        let mut edited = self.profile.clone();
        if let Some(v) = changes.full_name {
            edited.full_name = v;
        }
        if let Some(v) = changes.organization {
            edited.organization = v;
        }
        if let Some(v) = changes.position {
            edited.position = v;
        }
        if let Some(v) = changes.bio {
            edited.bio = v;
        }
        if let Some(v) = changes.interests {
            edited.interests = v;
        }
        if let Some(v) = changes.linkedin_url {
            edited.linkedin_url = non_blank(v);
        }
        if let Some(v) = changes.phone {
            edited.phone = non_blank(v);
        }
        if let Some(v) = changes.photo_url {
            edited.photo_url = non_blank(v);
        }

        edited.validate()?;
        let edited = edited.normalized();

        let before = &self.profile;
        let changed: Vec<&'static str> = [
            ("full_name", before.full_name != edited.full_name),
            ("organization", before.organization != edited.organization),
            ("position", before.position != edited.position),
            ("bio", before.bio != edited.bio),
            ("interests", before.interests != edited.interests),
            ("linkedin_url", before.linkedin_url != edited.linkedin_url),
            ("phone", before.phone != edited.phone),
            ("photo_url", before.photo_url != edited.photo_url),
        ]
        .into_iter()
        .filter_map(|(field, differs)| differs.then_some(field))
        .collect();

        if !changed.is_empty() {
            self.profile = edited;
            self.updated_at = Timestamp::now();
        }
        Ok(changed)
    }

    /// Marks the access code as verified. Returns false if it already was.
    pub fn mark_code_verified(&mut self) -> bool {
        if self.code_verified {
            return false;
        }
        self.code_verified = true;
        self.updated_at = Timestamp::now();
        true
    }
}
