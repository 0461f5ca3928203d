//! NetworkingRequest aggregate.
//!
//! A directional proposal from a requester to a target to meet at one slot.
//! The request only knows its own lifecycle and who may drive it; rules that
//! span several requests (exclusivity, the accept cascade) live in
//! [`SlotLedger`](super::SlotLedger).

use crate::domain::event::TimeSlot;
use crate::domain::foundation::{AttendeeId, EventId, RequestId, StateMachine, Timestamp};
use serde::{Deserialize, Serialize};

use super::{NetworkingError, RequestStatus};

/// Maximum length for the optional note sent with a request.
pub const MAX_MESSAGE_LENGTH: usize = 1000;

/// Which side of a request an attendee is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
    Requester,
    Target,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkingRequest {
    id: RequestId,
    event_id: EventId,
    requester_id: AttendeeId,
    target_id: AttendeeId,
    time_slot: TimeSlot,
    message: Option<String>,
    status: RequestStatus,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl NetworkingRequest {
    /// Creates a pending request. Slot and availability checks are the
    /// ledger's job; this only validates the request on its own.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if requester and target are the same attendee
    /// - `ValidationFailed` if the message is too long
    pub fn propose(
        event_id: EventId,
        requester_id: AttendeeId,
        target_id: AttendeeId,
        time_slot: TimeSlot,
        message: Option<String>,
    ) -> Result<Self, NetworkingError> {
        if requester_id == target_id {
            return Err(NetworkingError::validation(
                "profile_id",
                "cannot request a networking slot with yourself",
            ));
        }

        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        if let Some(m) = &message {
            let len = m.chars().count();
            if len > MAX_MESSAGE_LENGTH {
                return Err(NetworkingError::validation(
                    "message",
                    format!("message cannot exceed {} characters, got {}", MAX_MESSAGE_LENGTH, len),
                ));
            }
        }

        let now = Timestamp::now();
        Ok(Self {
            id: RequestId::new(),
            event_id,
            requester_id,
            target_id,
            time_slot,
            message,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitute a request from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: RequestId,
        event_id: EventId,
        requester_id: AttendeeId,
        target_id: AttendeeId,
        time_slot: TimeSlot,
        message: Option<String>,
        status: RequestStatus,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            event_id,
            requester_id,
            target_id,
            time_slot,
            message,
            status,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &RequestId {
        &self.id
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn requester_id(&self) -> &AttendeeId {
        &self.requester_id
    }

    pub fn target_id(&self) -> &AttendeeId {
        &self.target_id
    }

    pub fn time_slot(&self) -> &TimeSlot {
        &self.time_slot
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Parties
    // ─────────────────────────────────────────────────────────────────────────

    pub fn role_of(&self, attendee: &AttendeeId) -> Option<PartyRole> {
        if &self.requester_id == attendee {
            Some(PartyRole::Requester)
        } else if &self.target_id == attendee {
            Some(PartyRole::Target)
        } else {
            None
        }
    }

    pub fn involves(&self, attendee: &AttendeeId) -> bool {
        self.role_of(attendee).is_some()
    }

    /// The other party, from `attendee`'s point of view.
    pub fn counterpart_of(&self, attendee: &AttendeeId) -> Option<&AttendeeId> {
        match self.role_of(attendee)? {
            PartyRole::Requester => Some(&self.target_id),
            PartyRole::Target => Some(&self.requester_id),
        }
    }

    /// Outsiders get `Forbidden`; a party acting in the wrong role gets
    /// `InvalidTransition`.
    pub fn authorize(
        &self,
        actor: &AttendeeId,
        required: PartyRole,
        action: &str,
    ) -> Result<(), NetworkingError> {
        match self.role_of(actor) {
            None => Err(NetworkingError::Forbidden),
            Some(role) if role == required => Ok(()),
            Some(_) => Err(NetworkingError::invalid_transition(match required {
                PartyRole::Requester => format!("only the requester may {} a request", action),
                PartyRole::Target => format!("only the target may {} a request", action),
            })),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    pub fn accept(&mut self, actor: &AttendeeId) -> Result<(), NetworkingError> {
        self.authorize(actor, PartyRole::Target, "accept")?;
        self.transition(RequestStatus::Accepted)
    }

    pub fn reject(&mut self, actor: &AttendeeId) -> Result<(), NetworkingError> {
        self.authorize(actor, PartyRole::Target, "reject")?;
        self.transition(RequestStatus::Rejected)
    }

    pub fn cancel(&mut self, actor: &AttendeeId) -> Result<(), NetworkingError> {
        self.authorize(actor, PartyRole::Requester, "cancel")?;
        self.transition(RequestStatus::Cancelled)
    }

    /// Rejects a competing proposal after the target accepted another one
    /// for the same slot.
    pub(crate) fn reject_superseded(&mut self) -> Result<(), NetworkingError> {
        self.transition(RequestStatus::Rejected)
    }

    fn transition(&mut self, target: RequestStatus) -> Result<(), NetworkingError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|_| NetworkingError::cannot_transition(self.status, target))?;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot() -> TimeSlot {
        TimeSlot::new("10:00-10:30").unwrap()
    }

    fn pending(requester: AttendeeId, target: AttendeeId) -> NetworkingRequest {
        NetworkingRequest::propose(EventId::new(), requester, target, slot(), None).unwrap()
    }

    #[test]
    fn propose_starts_pending() {
        let request = pending(AttendeeId::new(), AttendeeId::new());
        assert_eq!(request.status(), RequestStatus::Pending);
        assert_eq!(request.created_at(), request.updated_at());
    }

    #[test]
    fn propose_rejects_self_request() {
        let me = AttendeeId::new();
        let err = NetworkingRequest::propose(EventId::new(), me, me, slot(), None).unwrap_err();
        assert!(matches!(err, NetworkingError::ValidationFailed { ref field, .. } if field == "profile_id"));
    }

    #[test]
    fn propose_drops_blank_message() {
        let request = NetworkingRequest::propose(
            EventId::new(),
            AttendeeId::new(),
            AttendeeId::new(),
            slot(),
            Some("   ".to_string()),
        )
        .unwrap();
        assert_eq!(request.message(), None);
    }

    #[test]
    fn propose_rejects_long_message() {
        let result = NetworkingRequest::propose(
            EventId::new(),
            AttendeeId::new(),
            AttendeeId::new(),
            slot(),
            Some("x".repeat(MAX_MESSAGE_LENGTH + 1)),
        );
        assert!(result.is_err());
    }

    #[test]
    fn target_accepts() {
        let (a, b) = (AttendeeId::new(), AttendeeId::new());
        let mut request = pending(a, b);
        request.accept(&b).unwrap();
        assert_eq!(request.status(), RequestStatus::Accepted);
    }

    #[test]
    fn requester_cannot_accept_own_request() {
        let (a, b) = (AttendeeId::new(), AttendeeId::new());
        let mut request = pending(a, b);
        let err = request.accept(&a).unwrap_err();
        assert!(matches!(err, NetworkingError::InvalidTransition(_)));
        assert_eq!(request.status(), RequestStatus::Pending);
    }

    #[test]
    fn outsider_is_forbidden_even_on_terminal_request() {
        let (a, b, c) = (AttendeeId::new(), AttendeeId::new(), AttendeeId::new());
        let mut request = pending(a, b);
        request.reject(&b).unwrap();
        assert_eq!(request.accept(&c).unwrap_err(), NetworkingError::Forbidden);
    }

    #[test]
    fn target_cannot_cancel() {
        let (a, b) = (AttendeeId::new(), AttendeeId::new());
        let mut request = pending(a, b);
        assert!(matches!(
            request.cancel(&b).unwrap_err(),
            NetworkingError::InvalidTransition(_)
        ));
    }

    #[test]
    fn terminal_request_is_immutable() {
        let (a, b) = (AttendeeId::new(), AttendeeId::new());
        let mut request = pending(a, b);
        request.cancel(&a).unwrap();

        assert!(request.cancel(&a).is_err());
        assert!(request.accept(&b).is_err());
        assert!(request.reject(&b).is_err());
        assert_eq!(request.status(), RequestStatus::Cancelled);
    }

    #[test]
    fn counterpart_is_the_other_party() {
        let (a, b) = (AttendeeId::new(), AttendeeId::new());
        let request = pending(a, b);
        assert_eq!(request.counterpart_of(&a), Some(&b));
        assert_eq!(request.counterpart_of(&b), Some(&a));
        assert_eq!(request.counterpart_of(&AttendeeId::new()), None);
    }
}
