//! Networking domain events.
//!
//! Published after the unit of work commits. Payloads carry ids only, never
//! contact details.

use serde::{Deserialize, Serialize};

use crate::domain::event::TimeSlot;
use crate::domain::foundation::{
    domain_event, AttendeeId, EnvelopeId, EventId, RequestId, Timestamp,
};

use super::NetworkingRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCreated {
    pub envelope_id: EnvelopeId,
    pub request_id: RequestId,
    pub event_id: EventId,
    pub requester_id: AttendeeId,
    pub target_id: AttendeeId,
    pub time_slot: TimeSlot,
    pub created_at: Timestamp,
}

impl RequestCreated {
    pub fn from_request(request: &NetworkingRequest) -> Self {
        Self {
            envelope_id: EnvelopeId::new(),
            request_id: *request.id(),
            event_id: *request.event_id(),
            requester_id: *request.requester_id(),
            target_id: *request.target_id(),
            time_slot: request.time_slot().clone(),
            created_at: *request.created_at(),
        }
    }
}

domain_event!(
    RequestCreated,
    event_type = "networking.request_created.v1",
    schema_version = 1,
    aggregate_id = request_id,
    aggregate_type = "NetworkingRequest",
    occurred_at = created_at,
    envelope_id = envelope_id
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestAccepted {
    pub envelope_id: EnvelopeId,
    pub request_id: RequestId,
    pub event_id: EventId,
    pub requester_id: AttendeeId,
    pub target_id: AttendeeId,
    pub time_slot: TimeSlot,
    /// Competing requests rejected by this acceptance.
    pub superseded: Vec<RequestId>,
    pub accepted_at: Timestamp,
}

impl RequestAccepted {
    pub fn from_request(request: &NetworkingRequest, superseded: &[NetworkingRequest]) -> Self {
        Self {
            envelope_id: EnvelopeId::new(),
            request_id: *request.id(),
            event_id: *request.event_id(),
            requester_id: *request.requester_id(),
            target_id: *request.target_id(),
            time_slot: request.time_slot().clone(),
            superseded: superseded.iter().map(|r| *r.id()).collect(),
            accepted_at: *request.updated_at(),
        }
    }
}

domain_event!(
    RequestAccepted,
    event_type = "networking.request_accepted.v1",
    schema_version = 1,
    aggregate_id = request_id,
    aggregate_type = "NetworkingRequest",
    occurred_at = accepted_at,
    envelope_id = envelope_id
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRejected {
    pub envelope_id: EnvelopeId,
    pub request_id: RequestId,
    pub event_id: EventId,
    pub requester_id: AttendeeId,
    pub target_id: AttendeeId,
    pub time_slot: TimeSlot,
    /// True when rejected because the target accepted a competing request.
    pub superseded: bool,
    pub rejected_at: Timestamp,
}

impl RequestRejected {
    pub fn from_request(request: &NetworkingRequest, superseded: bool) -> Self {
        Self {
            envelope_id: EnvelopeId::new(),
            request_id: *request.id(),
            event_id: *request.event_id(),
            requester_id: *request.requester_id(),
            target_id: *request.target_id(),
            time_slot: request.time_slot().clone(),
            superseded,
            rejected_at: *request.updated_at(),
        }
    }
}

domain_event!(
    RequestRejected,
    event_type = "networking.request_rejected.v1",
    schema_version = 1,
    aggregate_id = request_id,
    aggregate_type = "NetworkingRequest",
    occurred_at = rejected_at,
    envelope_id = envelope_id
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCancelled {
    pub envelope_id: EnvelopeId,
    pub request_id: RequestId,
    pub event_id: EventId,
    pub requester_id: AttendeeId,
    pub target_id: AttendeeId,
    pub time_slot: TimeSlot,
    pub cancelled_at: Timestamp,
}

impl RequestCancelled {
    pub fn from_request(request: &NetworkingRequest) -> Self {
        Self {
            envelope_id: EnvelopeId::new(),
            request_id: *request.id(),
            event_id: *request.event_id(),
            requester_id: *request.requester_id(),
            target_id: *request.target_id(),
            time_slot: request.time_slot().clone(),
            cancelled_at: *request.updated_at(),
        }
    }
}

domain_event!(
    RequestCancelled,
    event_type = "networking.request_cancelled.v1",
    schema_version = 1,
    aggregate_id = request_id,
    aggregate_type = "NetworkingRequest",
    occurred_at = cancelled_at,
    envelope_id = envelope_id
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SerializableDomainEvent;

    fn request() -> NetworkingRequest {
        NetworkingRequest::propose(
            EventId::new(),
            AttendeeId::new(),
            AttendeeId::new(),
            TimeSlot::new("10:00").unwrap(),
            Some("private note".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn created_envelope_routes_on_request_id() {
        let r = request();
        let envelope = RequestCreated::from_request(&r).to_envelope();

        assert_eq!(envelope.event_type, "networking.request_created.v1");
        assert_eq!(envelope.aggregate_id, r.id().to_string());
        assert_eq!(envelope.aggregate_type, "NetworkingRequest");
    }

    #[test]
    fn payload_omits_message() {
        let envelope = RequestCreated::from_request(&request()).to_envelope();
        assert!(!envelope.payload.to_string().contains("private note"));
    }

    #[test]
    fn accepted_lists_superseded_ids() {
        let winner = request();
        let loser = request();
        let event = RequestAccepted::from_request(&winner, std::slice::from_ref(&loser));
        assert_eq!(event.superseded, vec![*loser.id()]);
    }
}
