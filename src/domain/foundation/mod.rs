//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, errors, the state machine trait and the domain
//! event plumbing used by the event, attendee and networking modules.

mod auth;
mod command;
mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedAttendee};
pub use command::CommandMetadata;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{DomainEvent, EnvelopeId, EventEnvelope, EventMetadata, SerializableDomainEvent};
pub use crate::domain_event;
pub use ids::{AttendeeId, EventId, RequestId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
