//! Directory reader port (read side).
//!
//! Unlocked reads used to build profile and directory projections. They may
//! lag a concurrent write by one transaction.

use async_trait::async_trait;

use crate::domain::attendee::Attendee;
use crate::domain::event::Event;
use crate::domain::foundation::{AttendeeId, DomainError, EventId};
use crate::domain::networking::NetworkingRequest;

#[async_trait]
pub trait DirectoryReader: Send + Sync {
    async fn find_event(&self, id: &EventId) -> Result<Option<Event>, DomainError>;

    async fn find_attendee(
        &self,
        event_id: &EventId,
        id: &AttendeeId,
    ) -> Result<Option<Attendee>, DomainError>;

    /// All attendees of the event, ordered by name.
    async fn list_attendees(&self, event_id: &EventId) -> Result<Vec<Attendee>, DomainError>;

    /// All requests of the event, any status.
    async fn list_requests(&self, event_id: &EventId)
        -> Result<Vec<NetworkingRequest>, DomainError>;
}
