//! Ledger repository port (write side).
//!
//! Every mutation of availability or networking requests runs inside a
//! `LedgerTransaction` opened for one event. Opening the transaction
//! serializes writers for that event: the PostgreSQL adapter locks the event
//! row, the in-memory adapter holds the event's mutex. Reads made through the
//! transaction therefore see a stable snapshot until `commit`.
//!
//! Dropping a transaction without committing discards every staged write.

use async_trait::async_trait;

use crate::domain::attendee::Attendee;
use crate::domain::event::Event;
use crate::domain::foundation::{AttendeeId, DomainError, EventId, RequestId};
use crate::domain::networking::{NetworkingRequest, SlotLedger};

/// Opens per-event units of work.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Begin a unit of work for `event_id`, waiting for concurrent writers.
    ///
    /// # Errors
    ///
    /// - `EventNotFound` if the event does not exist
    /// - `DatabaseError` on persistence failure
    async fn begin(&self, event_id: &EventId) -> Result<Box<dyn LedgerTransaction>, DomainError>;
}

/// Serialized read-validate-write cycle over one event's ledger.
#[async_trait]
pub trait LedgerTransaction: Send {
    /// The event this transaction is scoped to, as loaded at `begin`.
    fn event(&self) -> &Event;

    /// Find an attendee of this event. Attendees of other events are `None`.
    async fn find_attendee(&mut self, id: &AttendeeId) -> Result<Option<Attendee>, DomainError>;

    /// Snapshot of every request in this event where one of `participants`
    /// is requester or target.
    async fn load_ledger(&mut self, participants: &[AttendeeId])
        -> Result<SlotLedger, DomainError>;

    /// Find a request of this event.
    async fn find_request(
        &mut self,
        id: &RequestId,
    ) -> Result<Option<NetworkingRequest>, DomainError>;

    async fn save_attendee(&mut self, attendee: &Attendee) -> Result<(), DomainError>;

    async fn insert_request(&mut self, request: &NetworkingRequest) -> Result<(), DomainError>;

    /// Persist status changes for existing requests.
    ///
    /// # Errors
    ///
    /// - `SlotUnavailable` if storage rejects a second accepted request for
    ///   the same person and slot
    async fn update_requests(&mut self, requests: &[NetworkingRequest])
        -> Result<(), DomainError>;

    /// Make every staged write visible and release the event.
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;
}
