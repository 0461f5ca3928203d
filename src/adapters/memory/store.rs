//! In-memory networking store.
//!
//! One partition per event behind a `tokio::sync::Mutex`. A ledger
//! transaction owns the partition's lock for its whole lifetime and works on
//! a private copy; `commit` swaps the copy in. Dropping the transaction
//! discards the copy.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::domain::attendee::{AccessCode, Attendee};
use crate::domain::event::{Event, EventCode};
use crate::domain::foundation::{
    AttendeeId, AuthError, AuthenticatedAttendee, DomainError, ErrorCode, EventId, RequestId,
};
use crate::domain::networking::{NetworkingRequest, RequestStatus, SlotLedger};
use crate::ports::{AccessGate, DirectoryReader, LedgerRepository, LedgerTransaction};

#[derive(Debug, Clone)]
struct EventPartition {
    event: Event,
    attendees: Vec<Attendee>,
    requests: Vec<NetworkingRequest>,
}

/// Process-local storage for events, attendees and requests.
#[derive(Default)]
pub struct InMemoryNetworkingStore {
    partitions: RwLock<HashMap<EventId, Arc<Mutex<EventPartition>>>>,
    codes: RwLock<HashMap<EventCode, EventId>>,
}

impl InMemoryNetworkingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an event.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if another event already uses the code
    pub async fn add_event(&self, event: Event) -> Result<(), DomainError> {
        let mut codes = self.codes.write().await;
        if codes.contains_key(event.code()) {
            return Err(DomainError::validation(
                "event_code",
                format!("Event code {} is already in use", event.code()),
            ));
        }
        codes.insert(event.code().clone(), *event.id());

        let partition = EventPartition {
            event: event.clone(),
            attendees: Vec::new(),
            requests: Vec::new(),
        };
        self.partitions
            .write()
            .await
            .insert(*event.id(), Arc::new(Mutex::new(partition)));
        Ok(())
    }

    /// Registers an attendee with their event.
    ///
    /// # Errors
    ///
    /// - `EventNotFound` if the attendee's event is unknown
    /// - `ValidationFailed` if the email or access code is already registered
    pub async fn add_attendee(&self, attendee: Attendee) -> Result<(), DomainError> {
        let partition = self.partition(attendee.event_id()).await?;
        let mut state = partition.lock().await;

        if state
            .attendees
            .iter()
            .any(|a| a.profile().email == attendee.profile().email)
        {
            return Err(DomainError::validation(
                "email",
                "Email is already registered for this event",
            ));
        }
        if state
            .attendees
            .iter()
            .any(|a| a.access_code_digest() == attendee.access_code_digest())
        {
            return Err(DomainError::validation(
                "access_code",
                "Access code is already issued for this event",
            ));
        }

        state.attendees.push(attendee);
        Ok(())
    }

    async fn partition(&self, id: &EventId) -> Result<Arc<Mutex<EventPartition>>, DomainError> {
        self.partitions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| {
                DomainError::new(ErrorCode::EventNotFound, format!("Event not found: {}", id))
            })
    }

    async fn find_partition(&self, id: &EventId) -> Option<Arc<Mutex<EventPartition>>> {
        self.partitions.read().await.get(id).cloned()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Ledger transactions
// ════════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl LedgerRepository for InMemoryNetworkingStore {
    async fn begin(&self, event_id: &EventId) -> Result<Box<dyn LedgerTransaction>, DomainError> {
        let partition = self.partition(event_id).await?;
        let guard = partition.lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryLedgerTransaction { guard, working }))
    }
}

struct InMemoryLedgerTransaction {
    guard: OwnedMutexGuard<EventPartition>,
    working: EventPartition,
}

impl InMemoryLedgerTransaction {
    /// Mirrors the partial unique indexes on accepted requests.
    fn check_accepted_unique(&self) -> Result<(), DomainError> {
        let mut seen = std::collections::HashSet::new();
        for r in self
            .working
            .requests
            .iter()
            .filter(|r| r.status() == RequestStatus::Accepted)
        {
            let target_key = ("target", *r.target_id(), r.time_slot().clone());
            let requester_key = ("requester", *r.requester_id(), r.time_slot().clone());
            if !seen.insert(target_key) || !seen.insert(requester_key) {
                return Err(DomainError::new(
                    ErrorCode::SlotUnavailable,
                    "Attendee already has an accepted meeting at this slot",
                )
                .with_detail("slot", r.time_slot().as_str()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerTransaction for InMemoryLedgerTransaction {
    fn event(&self) -> &Event {
        &self.working.event
    }

    async fn find_attendee(&mut self, id: &AttendeeId) -> Result<Option<Attendee>, DomainError> {
        Ok(self.working.attendees.iter().find(|a| a.id() == id).cloned())
    }

    async fn load_ledger(
        &mut self,
        participants: &[AttendeeId],
    ) -> Result<SlotLedger, DomainError> {
        let requests = self
            .working
            .requests
            .iter()
            .filter(|r| participants.iter().any(|p| r.involves(p)))
            .cloned()
            .collect();
        Ok(SlotLedger::new(requests))
    }

    async fn find_request(
        &mut self,
        id: &RequestId,
    ) -> Result<Option<NetworkingRequest>, DomainError> {
        Ok(self.working.requests.iter().find(|r| r.id() == id).cloned())
    }

    async fn save_attendee(&mut self, attendee: &Attendee) -> Result<(), DomainError> {
        let slot = self
            .working
            .attendees
            .iter_mut()
            .find(|a| a.id() == attendee.id())
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::AttendeeNotFound,
                    format!("Attendee not found: {}", attendee.id()),
                )
            })?;
        *slot = attendee.clone();
        Ok(())
    }

    async fn insert_request(&mut self, request: &NetworkingRequest) -> Result<(), DomainError> {
        if self.working.requests.iter().any(|r| r.id() == request.id()) {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                format!("Request {} already exists", request.id()),
            ));
        }
        self.working.requests.push(request.clone());
        Ok(())
    }

    async fn update_requests(
        &mut self,
        requests: &[NetworkingRequest],
    ) -> Result<(), DomainError> {
        for updated in requests {
            let existing = self
                .working
                .requests
                .iter_mut()
                .find(|r| r.id() == updated.id())
                .ok_or_else(|| {
                    DomainError::new(
                        ErrorCode::RequestNotFound,
                        format!("Request not found: {}", updated.id()),
                    )
                })?;
            *existing = updated.clone();
        }
        self.check_accepted_unique()
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let InMemoryLedgerTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Reads
// ════════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl DirectoryReader for InMemoryNetworkingStore {
    async fn find_event(&self, id: &EventId) -> Result<Option<Event>, DomainError> {
        let Some(partition) = self.find_partition(id).await else {
            return Ok(None);
        };
        let event = partition.lock().await.event.clone();
        Ok(Some(event))
    }

    async fn find_attendee(
        &self,
        event_id: &EventId,
        id: &AttendeeId,
    ) -> Result<Option<Attendee>, DomainError> {
        let Some(partition) = self.find_partition(event_id).await else {
            return Ok(None);
        };
        let state = partition.lock().await;
        let attendee = state.attendees.iter().find(|a| a.id() == id).cloned();
        Ok(attendee)
    }

    async fn list_attendees(&self, event_id: &EventId) -> Result<Vec<Attendee>, DomainError> {
        let Some(partition) = self.find_partition(event_id).await else {
            return Ok(Vec::new());
        };
        let mut attendees = partition.lock().await.attendees.clone();
        attendees.sort_by(|a, b| a.full_name().cmp(b.full_name()));
        Ok(attendees)
    }

    async fn list_requests(
        &self,
        event_id: &EventId,
    ) -> Result<Vec<NetworkingRequest>, DomainError> {
        let Some(partition) = self.find_partition(event_id).await else {
            return Ok(Vec::new());
        };
        let requests = partition.lock().await.requests.clone();
        Ok(requests)
    }
}

#[async_trait]
impl AccessGate for InMemoryNetworkingStore {
    async fn resolve(
        &self,
        event_code: &EventCode,
        access_code: &AccessCode,
    ) -> Result<AuthenticatedAttendee, AuthError> {
        let event_id = self
            .codes
            .read()
            .await
            .get(event_code)
            .copied()
            .ok_or(AuthError::InvalidCredential)?;
        let partition = self
            .find_partition(&event_id)
            .await
            .ok_or(AuthError::InvalidCredential)?;
        let state = partition.lock().await;

        if !state.event.is_active() {
            return Err(AuthError::InvalidCredential);
        }

        let attendee_id = state
            .attendees
            .iter()
            .find(|a| a.access_code_digest().matches(access_code))
            .map(|a| *a.id())
            .ok_or(AuthError::InvalidCredential)?;
        Ok(AuthenticatedAttendee::new(attendee_id, event_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attendee::AttendeeProfile;
    use crate::domain::event::TimeSlot;

    fn slot() -> TimeSlot {
        TimeSlot::new("10:00").unwrap()
    }

    async fn seeded() -> (InMemoryNetworkingStore, Event, Attendee, Attendee, AccessCode) {
        let store = InMemoryNetworkingStore::new();
        let event = Event::new(EventId::new(), EventCode::generate(), "Expo", vec![slot()]).unwrap();
        store.add_event(event.clone()).await.unwrap();

        let code = AccessCode::generate();
        let make = |name: &str, code: &AccessCode| {
            let mut a = Attendee::register(
                AttendeeId::new(),
                &event,
                AttendeeProfile {
                    full_name: name.to_string(),
                    organization: "Org".to_string(),
                    position: "Role".to_string(),
                    email: format!("{}@example.com", name),
                    ..Default::default()
                },
                code,
            )
            .unwrap();
            a.set_availability(&event, &[slot()]).unwrap();
            a
        };
        let a = make("ada", &code);
        let b = make("bo", &AccessCode::generate());
        store.add_attendee(a.clone()).await.unwrap();
        store.add_attendee(b.clone()).await.unwrap();
        (store, event, a, b, code)
    }

    #[tokio::test]
    async fn resolve_finds_attendee_by_code() {
        let (store, event, a, _, code) = seeded().await;
        let who = store.resolve(event.code(), &code).await.unwrap();
        assert_eq!(who.attendee_id, *a.id());
        assert_eq!(who.event_id, *event.id());
    }

    #[tokio::test]
    async fn resolve_fails_closed() {
        let (store, event, _, _, code) = seeded().await;
        assert_eq!(
            store.resolve(event.code(), &AccessCode::generate()).await,
            Err(AuthError::InvalidCredential)
        );
        assert_eq!(
            store.resolve(&EventCode::generate(), &code).await,
            Err(AuthError::InvalidCredential)
        );
    }

    #[tokio::test]
    async fn add_attendee_rejects_duplicate_email() {
        let (store, _, a, _, _) = seeded().await;
        assert!(store.add_attendee(a).await.is_err());
    }

    #[tokio::test]
    async fn uncommitted_transaction_is_discarded() {
        let (store, event, a, b, _) = seeded().await;
        {
            let mut tx = store.begin(event.id()).await.unwrap();
            let request =
                NetworkingRequest::propose(*event.id(), *a.id(), *b.id(), slot(), None).unwrap();
            tx.insert_request(&request).await.unwrap();
        }
        assert!(store.list_requests(event.id()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn committed_transaction_is_visible() {
        let (store, event, a, b, _) = seeded().await;
        let mut tx = store.begin(event.id()).await.unwrap();
        let request =
            NetworkingRequest::propose(*event.id(), *a.id(), *b.id(), slot(), None).unwrap();
        tx.insert_request(&request).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.list_requests(event.id()).await.unwrap(), vec![request]);
    }

    #[tokio::test]
    async fn begin_on_unknown_event_is_not_found() {
        let store = InMemoryNetworkingStore::new();
        let err = store.begin(&EventId::new()).await.err().unwrap();
        assert_eq!(err.code, ErrorCode::EventNotFound);
    }

    #[tokio::test]
    async fn second_accepted_request_for_same_target_slot_is_refused() {
        let (store, event, a, b, _) = seeded().await;
        let mut tx = store.begin(event.id()).await.unwrap();
        let mut first =
            NetworkingRequest::propose(*event.id(), *a.id(), *b.id(), slot(), None).unwrap();
        let mut second = NetworkingRequest::propose(
            *event.id(),
            AttendeeId::new(),
            *b.id(),
            slot(),
            None,
        )
        .unwrap();
        tx.insert_request(&first).await.unwrap();
        tx.insert_request(&second).await.unwrap();
        first.accept(b.id()).unwrap();
        second.accept(b.id()).unwrap();

        let err = tx.update_requests(&[first, second]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SlotUnavailable);
    }
}
