//! Request ledger rules that span more than one request.
//!
//! A `SlotLedger` is a snapshot of every request touching a set of attendees,
//! taken inside the storage unit of work that serializes writes for the event.
//! Operations validate against the snapshot, apply the change to it and
//! return what must be persisted, so a failed check never leaves a partial
//! write behind.
//!
//! # Occupancy
//!
//! An attendee's occupied slots are the slots of requests they sent that were
//! accepted, plus requests they received that are pending or accepted. Sent
//! pending requests do not occupy the requester, so one attendee may have
//! several outstanding proposals for the same slot.

use std::collections::HashSet;

use crate::domain::attendee::Attendee;
use crate::domain::event::{Event, TimeSlot};
use crate::domain::foundation::{AttendeeId, RequestId};

use super::{NetworkingError, NetworkingRequest, RequestStatus};

/// Result of a status change: the request that changed plus any competing
/// requests rejected with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerChange {
    pub request: NetworkingRequest,
    pub superseded: Vec<NetworkingRequest>,
}

impl LedgerChange {
    fn single(request: NetworkingRequest) -> Self {
        Self {
            request,
            superseded: Vec::new(),
        }
    }

    /// Every request whose row must be rewritten.
    pub fn changed(&self) -> impl Iterator<Item = &NetworkingRequest> {
        std::iter::once(&self.request).chain(self.superseded.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotLedger {
    requests: Vec<NetworkingRequest>,
}

impl SlotLedger {
    pub fn new(requests: Vec<NetworkingRequest>) -> Self {
        Self { requests }
    }

    pub fn requests(&self) -> &[NetworkingRequest] {
        &self.requests
    }

    pub fn find(&self, id: &RequestId) -> Option<&NetworkingRequest> {
        self.requests.iter().find(|r| r.id() == id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Slot directory queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Slots the attendee is committed to or has been asked for.
    pub fn occupied_slots(&self, attendee: &AttendeeId) -> HashSet<TimeSlot> {
        self.requests
            .iter()
            .filter(|r| occupies(r, attendee))
            .map(|r| r.time_slot().clone())
            .collect()
    }

    pub fn is_occupied(&self, attendee: &AttendeeId, slot: &TimeSlot) -> bool {
        self.requests
            .iter()
            .any(|r| r.time_slot() == slot && occupies(r, attendee))
    }

    /// Declared availability minus occupied slots, in event order.
    pub fn open_slots(&self, attendee: &Attendee) -> Vec<TimeSlot> {
        let occupied = self.occupied_slots(attendee.id());
        attendee
            .available_slots()
            .iter()
            .filter(|slot| !occupied.contains(*slot))
            .cloned()
            .collect()
    }

    /// True if the attendee holds an accepted request on `slot` in either
    /// role, ignoring `except`.
    pub fn is_committed(
        &self,
        attendee: &AttendeeId,
        slot: &TimeSlot,
        except: Option<&RequestId>,
    ) -> bool {
        self.requests.iter().any(|r| {
            r.status() == RequestStatus::Accepted
                && r.time_slot() == slot
                && r.involves(attendee)
                && Some(r.id()) != except
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ledger operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Proposes a meeting from `requester` to `target` at `slot`.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` for a self-request or an oversized message
    /// - `AttendeeNotFound` if the target is registered for another event
    /// - `InvalidSlot` if the event has no such slot
    /// - `SlotUnavailable` if the target is not available, the requester is
    ///   already occupied, or the target is already committed at `slot`
    /// - `DuplicateRequest` if the same proposal is already pending or accepted
    pub fn request_slot(
        &mut self,
        event: &Event,
        requester: &Attendee,
        target: &Attendee,
        slot: TimeSlot,
        message: Option<String>,
    ) -> Result<NetworkingRequest, NetworkingError> {
        if target.event_id() != event.id() || requester.event_id() != event.id() {
            return Err(NetworkingError::attendee_not_found(target.id()));
        }

        let request = NetworkingRequest::propose(
            *event.id(),
            *requester.id(),
            *target.id(),
            slot,
            message,
        )?;
        let slot = request.time_slot();

        event.ensure_valid_slot(slot)?;
        if !target.is_available_at(slot) {
            return Err(NetworkingError::slot_unavailable(
                slot.as_str(),
                format!("{} is not available at this time", target.full_name()),
            ));
        }
        if self.requests.iter().any(|r| {
            r.requester_id() == requester.id()
                && r.target_id() == target.id()
                && r.time_slot() == slot
                && r.status().holds_slot()
        }) {
            return Err(NetworkingError::duplicate(slot.as_str()));
        }
        if self.is_occupied(requester.id(), slot) {
            return Err(NetworkingError::slot_unavailable(
                slot.as_str(),
                "you already have a meeting or incoming request at this time",
            ));
        }
        if self.is_committed(target.id(), slot, None) {
            return Err(NetworkingError::slot_unavailable(
                slot.as_str(),
                format!("{} is already booked at this time", target.full_name()),
            ));
        }

        self.requests.push(request.clone());
        Ok(request)
    }

    /// Target accepts a pending request. Every other pending request to the
    /// same target for the same slot is rejected in the same change.
    ///
    /// # Errors
    ///
    /// - `RequestNotFound`, `Forbidden`, `InvalidTransition` as for any
    ///   status change
    /// - `SlotUnavailable` if either party is already committed at the slot
    pub fn accept(
        &mut self,
        id: &RequestId,
        actor: &AttendeeId,
    ) -> Result<LedgerChange, NetworkingError> {
        let index = self.position(id)?;
        let mut accepted = self.requests[index].clone();
        accepted.accept(actor)?;

        let slot = accepted.time_slot();
        for party in [accepted.target_id(), accepted.requester_id()] {
            if self.is_committed(party, slot, Some(id)) {
                return Err(NetworkingError::slot_unavailable(
                    slot.as_str(),
                    "one of the parties is already booked at this time",
                ));
            }
        }

        let competing: Vec<usize> = self
            .requests
            .iter()
            .enumerate()
            .filter(|(_, other)| {
                other.id() != id
                    && other.target_id() == accepted.target_id()
                    && other.time_slot() == slot
                    && other.status() == RequestStatus::Pending
            })
            .map(|(i, _)| i)
            .collect();

        let mut superseded = Vec::with_capacity(competing.len());
        for &i in &competing {
            let mut other = self.requests[i].clone();
            other.reject_superseded()?;
            superseded.push(other);
        }

        for (&i, other) in competing.iter().zip(&superseded) {
            self.requests[i] = other.clone();
        }
        self.requests[index] = accepted.clone();
        Ok(LedgerChange {
            request: accepted,
            superseded,
        })
    }

    /// Target declines a pending request.
    pub fn reject(
        &mut self,
        id: &RequestId,
        actor: &AttendeeId,
    ) -> Result<LedgerChange, NetworkingError> {
        self.apply(id, |request| request.reject(actor))
    }

    /// Requester withdraws a pending request.
    pub fn cancel(
        &mut self,
        id: &RequestId,
        actor: &AttendeeId,
    ) -> Result<LedgerChange, NetworkingError> {
        self.apply(id, |request| request.cancel(actor))
    }

    fn apply<F>(&mut self, id: &RequestId, change: F) -> Result<LedgerChange, NetworkingError>
    where
        F: FnOnce(&mut NetworkingRequest) -> Result<(), NetworkingError>,
    {
        let index = self.position(id)?;
        let mut request = self.requests[index].clone();
        change(&mut request)?;
        self.requests[index] = request.clone();
        Ok(LedgerChange::single(request))
    }

    fn position(&self, id: &RequestId) -> Result<usize, NetworkingError> {
        self.requests
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| NetworkingError::request_not_found(id))
    }
}

fn occupies(request: &NetworkingRequest, attendee: &AttendeeId) -> bool {
    match request.status() {
        RequestStatus::Accepted => request.involves(attendee),
        RequestStatus::Pending => request.target_id() == attendee,
        RequestStatus::Rejected | RequestStatus::Cancelled => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attendee::{AccessCode, AttendeeProfile};
    use crate::domain::event::EventCode;
    use crate::domain::foundation::EventId;

    const SLOT: &str = "10:00-10:30";
    const LATER: &str = "10:30-11:00";

    fn slot(s: &str) -> TimeSlot {
        TimeSlot::new(s).unwrap()
    }

    fn event() -> Event {
        Event::new(
            EventId::new(),
            EventCode::generate(),
            "Expo",
            vec![slot(SLOT), slot(LATER)],
        )
        .unwrap()
    }

    fn attendee(event: &Event, name: &str, available: &[&str]) -> Attendee {
        let profile = AttendeeProfile {
            full_name: name.to_string(),
            organization: "Org".to_string(),
            position: "Role".to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            ..Default::default()
        };
        let mut a =
            Attendee::register(AttendeeId::new(), event, profile, &AccessCode::generate()).unwrap();
        let slots: Vec<TimeSlot> = available.iter().map(|s| slot(s)).collect();
        a.set_availability(event, &slots).unwrap();
        a
    }

    struct World {
        event: Event,
        a: Attendee,
        b: Attendee,
        c: Attendee,
        d: Attendee,
        ledger: SlotLedger,
    }

    fn world() -> World {
        let event = event();
        World {
            a: attendee(&event, "Ada", &[SLOT, LATER]),
            b: attendee(&event, "Bo", &[SLOT, LATER]),
            c: attendee(&event, "Cy", &[SLOT]),
            d: attendee(&event, "Di", &[SLOT]),
            event,
            ledger: SlotLedger::default(),
        }
    }

    impl World {
        fn request(&mut self, from: &Attendee, to: &Attendee, at: &str) -> Result<RequestId, NetworkingError> {
            self.ledger
                .request_slot(&self.event, from, to, slot(at), None)
                .map(|r| *r.id())
        }

        fn status(&self, id: &RequestId) -> RequestStatus {
            self.ledger.find(id).unwrap().status()
        }
    }

    #[test]
    fn competing_proposals_resolve_on_accept() {
        let mut w = world();
        let (a, b, c) = (w.a.clone(), w.b.clone(), w.c.clone());
        let from_a = w.request(&a, &b, SLOT).unwrap();
        let from_c = w.request(&c, &b, SLOT).unwrap();

        let change = w.ledger.accept(&from_a, b.id()).unwrap();

        assert_eq!(change.request.status(), RequestStatus::Accepted);
        assert_eq!(change.superseded.len(), 1);
        assert_eq!(change.superseded[0].id(), &from_c);
        assert_eq!(w.status(&from_a), RequestStatus::Accepted);
        assert_eq!(w.status(&from_c), RequestStatus::Rejected);
        assert_eq!(change.changed().count(), 2);
    }

    #[test]
    fn rejected_request_frees_the_slot_for_a_retry() {
        let mut w = world();
        let (a, b) = (w.a.clone(), w.b.clone());
        let first = w.request(&a, &b, SLOT).unwrap();
        w.ledger.reject(&first, b.id()).unwrap();

        let second = w.request(&a, &b, SLOT).unwrap();
        assert_ne!(first, second);
        assert_eq!(w.status(&second), RequestStatus::Pending);
    }

    #[test]
    fn requester_may_hold_parallel_proposals_for_one_slot() {
        let mut w = world();
        let (a, b, d) = (w.a.clone(), w.b.clone(), w.d.clone());
        assert!(w.request(&a, &b, SLOT).is_ok());
        assert!(w.request(&a, &d, SLOT).is_ok());
    }

    #[test]
    fn duplicate_pending_proposal_is_refused() {
        let mut w = world();
        let (a, b) = (w.a.clone(), w.b.clone());
        w.request(&a, &b, SLOT).unwrap();
        assert_eq!(
            w.request(&a, &b, SLOT).unwrap_err(),
            NetworkingError::duplicate(SLOT)
        );
    }

    #[test]
    fn target_must_have_declared_the_slot() {
        let mut w = world();
        let (a, c) = (w.a.clone(), w.c.clone());
        let err = w.request(&a, &c, LATER).unwrap_err();
        assert!(matches!(err, NetworkingError::SlotUnavailable { .. }));
    }

    #[test]
    fn unknown_slot_is_a_validation_error() {
        let mut w = world();
        let (a, b) = (w.a.clone(), w.b.clone());
        assert_eq!(
            w.request(&a, &b, "23:00").unwrap_err(),
            NetworkingError::invalid_slot("23:00")
        );
    }

    #[test]
    fn requester_with_incoming_request_is_occupied() {
        let mut w = world();
        let (a, b, c) = (w.a.clone(), w.b.clone(), w.c.clone());
        // C asks A for the slot; A is now occupied there.
        w.request(&c, &a, SLOT).unwrap();
        let err = w.request(&a, &b, SLOT).unwrap_err();
        assert!(matches!(err, NetworkingError::SlotUnavailable { .. }));
    }

    #[test]
    fn committed_target_refuses_new_proposals() {
        let mut w = world();
        let (a, b, c) = (w.a.clone(), w.b.clone(), w.c.clone());
        let id = w.request(&a, &b, SLOT).unwrap();
        w.ledger.accept(&id, b.id()).unwrap();

        let err = w.request(&c, &b, SLOT).unwrap_err();
        assert!(matches!(err, NetworkingError::SlotUnavailable { .. }));
    }

    #[test]
    fn target_committed_as_requester_refuses_new_proposals() {
        let mut w = world();
        let (a, b, c) = (w.a.clone(), w.b.clone(), w.c.clone());
        // B met C as the requester; A may no longer book B at the same slot.
        let id = w.request(&b, &c, SLOT).unwrap();
        w.ledger.accept(&id, c.id()).unwrap();

        let err = w.request(&a, &b, SLOT).unwrap_err();
        assert!(matches!(err, NetworkingError::SlotUnavailable { .. }));
    }

    #[test]
    fn accept_rechecks_requester_commitments() {
        let mut w = world();
        let (a, b, d) = (w.a.clone(), w.b.clone(), w.d.clone());
        let to_b = w.request(&a, &b, SLOT).unwrap();
        let to_d = w.request(&a, &d, SLOT).unwrap();
        w.ledger.accept(&to_b, b.id()).unwrap();

        let err = w.ledger.accept(&to_d, d.id()).unwrap_err();

        assert!(matches!(err, NetworkingError::SlotUnavailable { .. }));
        assert_eq!(w.status(&to_d), RequestStatus::Pending);
    }

    #[test]
    fn cascade_only_touches_same_target_and_slot() {
        let mut w = world();
        let (a, b, c, d) = (w.a.clone(), w.b.clone(), w.c.clone(), w.d.clone());
        let a_to_b = w.request(&a, &b, SLOT).unwrap();
        let c_to_b_later = {
            let mut c_later = c.clone();
            c_later.set_availability(&w.event, &[slot(SLOT), slot(LATER)]).unwrap();
            w.request(&c_later, &b, LATER).unwrap()
        };
        let c_to_d = w.request(&c, &d, SLOT).unwrap();

        w.ledger.accept(&a_to_b, b.id()).unwrap();

        assert_eq!(w.status(&c_to_b_later), RequestStatus::Pending);
        assert_eq!(w.status(&c_to_d), RequestStatus::Pending);
    }

    #[test]
    fn outsider_cannot_accept() {
        let mut w = world();
        let (a, b, c) = (w.a.clone(), w.b.clone(), w.c.clone());
        let id = w.request(&a, &b, SLOT).unwrap();
        assert_eq!(w.ledger.accept(&id, c.id()).unwrap_err(), NetworkingError::Forbidden);
    }

    #[test]
    fn failed_change_leaves_snapshot_untouched() {
        let mut w = world();
        let (a, b) = (w.a.clone(), w.b.clone());
        let id = w.request(&a, &b, SLOT).unwrap();
        let before = w.ledger.clone();

        assert!(w.ledger.cancel(&id, b.id()).is_err());
        assert_eq!(w.ledger, before);
    }

    #[test]
    fn unknown_request_is_not_found() {
        let mut w = world();
        let id = RequestId::new();
        assert_eq!(
            w.ledger.cancel(&id, w.a.id()).unwrap_err(),
            NetworkingError::request_not_found(&id)
        );
    }

    #[test]
    fn occupied_slots_follow_the_asymmetric_rule() {
        let mut w = world();
        let (a, b) = (w.a.clone(), w.b.clone());
        let id = w.request(&a, &b, SLOT).unwrap();

        assert!(w.ledger.occupied_slots(a.id()).is_empty());
        assert!(w.ledger.occupied_slots(b.id()).contains(&slot(SLOT)));

        w.ledger.accept(&id, b.id()).unwrap();
        assert!(w.ledger.occupied_slots(a.id()).contains(&slot(SLOT)));
    }

    #[test]
    fn open_slots_exclude_occupied_ones() {
        let mut w = world();
        let (a, b) = (w.a.clone(), w.b.clone());
        w.request(&a, &b, SLOT).unwrap();
        assert_eq!(w.ledger.open_slots(&b), vec![slot(LATER)]);
        assert_eq!(w.ledger.open_slots(&a), vec![slot(SLOT), slot(LATER)]);
    }

    #[test]
    fn attendee_from_another_event_is_not_found() {
        let mut w = world();
        let other_event = event();
        let stranger = attendee(&other_event, "Eve", &[SLOT]);
        let a = w.a.clone();
        assert!(matches!(
            w.request(&a, &stranger, SLOT).unwrap_err(),
            NetworkingError::AttendeeNotFound(_)
        ));
    }
}
