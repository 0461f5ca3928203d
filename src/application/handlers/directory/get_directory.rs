//! GetDirectoryHandler - Query handler for the event directory.
//!
//! Lists verified attendees with the slots they can still be booked for,
//! plus the caller's own received and sent requests. Reads are not taken
//! under the event lock, so a concurrent booking may show up on the next
//! refresh.

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::handlers::attendee::find_event;
use crate::domain::attendee::Attendee;
use crate::domain::event::{Event, TimeSlot};
use crate::domain::foundation::AuthenticatedAttendee;
use crate::domain::networking::{NetworkingError, NetworkingOverview, SlotLedger};
use crate::ports::DirectoryReader;

#[derive(Debug, Clone, Copy)]
pub struct GetDirectoryQuery {
    pub actor: AuthenticatedAttendee,
}

#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub attendee: Attendee,
    pub open_slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone)]
pub struct DirectoryView {
    pub event: Event,
    /// Verified attendees ordered by name.
    pub entries: Vec<DirectoryEntry>,
    pub networking: NetworkingOverview,
}

pub struct GetDirectoryHandler {
    directory: Arc<dyn DirectoryReader>,
}

impl GetDirectoryHandler {
    pub fn new(directory: Arc<dyn DirectoryReader>) -> Self {
        Self { directory }
    }

    pub async fn handle(&self, query: GetDirectoryQuery) -> Result<DirectoryView, NetworkingError> {
        let GetDirectoryQuery { actor } = query;

        let event = find_event(self.directory.as_ref(), &actor.event_id).await?;
        let attendees = self.directory.list_attendees(&actor.event_id).await?;
        if !attendees.iter().any(|a| a.id() == &actor.attendee_id) {
            return Err(NetworkingError::attendee_not_found(&actor.attendee_id));
        }

        let ledger = SlotLedger::new(self.directory.list_requests(&actor.event_id).await?);

        let entries = attendees
            .iter()
            .filter(|a| a.code_verified())
            .map(|a| DirectoryEntry {
                attendee: a.clone(),
                open_slots: ledger.open_slots(a),
            })
            .collect();

        let by_id: HashMap<_, _> = attendees.into_iter().map(|a| (*a.id(), a)).collect();
        let networking =
            NetworkingOverview::project(&actor.attendee_id, ledger.requests(), &by_id);

        Ok(DirectoryView {
            event,
            entries,
            networking,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::networking::{
        Decision, RequestSlotCommand, RequestSlotHandler, RespondToRequestCommand,
        RespondToRequestHandler,
    };
    use crate::application::handlers::test_support::Fixture;
    use crate::domain::foundation::AttendeeId;

    fn query(fx: &Fixture, name: &str) -> GetDirectoryQuery {
        GetDirectoryQuery {
            actor: fx.actor(fx.attendee(name)),
        }
    }

    fn open_slots(view: &DirectoryView, id: AttendeeId) -> Vec<TimeSlot> {
        view.entries
            .iter()
            .find(|e| e.attendee.id() == &id)
            .map(|e| e.open_slots.clone())
            .unwrap()
    }

    #[tokio::test]
    async fn lists_only_verified_attendees() {
        let fx = Fixture::new().await;

        let view = GetDirectoryHandler::new(fx.store.clone())
            .handle(query(&fx, "a"))
            .await
            .unwrap();

        assert_eq!(view.entries.len(), 4);
        assert!(view.entries.iter().all(|e| e.attendee.code_verified()));
        assert_eq!(view.event.id(), fx.event.id());
    }

    #[tokio::test]
    async fn accepted_meeting_closes_slot_for_both_parties() {
        let fx = Fixture::new().await;
        let (a, b) = (fx.attendee("a"), fx.attendee("b"));
        let created = RequestSlotHandler::new(fx.store.clone(), fx.bus.clone())
            .handle(
                RequestSlotCommand {
                    target_id: b,
                    time_slot: TimeSlot::new("10:00-10:30").unwrap(),
                    message: None,
                },
                fx.metadata(a),
            )
            .await
            .unwrap();
        let handler = GetDirectoryHandler::new(fx.store.clone());

        let pending = handler.handle(query(&fx, "c")).await.unwrap();
        assert!(open_slots(&pending, b).is_empty());
        assert_eq!(open_slots(&pending, a).len(), 1);

        RespondToRequestHandler::new(fx.store.clone(), fx.bus.clone())
            .handle(
                RespondToRequestCommand {
                    request_id: *created.request.id(),
                    decision: Decision::Accept,
                },
                fx.metadata(b),
            )
            .await
            .unwrap();

        let accepted = handler.handle(query(&fx, "c")).await.unwrap();
        assert!(open_slots(&accepted, a).is_empty());
        assert!(open_slots(&accepted, b).is_empty());
        assert!(accepted.networking.sent.is_empty());
        assert!(accepted.networking.received.is_empty());
    }

    #[tokio::test]
    async fn caller_sees_own_requests() {
        let fx = Fixture::new().await;
        let (a, b) = (fx.attendee("a"), fx.attendee("b"));
        RequestSlotHandler::new(fx.store.clone(), fx.bus.clone())
            .handle(
                RequestSlotCommand {
                    target_id: b,
                    time_slot: TimeSlot::new("10:00-10:30").unwrap(),
                    message: None,
                },
                fx.metadata(a),
            )
            .await
            .unwrap();

        let view = GetDirectoryHandler::new(fx.store.clone())
            .handle(query(&fx, "b"))
            .await
            .unwrap();

        assert_eq!(view.networking.received.len(), 1);
        assert_eq!(view.networking.received[0].counterpart.attendee_id, a);
    }
}
