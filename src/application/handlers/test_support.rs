//! Shared fixture for handler tests: one event in an in-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use crate::adapters::events::InMemoryEventBus;
use crate::adapters::memory::InMemoryNetworkingStore;
use crate::domain::attendee::{AccessCode, Attendee, AttendeeProfile};
use crate::domain::event::{Event, EventCode, TimeSlot};
use crate::domain::foundation::{AttendeeId, AuthenticatedAttendee, CommandMetadata, EventId};

pub(crate) const SLOTS: [&str; 3] = ["09:30-10:00", "10:00-10:30", "11:00-11:30"];

/// Attendees `a`, `b`, `c` and `d` are verified and available at
/// `10:00-10:30`. `e` is unverified with no availability.
pub(crate) struct Fixture {
    pub store: Arc<InMemoryNetworkingStore>,
    pub bus: Arc<InMemoryEventBus>,
    pub event: Event,
    ids: HashMap<&'static str, AttendeeId>,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryNetworkingStore::new());
        let slots = SLOTS.iter().map(|s| TimeSlot::new(*s).unwrap()).collect();
        let event = Event::new(EventId::new(), EventCode::generate(), "Expo", slots).unwrap();
        store.add_event(event.clone()).await.unwrap();

        let mut ids = HashMap::new();
        for name in ["a", "b", "c", "d", "e"] {
            let code = AccessCode::generate();
            let mut attendee = Attendee::register(
                AttendeeId::new(),
                &event,
                AttendeeProfile {
                    full_name: format!("Attendee {}", name.to_uppercase()),
                    organization: format!("Org {}", name),
                    position: "Founder".to_string(),
                    email: format!("{}@example.com", name),
                    phone: Some(format!("+1 555 000 {}", name)),
                    ..Default::default()
                },
                &code,
            )
            .unwrap();
            if name != "e" {
                attendee
                    .set_availability(&event, &[TimeSlot::new("10:00-10:30").unwrap()])
                    .unwrap();
                attendee.mark_code_verified();
            }
            ids.insert(name, *attendee.id());
            store.add_attendee(attendee).await.unwrap();
        }

        Self {
            store,
            bus: Arc::new(InMemoryEventBus::new()),
            event,
            ids,
        }
    }

    pub fn attendee(&self, name: &str) -> AttendeeId {
        self.ids[name]
    }

    pub fn actor(&self, id: AttendeeId) -> AuthenticatedAttendee {
        AuthenticatedAttendee::new(id, *self.event.id())
    }

    pub fn metadata(&self, id: AttendeeId) -> CommandMetadata {
        CommandMetadata::new(&self.actor(id))
    }
}
