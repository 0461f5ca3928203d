//! GetProfileHandler - Query handler for the caller's own profile.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::attendee::Attendee;
use crate::domain::event::{Event, TimeSlot};
use crate::domain::foundation::{AuthenticatedAttendee, EventId};
use crate::domain::networking::{NetworkingError, NetworkingOverview, SlotLedger};
use crate::ports::DirectoryReader;

/// Query for the caller's profile.
#[derive(Debug, Clone, Copy)]
pub struct GetProfileQuery {
    pub actor: AuthenticatedAttendee,
}

/// The caller's full profile with their networking requests.
#[derive(Debug, Clone)]
pub struct AttendeeProfileView {
    pub event: Event,
    pub attendee: Attendee,
    /// Declared availability minus occupied slots, in event order.
    pub open_slots: Vec<TimeSlot>,
    pub networking: NetworkingOverview,
}

pub struct GetProfileHandler {
    directory: Arc<dyn DirectoryReader>,
}

impl GetProfileHandler {
    pub fn new(directory: Arc<dyn DirectoryReader>) -> Self {
        Self { directory }
    }

    pub async fn handle(&self, query: GetProfileQuery) -> Result<AttendeeProfileView, NetworkingError> {
        load_profile(self.directory.as_ref(), &query.actor).await
    }
}

pub(super) async fn load_profile(
    directory: &dyn DirectoryReader,
    actor: &AuthenticatedAttendee,
) -> Result<AttendeeProfileView, NetworkingError> {
    let event = find_event(directory, &actor.event_id).await?;
    let attendee = directory
        .find_attendee(&actor.event_id, &actor.attendee_id)
        .await?
        .ok_or_else(|| NetworkingError::attendee_not_found(&actor.attendee_id))?;

    let requests: Vec<_> = directory
        .list_requests(&actor.event_id)
        .await?
        .into_iter()
        .filter(|r| r.involves(attendee.id()))
        .collect();
    let attendees: HashMap<_, _> = directory
        .list_attendees(&actor.event_id)
        .await?
        .into_iter()
        .map(|a| (*a.id(), a))
        .collect();

    let networking = NetworkingOverview::project(attendee.id(), &requests, &attendees);
    let open_slots = SlotLedger::new(requests).open_slots(&attendee);

    Ok(AttendeeProfileView {
        event,
        attendee,
        open_slots,
        networking,
    })
}

pub(crate) async fn find_event(
    directory: &dyn DirectoryReader,
    id: &EventId,
) -> Result<Event, NetworkingError> {
    directory
        .find_event(id)
        .await?
        .ok_or_else(|| NetworkingError::EventNotFound(id.to_string()))
}
