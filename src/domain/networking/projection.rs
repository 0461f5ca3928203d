//! Per-attendee read model of the request ledger.
//!
//! Contact details (email, phone) of the counterpart appear only once a
//! request is accepted. Every projection goes through [`RequestView::for_viewer`]
//! so there is one place that decides what leaks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::attendee::Attendee;
use crate::domain::event::TimeSlot;
use crate::domain::foundation::{AttendeeId, RequestId, Timestamp};

use super::{NetworkingRequest, PartyRole, RequestStatus};

/// The other party of a request as seen by the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartView {
    pub attendee_id: AttendeeId,
    pub full_name: String,
    pub organization: String,
    pub position: String,
    pub photo_url: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestView {
    pub id: RequestId,
    pub role: PartyRole,
    pub time_slot: TimeSlot,
    pub status: RequestStatus,
    pub message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub counterpart: CounterpartView,
}

impl RequestView {
    /// Projects `request` for `viewer`. Returns `None` if the viewer is not a
    /// party or `counterpart` is not the other party.
    pub fn for_viewer(
        viewer: &AttendeeId,
        request: &NetworkingRequest,
        counterpart: &Attendee,
    ) -> Option<Self> {
        let role = request.role_of(viewer)?;
        if request.counterpart_of(viewer)? != counterpart.id() {
            return None;
        }

        let reveal_contact = request.status() == RequestStatus::Accepted;
        let profile = counterpart.profile();

        Some(Self {
            id: *request.id(),
            role,
            time_slot: request.time_slot().clone(),
            status: request.status(),
            message: request.message().map(str::to_string),
            created_at: *request.created_at(),
            updated_at: *request.updated_at(),
            counterpart: CounterpartView {
                attendee_id: *counterpart.id(),
                full_name: profile.full_name.clone(),
                organization: profile.organization.clone(),
                position: profile.position.clone(),
                photo_url: profile.photo_url.clone(),
                email: reveal_contact.then(|| profile.email.clone()),
                phone: if reveal_contact { profile.phone.clone() } else { None },
            },
        })
    }
}

/// Requests an attendee received and sent, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkingOverview {
    pub received: Vec<RequestView>,
    pub sent: Vec<RequestView>,
}

impl NetworkingOverview {
    /// Builds the overview for `viewer`. Requests whose counterpart is missing
    /// from `attendees` are skipped.
    pub fn project(
        viewer: &AttendeeId,
        requests: &[NetworkingRequest],
        attendees: &HashMap<AttendeeId, Attendee>,
    ) -> Self {
        let mut overview = Self::default();

        for request in requests {
            let Some(counterpart) = request
                .counterpart_of(viewer)
                .and_then(|id| attendees.get(id))
            else {
                continue;
            };
            let Some(view) = RequestView::for_viewer(viewer, request, counterpart) else {
                continue;
            };
            match view.role {
                PartyRole::Target => overview.received.push(view),
                PartyRole::Requester => overview.sent.push(view),
            }
        }

        for list in [&mut overview.received, &mut overview.sent] {
            list.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
            });
        }
        overview
    }
}
