//! SetAvailabilityHandler - Replace the caller's declared slots.
//!
//! Runs inside the event's ledger transaction so it cannot interleave with a
//! request that is checking the same attendee's availability. Existing
//! requests are never touched.

use std::sync::Arc;

use crate::domain::attendee::{Attendee, AvailabilityUpdated};
use crate::domain::event::TimeSlot;
use crate::domain::foundation::{CommandMetadata, EnvelopeId, SerializableDomainEvent};
use crate::domain::networking::NetworkingError;
use crate::ports::{EventPublisher, LedgerRepository};

use super::super::publish_committed;

#[derive(Debug, Clone)]
pub struct SetAvailabilityCommand {
    pub slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone)]
pub struct SetAvailabilityResult {
    pub attendee: Attendee,
    pub event: AvailabilityUpdated,
}

pub struct SetAvailabilityHandler {
    ledger: Arc<dyn LedgerRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl SetAvailabilityHandler {
    pub fn new(ledger: Arc<dyn LedgerRepository>, event_publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            ledger,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: SetAvailabilityCommand,
        metadata: CommandMetadata,
    ) -> Result<SetAvailabilityResult, NetworkingError> {
        let attendee_id = metadata.attendee_id;

        // 1. Load attendee
        let mut tx = self.ledger.begin(&metadata.event_id).await?;
        tx.event().ensure_active()?;
        let mut attendee = tx
            .find_attendee(&attendee_id)
            .await?
            .ok_or_else(|| NetworkingError::attendee_not_found(&attendee_id))?;

        // 2. Validate and replace
        attendee.set_availability(tx.event(), &cmd.slots)?;

        // 3. Persist
        tx.save_attendee(&attendee).await?;
        tx.commit().await?;

        tracing::info!(
            attendee_id = %attendee_id,
            slots = attendee.available_slots().len(),
            "Availability updated"
        );

        // 4. Publish event
        let event = AvailabilityUpdated {
            envelope_id: EnvelopeId::new(),
            attendee_id,
            event_id: *attendee.event_id(),
            available_slots: attendee.available_slots().to_vec(),
            updated_at: *attendee.updated_at(),
        };
        let envelope = event
            .to_envelope()
            .with_correlation_id(metadata.correlation_id())
            .with_actor_id(attendee_id.to_string());
        publish_committed(self.event_publisher.as_ref(), vec![envelope]).await;

        Ok(SetAvailabilityResult { attendee, event })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::networking::{RequestSlotCommand, RequestSlotHandler};
    use crate::application::handlers::test_support::Fixture;
    use crate::domain::networking::RequestStatus;
    use crate::ports::DirectoryReader;

    fn slots(raw: &[&str]) -> Vec<TimeSlot> {
        raw.iter().map(|s| TimeSlot::new(*s).unwrap()).collect()
    }

    fn handler(fx: &Fixture) -> SetAvailabilityHandler {
        SetAvailabilityHandler::new(fx.store.clone(), fx.bus.clone())
    }

    #[tokio::test]
    async fn replaces_and_orders_slots() {
        let fx = Fixture::new().await;
        let a = fx.attendee("a");

        let result = handler(&fx)
            .handle(
                SetAvailabilityCommand {
                    slots: slots(&["11:00-11:30", "09:30-10:00", "11:00-11:30"]),
                },
                fx.metadata(a),
            )
            .await
            .unwrap();

        assert_eq!(
            result.attendee.available_slots(),
            slots(&["09:30-10:00", "11:00-11:30"]).as_slice()
        );
        assert!(fx.bus.has_event("attendee.availability_updated.v1"));
    }

    #[tokio::test]
    async fn unknown_slot_rejects_whole_update() {
        let fx = Fixture::new().await;
        let a = fx.attendee("a");

        let err = handler(&fx)
            .handle(
                SetAvailabilityCommand {
                    slots: slots(&["09:30-10:00", "12:00-12:30"]),
                },
                fx.metadata(a),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, NetworkingError::InvalidSlot(ref s) if s == "12:00-12:30"));
        let stored = fx.store.find_attendee(fx.event.id(), &a).await.unwrap().unwrap();
        assert_eq!(stored.available_slots(), slots(&["10:00-10:30"]).as_slice());
    }

    #[tokio::test]
    async fn clearing_availability_keeps_existing_requests() {
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

        handler(&fx)
            .handle(SetAvailabilityCommand { slots: vec![] }, fx.metadata(b))
            .await
            .unwrap();

        let requests = fx.store.list_requests(fx.event.id()).await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].status(), RequestStatus::Pending);
    }
}
