//! RequestSlotHandler - Command handler for proposing a meeting.

use std::sync::Arc;

use crate::domain::event::TimeSlot;
use crate::domain::foundation::{AttendeeId, CommandMetadata, SerializableDomainEvent};
use crate::domain::networking::{NetworkingError, NetworkingRequest, RequestCreated, RequestView};
use crate::ports::{EventPublisher, LedgerRepository};

use super::super::publish_committed;

/// Command to ask another attendee for a meeting at one slot.
#[derive(Debug, Clone)]
pub struct RequestSlotCommand {
    pub target_id: AttendeeId,
    pub time_slot: TimeSlot,
    pub message: Option<String>,
}

/// Result of a successful request.
#[derive(Debug, Clone)]
pub struct RequestSlotResult {
    pub request: NetworkingRequest,
    /// The request as the requester sees it.
    pub view: RequestView,
    pub event: RequestCreated,
}

pub struct RequestSlotHandler {
    ledger: Arc<dyn LedgerRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl RequestSlotHandler {
    pub fn new(ledger: Arc<dyn LedgerRepository>, event_publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            ledger,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: RequestSlotCommand,
        metadata: CommandMetadata,
    ) -> Result<RequestSlotResult, NetworkingError> {
        let requester_id = metadata.attendee_id;

        // 1. Open the event's unit of work
        let mut tx = self.ledger.begin(&metadata.event_id).await?;
        tx.event().ensure_active()?;

        // 2. Load both parties
        let requester = tx
            .find_attendee(&requester_id)
            .await?
            .ok_or_else(|| NetworkingError::attendee_not_found(&requester_id))?;
        let target = tx
            .find_attendee(&cmd.target_id)
            .await?
            .ok_or_else(|| NetworkingError::attendee_not_found(&cmd.target_id))?;

        // 3. Validate against the ledger and stage the request
        let mut ledger = tx.load_ledger(&[requester_id, cmd.target_id]).await?;
        let request =
            ledger.request_slot(tx.event(), &requester, &target, cmd.time_slot, cmd.message)?;

        // 4. Persist
        tx.insert_request(&request).await?;
        tx.commit().await?;

        tracing::info!(
            request_id = %request.id(),
            requester_id = %requester_id,
            target_id = %cmd.target_id,
            time_slot = %request.time_slot(),
            "Networking request created"
        );

        // 5. Publish event
        let event = RequestCreated::from_request(&request);
        let envelope = event
            .to_envelope()
            .with_correlation_id(metadata.correlation_id())
            .with_actor_id(requester_id.to_string());
        publish_committed(self.event_publisher.as_ref(), vec![envelope]).await;

        let view = RequestView::for_viewer(&requester_id, &request, &target)
            .ok_or_else(|| NetworkingError::infrastructure("request projection failed"))?;

        Ok(RequestSlotResult {
            request,
            view,
            event,
        })
    }
}
