//! CancelRequestHandler - Requester withdraws a pending request.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, RequestId, SerializableDomainEvent};
use crate::domain::networking::{NetworkingError, NetworkingRequest, RequestCancelled, RequestView};
use crate::ports::{EventPublisher, LedgerRepository};

use super::super::publish_committed;

#[derive(Debug, Clone)]
pub struct CancelRequestCommand {
    pub request_id: RequestId,
}

#[derive(Debug, Clone)]
pub struct CancelRequestResult {
    pub request: NetworkingRequest,
    pub view: RequestView,
    pub event: RequestCancelled,
}

pub struct CancelRequestHandler {
    ledger: Arc<dyn LedgerRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CancelRequestHandler {
    pub fn new(ledger: Arc<dyn LedgerRepository>, event_publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            ledger,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: CancelRequestCommand,
        metadata: CommandMetadata,
    ) -> Result<CancelRequestResult, NetworkingError> {
        let actor = metadata.attendee_id;

        // 1. Find the request
        let mut tx = self.ledger.begin(&metadata.event_id).await?;
        let request = tx
            .find_request(&cmd.request_id)
            .await?
            .ok_or_else(|| NetworkingError::request_not_found(&cmd.request_id))?;

        // 2. Cancel (requester only, pending only)
        let mut ledger = tx
            .load_ledger(&[*request.requester_id(), *request.target_id()])
            .await?;
        let change = ledger.cancel(&cmd.request_id, &actor)?;
        let request = change.request;

        let target = tx
            .find_attendee(request.target_id())
            .await?
            .ok_or_else(|| NetworkingError::attendee_not_found(request.target_id()))?;

        // 3. Persist
        tx.update_requests(std::slice::from_ref(&request)).await?;
        tx.commit().await?;

        tracing::info!(request_id = %cmd.request_id, requester_id = %actor, "Networking request cancelled");

        // 4. Publish event
        let event = RequestCancelled::from_request(&request);
        let envelope = event
            .to_envelope()
            .with_correlation_id(metadata.correlation_id())
            .with_actor_id(actor.to_string());
        publish_committed(self.event_publisher.as_ref(), vec![envelope]).await;

        let view = RequestView::for_viewer(&actor, &request, &target)
            .ok_or_else(|| NetworkingError::infrastructure("request projection failed"))?;

        Ok(CancelRequestResult {
            request,
            view,
            event,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::networking::{RequestSlotCommand, RequestSlotHandler};
    use crate::application::handlers::test_support::Fixture;
    use crate::domain::event::TimeSlot;
    use crate::domain::networking::RequestStatus;

    async fn pending(fx: &Fixture) -> RequestId {
        let result = RequestSlotHandler::new(fx.store.clone(), fx.bus.clone())
            .handle(
                RequestSlotCommand {
                    target_id: fx.attendee("b"),
                    time_slot: TimeSlot::new("10:00-10:30").unwrap(),
                    message: None,
                },
                fx.metadata(fx.attendee("a")),
            )
            .await
            .unwrap();
        *result.request.id()
    }

    fn handler(fx: &Fixture) -> CancelRequestHandler {
        CancelRequestHandler::new(fx.store.clone(), fx.bus.clone())
    }

    #[tokio::test]
    async fn requester_cancels_pending_request() {
        let fx = Fixture::new().await;
        let id = pending(&fx).await;

        let result = handler(&fx)
            .handle(CancelRequestCommand { request_id: id }, fx.metadata(fx.attendee("a")))
            .await
            .unwrap();

        assert_eq!(result.request.status(), RequestStatus::Cancelled);
        assert!(fx.bus.has_event("networking.request_cancelled.v1"));
    }

    #[tokio::test]
    async fn target_cannot_cancel() {
        let fx = Fixture::new().await;
        let id = pending(&fx).await;

        let err = handler(&fx)
            .handle(CancelRequestCommand { request_id: id }, fx.metadata(fx.attendee("b")))
            .await
            .unwrap_err();

        assert!(matches!(err, NetworkingError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn outsider_cannot_cancel() {
        let fx = Fixture::new().await;
        let id = pending(&fx).await;

        let err = handler(&fx)
            .handle(CancelRequestCommand { request_id: id }, fx.metadata(fx.attendee("d")))
            .await
            .unwrap_err();

        assert!(matches!(err, NetworkingError::Forbidden));
    }

    #[tokio::test]
    async fn cancelled_request_cannot_be_cancelled_again() {
        let fx = Fixture::new().await;
        let id = pending(&fx).await;
        let handler = handler(&fx);
        let a = fx.metadata(fx.attendee("a"));

        handler
            .handle(CancelRequestCommand { request_id: id }, a.clone())
            .await
            .unwrap();
        let err = handler
            .handle(CancelRequestCommand { request_id: id }, a)
            .await
            .unwrap_err();

        assert!(matches!(err, NetworkingError::InvalidTransition(_)));
    }
}
