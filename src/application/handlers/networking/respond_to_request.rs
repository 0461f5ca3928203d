//! RespondToRequestHandler - Target accepts or rejects a pending request.
//!
//! Accepting rejects every competing pending request for the same target and
//! slot in the same transaction. Each superseded request gets its own
//! `RequestRejected` event so its requester can be told.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, RequestId, SerializableDomainEvent};
use crate::domain::networking::{
    LedgerChange, NetworkingError, RequestAccepted, RequestRejected, RequestView,
};
use crate::ports::{EventPublisher, LedgerRepository};

use super::super::publish_committed;

/// The target's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

#[derive(Debug, Clone)]
pub struct RespondToRequestCommand {
    pub request_id: RequestId,
    pub decision: Decision,
}

#[derive(Debug, Clone)]
pub struct RespondToRequestResult {
    pub change: LedgerChange,
    /// The answered request as the target sees it.
    pub view: RequestView,
}

pub struct RespondToRequestHandler {
    ledger: Arc<dyn LedgerRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl RespondToRequestHandler {
    pub fn new(ledger: Arc<dyn LedgerRepository>, event_publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            ledger,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: RespondToRequestCommand,
        metadata: CommandMetadata,
    ) -> Result<RespondToRequestResult, NetworkingError> {
        let actor = metadata.attendee_id;

        // 1. Open the event's unit of work and find the request
        let mut tx = self.ledger.begin(&metadata.event_id).await?;
        let request = tx
            .find_request(&cmd.request_id)
            .await?
            .ok_or_else(|| NetworkingError::request_not_found(&cmd.request_id))?;

        // 2. Apply the decision against both parties' ledgers
        let mut ledger = tx
            .load_ledger(&[*request.requester_id(), *request.target_id()])
            .await?;
        let change = match cmd.decision {
            Decision::Accept => ledger.accept(&cmd.request_id, &actor)?,
            Decision::Reject => ledger.reject(&cmd.request_id, &actor)?,
        };

        let requester = tx
            .find_attendee(change.request.requester_id())
            .await?
            .ok_or_else(|| NetworkingError::attendee_not_found(change.request.requester_id()))?;

        // 3. Persist request and cascade together
        let changed: Vec<_> = change.changed().cloned().collect();
        tx.update_requests(&changed).await?;
        tx.commit().await?;

        tracing::info!(
            request_id = %cmd.request_id,
            target_id = %actor,
            status = %change.request.status(),
            superseded = change.superseded.len(),
            "Networking request answered"
        );

        // 4. Publish events
        let correlation_id = metadata.correlation_id();
        let mut envelopes = Vec::with_capacity(1 + change.superseded.len());
        match cmd.decision {
            Decision::Accept => {
                envelopes.push(
                    RequestAccepted::from_request(&change.request, &change.superseded).to_envelope(),
                );
                envelopes.extend(
                    change
                        .superseded
                        .iter()
                        .map(|r| RequestRejected::from_request(r, true).to_envelope()),
                );
            }
            Decision::Reject => {
                envelopes.push(RequestRejected::from_request(&change.request, false).to_envelope())
            }
        }
        let envelopes = envelopes
            .into_iter()
            .map(|e| {
                e.with_correlation_id(correlation_id)
                    .with_actor_id(actor.to_string())
            })
            .collect();
        publish_committed(self.event_publisher.as_ref(), envelopes).await;

        let view = RequestView::for_viewer(&actor, &change.request, &requester)
            .ok_or_else(|| NetworkingError::infrastructure("request projection failed"))?;

        Ok(RespondToRequestResult { change, view })
    }
}
