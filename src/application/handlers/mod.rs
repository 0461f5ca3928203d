//! Application handlers.
//!
//! Command handlers open one ledger transaction per call, apply the domain
//! operation, commit, then publish. Query handlers read through the
//! directory without taking the event lock.

pub mod attendee;
pub mod directory;
pub mod networking;

#[cfg(test)]
pub(crate) mod test_support;

pub use attendee::{
    AttendeeProfileView, GetProfileHandler, GetProfileQuery, SetAvailabilityCommand,
    SetAvailabilityHandler, SetAvailabilityResult, UpdateProfileCommand, UpdateProfileHandler,
    UpdateProfileResult, VerifyAccessHandler, VerifyAccessResult,
};
pub use directory::{DirectoryEntry, DirectoryView, GetDirectoryHandler, GetDirectoryQuery};
pub use networking::{
    CancelRequestCommand, CancelRequestHandler, CancelRequestResult, Decision,
    RequestSlotCommand, RequestSlotHandler, RequestSlotResult, RespondToRequestCommand,
    RespondToRequestHandler, RespondToRequestResult,
};

use crate::domain::foundation::EventEnvelope;
use crate::ports::EventPublisher;

/// Publishes events for a change that has already committed. A failure is
/// logged and swallowed; the ledger state stands either way.
pub(crate) async fn publish_committed(publisher: &dyn EventPublisher, events: Vec<EventEnvelope>) {
    if events.is_empty() {
        return;
    }
    let count = events.len();
    if let Err(e) = publisher.publish_all(events).await {
        tracing::warn!(error = %e, count, "Failed to publish domain events");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, ErrorCode};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingPublisher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EventPublisher for FailingPublisher {
        async fn publish(&self, _event: EventEnvelope) -> Result<(), DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(DomainError::new(ErrorCode::InternalError, "bus down"))
        }

        async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
            for event in events {
                self.publish(event).await?;
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn publish_failure_does_not_fail_command() {
        use crate::application::handlers::test_support::Fixture;
        use crate::domain::event::TimeSlot;
        use std::sync::Arc;

        let fx = Fixture::new().await;
        let publisher = Arc::new(FailingPublisher {
            calls: AtomicUsize::new(0),
        });
        let handler = RequestSlotHandler::new(fx.store.clone(), publisher.clone());

        let result = handler
            .handle(
                RequestSlotCommand {
                    target_id: fx.attendee("b"),
                    time_slot: TimeSlot::new("10:00-10:30").unwrap(),
                    message: None,
                },
                fx.metadata(fx.attendee("a")),
            )
            .await;

        assert!(result.is_ok());
        assert_eq!(publisher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_batch_skips_publisher() {
        let publisher = FailingPublisher {
            calls: AtomicUsize::new(0),
        };
        publish_committed(&publisher, vec![]).await;
        assert_eq!(publisher.calls.load(Ordering::SeqCst), 0);
    }
}
