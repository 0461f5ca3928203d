//! VerifyAccessHandler - First sign-in with an access code.
//!
//! Marks the attendee's code as verified (which lists them in the directory)
//! and returns their profile. Verifying again is a no-op that still returns
//! the profile.

use std::sync::Arc;

use crate::domain::attendee::AccessCodeVerified;
use crate::domain::foundation::{
    AuthenticatedAttendee, CommandMetadata, EnvelopeId, SerializableDomainEvent, Timestamp,
};
use crate::domain::networking::NetworkingError;
use crate::ports::{DirectoryReader, EventPublisher, LedgerRepository};

use super::get_profile::{load_profile, AttendeeProfileView};
use super::super::publish_committed;

#[derive(Debug, Clone)]
pub struct VerifyAccessResult {
    pub profile: AttendeeProfileView,
    /// True if this call flipped the flag.
    pub newly_verified: bool,
}

pub struct VerifyAccessHandler {
    ledger: Arc<dyn LedgerRepository>,
    directory: Arc<dyn DirectoryReader>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl VerifyAccessHandler {
    pub fn new(
        ledger: Arc<dyn LedgerRepository>,
        directory: Arc<dyn DirectoryReader>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            ledger,
            directory,
            event_publisher,
        }
    }

    pub async fn handle(&self, metadata: CommandMetadata) -> Result<VerifyAccessResult, NetworkingError> {
        let attendee_id = metadata.attendee_id;

        // 1. Flip the flag if needed
        let mut tx = self.ledger.begin(&metadata.event_id).await?;
        let mut attendee = tx
            .find_attendee(&attendee_id)
            .await?
            .ok_or_else(|| NetworkingError::attendee_not_found(&attendee_id))?;

        let newly_verified = attendee.mark_code_verified();
        if newly_verified {
            tx.save_attendee(&attendee).await?;
            tx.commit().await?;

            tracing::info!(attendee_id = %attendee_id, "Access code verified");

            let event = AccessCodeVerified {
                envelope_id: EnvelopeId::new(),
                attendee_id,
                event_id: metadata.event_id,
                verified_at: Timestamp::now(),
            };
            let envelope = event
                .to_envelope()
                .with_correlation_id(metadata.correlation_id())
                .with_actor_id(attendee_id.to_string());
            publish_committed(self.event_publisher.as_ref(), vec![envelope]).await;
        } else {
            // Release the event before reading through the directory.
            drop(tx);
        }

        // 2. Read back the profile
        let actor = AuthenticatedAttendee::new(attendee_id, metadata.event_id);
        let profile = load_profile(self.directory.as_ref(), &actor).await?;

        Ok(VerifyAccessResult {
            profile,
            newly_verified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Fixture;

    fn handler(fx: &Fixture) -> VerifyAccessHandler {
        VerifyAccessHandler::new(fx.store.clone(), fx.store.clone(), fx.bus.clone())
    }

    #[tokio::test]
    async fn first_verification_sets_flag_and_publishes() {
        let fx = Fixture::new().await;
        let e = fx.attendee("e");

        let result = handler(&fx).handle(fx.metadata(e)).await.unwrap();

        assert!(result.newly_verified);
        assert!(result.profile.attendee.code_verified());
        assert_eq!(fx.bus.events_of_type("attendee.code_verified.v1").len(), 1);
    }

    #[tokio::test]
    async fn second_verification_is_idempotent() {
        let fx = Fixture::new().await;
        let e = fx.attendee("e");
        let handler = handler(&fx);

        handler.handle(fx.metadata(e)).await.unwrap();
        let again = handler.handle(fx.metadata(e)).await.unwrap();

        assert!(!again.newly_verified);
        assert!(again.profile.attendee.code_verified());
        assert_eq!(fx.bus.event_count(), 1);
    }
}
