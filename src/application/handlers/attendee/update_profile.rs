//! UpdateProfileHandler - Self-service edit of the caller's profile.

use std::sync::Arc;

use crate::domain::attendee::{ProfileChanges, ProfileUpdated};
use crate::domain::foundation::{
    AuthenticatedAttendee, CommandMetadata, EnvelopeId, SerializableDomainEvent,
};
use crate::domain::networking::NetworkingError;
use crate::ports::{DirectoryReader, EventPublisher, LedgerRepository};

use super::get_profile::{load_profile, AttendeeProfileView};
use super::super::publish_committed;

#[derive(Debug, Clone)]
pub struct UpdateProfileCommand {
    pub changes: ProfileChanges,
}

#[derive(Debug, Clone)]
pub struct UpdateProfileResult {
    pub profile: AttendeeProfileView,
    /// Names of the fields this call modified.
    pub changed_fields: Vec<&'static str>,
}

pub struct UpdateProfileHandler {
    ledger: Arc<dyn LedgerRepository>,
    directory: Arc<dyn DirectoryReader>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl UpdateProfileHandler {
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

    pub async fn handle(
        &self,
        cmd: UpdateProfileCommand,
        metadata: CommandMetadata,
    ) -> Result<UpdateProfileResult, NetworkingError> {
        let attendee_id = metadata.attendee_id;

        // 1. Load attendee
        let mut tx = self.ledger.begin(&metadata.event_id).await?;
        tx.event().ensure_active()?;
        let mut attendee = tx
            .find_attendee(&attendee_id)
            .await?
            .ok_or_else(|| NetworkingError::attendee_not_found(&attendee_id))?;

        // 2. Apply the edit
        let changed_fields = attendee.update_profile(cmd.changes)?;

        // 3. Persist and publish only if something moved
        if changed_fields.is_empty() {
            drop(tx);
        } else {
            tx.save_attendee(&attendee).await?;
            tx.commit().await?;

            tracing::info!(
                attendee_id = %attendee_id,
                fields = ?changed_fields,
                "Profile updated"
            );

            let event = ProfileUpdated {
                envelope_id: EnvelopeId::new(),
                attendee_id,
                event_id: *attendee.event_id(),
                changed_fields: changed_fields.iter().map(|f| f.to_string()).collect(),
                updated_at: *attendee.updated_at(),
            };
            let envelope = event
                .to_envelope()
                .with_correlation_id(metadata.correlation_id())
                .with_actor_id(attendee_id.to_string());
            publish_committed(self.event_publisher.as_ref(), vec![envelope]).await;
        }

        // 4. Read back the full profile view
        let actor = AuthenticatedAttendee::new(attendee_id, metadata.event_id);
        let profile = load_profile(self.directory.as_ref(), &actor).await?;

        Ok(UpdateProfileResult {
            profile,
            changed_fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Fixture;
    use crate::ports::DirectoryReader;

    fn handler(fx: &Fixture) -> UpdateProfileHandler {
        UpdateProfileHandler::new(fx.store.clone(), fx.store.clone(), fx.bus.clone())
    }

    #[tokio::test]
    async fn edits_are_persisted_and_published() {
        let fx = Fixture::new().await;
        let a = fx.attendee("a");

        let result = handler(&fx)
            .handle(
                UpdateProfileCommand {
                    changes: ProfileChanges {
                        position: Some("Head of Partnerships".to_string()),
                        interests: Some(vec!["robotics".to_string()]),
                        ..Default::default()
                    },
                },
                fx.metadata(a),
            )
            .await
            .unwrap();

        assert_eq!(result.changed_fields, vec!["position", "interests"]);
        assert_eq!(result.profile.attendee.profile().position, "Head of Partnerships");

        let stored = fx.store.find_attendee(fx.event.id(), &a).await.unwrap().unwrap();
        assert_eq!(stored.profile().interests, vec!["robotics".to_string()]);
        assert!(fx.bus.has_event("attendee.profile_updated.v1"));
    }

    #[tokio::test]
    async fn invalid_edit_leaves_profile_untouched() {
        let fx = Fixture::new().await;
        let a = fx.attendee("a");

        let err = handler(&fx)
            .handle(
                UpdateProfileCommand {
                    changes: ProfileChanges {
                        organization: Some(String::new()),
                        ..Default::default()
                    },
                },
                fx.metadata(a),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, NetworkingError::ValidationFailed { .. }));
        let stored = fx.store.find_attendee(fx.event.id(), &a).await.unwrap().unwrap();
        assert_eq!(stored.profile().organization, "Org a");
        assert!(!fx.bus.has_event("attendee.profile_updated.v1"));
    }

    #[tokio::test]
    async fn empty_edit_publishes_nothing() {
        let fx = Fixture::new().await;

        let result = handler(&fx)
            .handle(
                UpdateProfileCommand {
                    changes: ProfileChanges::default(),
                },
                fx.metadata(fx.attendee("b")),
            )
            .await
            .unwrap();

        assert!(result.changed_fields.is_empty());
        assert!(!fx.bus.has_event("attendee.profile_updated.v1"));
    }
}
