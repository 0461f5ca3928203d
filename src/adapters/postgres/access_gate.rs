//! PostgreSQL implementation of AccessGate.
//!
//! Looks the attendee up by the SHA-256 digest of the presented code, so the
//! comparison happens on an indexed column and plaintext never reaches SQL.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::attendee::{AccessCode, AccessCodeDigest};
use crate::domain::event::EventCode;
use crate::domain::foundation::{AttendeeId, AuthError, AuthenticatedAttendee, EventId};
use crate::ports::AccessGate;

#[derive(Clone)]
pub struct PostgresAccessGate {
    pool: PgPool,
}

impl PostgresAccessGate {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessGate for PostgresAccessGate {
    async fn resolve(
        &self,
        event_code: &EventCode,
        access_code: &AccessCode,
    ) -> Result<AuthenticatedAttendee, AuthError> {
        let digest = access_code.digest();

        let row = sqlx::query(
            r#"
            SELECT a.id AS attendee_id, a.event_id, a.access_code_hash
            FROM attendees a
            JOIN events e ON e.id = a.event_id
            WHERE e.event_code = $1
              AND e.is_active
              AND a.access_code_hash = $2
            "#,
        )
        .bind(event_code.as_str())
        .bind(digest.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Access code lookup failed");
            AuthError::service_unavailable("credential store unavailable")
        })?;

        let row = row.ok_or(AuthError::InvalidCredential)?;
        let stored: String = row
            .try_get("access_code_hash")
            .map_err(|_| AuthError::InvalidCredential)?;
        if !AccessCodeDigest::from_hex(stored).matches(access_code) {
            return Err(AuthError::InvalidCredential);
        }

        let attendee_id: Uuid = row
            .try_get("attendee_id")
            .map_err(|_| AuthError::InvalidCredential)?;
        let event_id: Uuid = row
            .try_get("event_id")
            .map_err(|_| AuthError::InvalidCredential)?;

        Ok(AuthenticatedAttendee::new(
            AttendeeId::from_uuid(attendee_id),
            EventId::from_uuid(event_id),
        ))
    }
}
