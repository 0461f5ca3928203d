//! PostgreSQL implementation of LedgerRepository.
//!
//! `begin` opens a transaction and takes `SELECT ... FOR UPDATE` on the
//! event row, so writers for the same event queue behind each other while
//! other events proceed. Partial unique indexes on accepted requests back
//! the exclusivity rule at the storage level.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::attendee::Attendee;
use crate::domain::event::Event;
use crate::domain::foundation::{AttendeeId, DomainError, ErrorCode, EventId, RequestId};
use crate::domain::networking::{NetworkingRequest, SlotLedger};
use crate::ports::{LedgerRepository, LedgerTransaction};

use super::rows::{
    db_error, slots_to_strings, AttendeeRow, EventRow, RequestRow, ATTENDEE_COLUMNS,
    EVENT_COLUMNS, REQUEST_COLUMNS,
};

#[derive(Clone)]
pub struct PostgresLedgerRepository {
    pool: PgPool,
}

impl PostgresLedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerRepository for PostgresLedgerRepository {
    async fn begin(&self, event_id: &EventId) -> Result<Box<dyn LedgerTransaction>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("begin transaction"))?;

        let sql = format!("SELECT {} FROM events WHERE id = $1 FOR UPDATE", EVENT_COLUMNS);
        let row: Option<EventRow> = sqlx::query_as(&sql)
            .bind(event_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("lock event"))?;

        let event = match row {
            Some(row) => Event::try_from(row)?,
            None => {
                return Err(DomainError::new(
                    ErrorCode::EventNotFound,
                    format!("Event not found: {}", event_id),
                ))
            }
        };

        Ok(Box::new(PostgresLedgerTransaction { tx, event }))
    }
}

struct PostgresLedgerTransaction {
    tx: Transaction<'static, Postgres>,
    event: Event,
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl LedgerTransaction for PostgresLedgerTransaction {
    fn event(&self) -> &Event {
        &self.event
    }

    async fn find_attendee(&mut self, id: &AttendeeId) -> Result<Option<Attendee>, DomainError> {
        let sql = format!(
            "SELECT {} FROM attendees WHERE id = $1 AND event_id = $2",
            ATTENDEE_COLUMNS
        );
        let row: Option<AttendeeRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .bind(self.event.id().as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_error("fetch attendee"))?;

        row.map(Attendee::try_from).transpose()
    }

    async fn load_ledger(
        &mut self,
        participants: &[AttendeeId],
    ) -> Result<SlotLedger, DomainError> {
        let ids: Vec<Uuid> = participants.iter().map(|p| *p.as_uuid()).collect();
        let sql = format!(
            r#"
            SELECT {} FROM networking_requests
            WHERE event_id = $1
              AND (requester_id = ANY($2) OR target_id = ANY($2))
            ORDER BY created_at
            "#,
            REQUEST_COLUMNS
        );
        let rows: Vec<RequestRow> = sqlx::query_as(&sql)
            .bind(self.event.id().as_uuid())
            .bind(&ids)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(db_error("load ledger"))?;

        let requests = rows
            .into_iter()
            .map(NetworkingRequest::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SlotLedger::new(requests))
    }

    async fn find_request(
        &mut self,
        id: &RequestId,
    ) -> Result<Option<NetworkingRequest>, DomainError> {
        let sql = format!(
            "SELECT {} FROM networking_requests WHERE id = $1 AND event_id = $2",
            REQUEST_COLUMNS
        );
        let row: Option<RequestRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .bind(self.event.id().as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_error("fetch request"))?;

        row.map(NetworkingRequest::try_from).transpose()
    }

    async fn save_attendee(&mut self, attendee: &Attendee) -> Result<(), DomainError> {
        let profile = attendee.profile();
        let result = sqlx::query(
            r#"
            UPDATE attendees SET
                available_slots = $3,
                code_verified = $4,
                updated_at = $5,
                full_name = $6,
                organization = $7,
                position = $8,
                bio = $9,
                interests = $10,
                linkedin_url = $11,
                phone = $12,
                photo_url = $13
            WHERE id = $1 AND event_id = $2
            "#,
        )
        .bind(attendee.id().as_uuid())
        .bind(attendee.event_id().as_uuid())
        .bind(slots_to_strings(attendee.available_slots()))
        .bind(attendee.code_verified())
        .bind(attendee.updated_at().as_datetime())
        .bind(&profile.full_name)
        .bind(&profile.organization)
        .bind(&profile.position)
        .bind(&profile.bio)
        .bind(&profile.interests)
        .bind(&profile.linkedin_url)
        .bind(&profile.phone)
        .bind(&profile.photo_url)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("update attendee"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::AttendeeNotFound,
                format!("Attendee not found: {}", attendee.id()),
            ));
        }
        Ok(())
    }

    async fn insert_request(&mut self, request: &NetworkingRequest) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO networking_requests (
                id, event_id, requester_id, target_id, time_slot,
                message, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(request.id().as_uuid())
        .bind(request.event_id().as_uuid())
        .bind(request.requester_id().as_uuid())
        .bind(request.target_id().as_uuid())
        .bind(request.time_slot().as_str())
        .bind(request.message())
        .bind(request.status().as_str())
        .bind(request.created_at().as_datetime())
        .bind(request.updated_at().as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("insert networking request"))?;

        Ok(())
    }

    async fn update_requests(
        &mut self,
        requests: &[NetworkingRequest],
    ) -> Result<(), DomainError> {
        for request in requests {
            let result = sqlx::query(
                r#"
                UPDATE networking_requests SET
                    status = $3,
                    updated_at = $4
                WHERE id = $1 AND event_id = $2
                "#,
            )
            .bind(request.id().as_uuid())
            .bind(request.event_id().as_uuid())
            .bind(request.status().as_str())
            .bind(request.updated_at().as_datetime())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::new(
                        ErrorCode::SlotUnavailable,
                        "Attendee already has an accepted meeting at this slot",
                    )
                    .with_detail("slot", request.time_slot().as_str())
                } else {
                    db_error("update networking request")(e)
                }
            })?;

            if result.rows_affected() == 0 {
                return Err(DomainError::new(
                    ErrorCode::RequestNotFound,
                    format!("Request not found: {}", request.id()),
                ));
            }
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.tx.commit().await.map_err(db_error("commit transaction"))
    }
}
