//! PostgreSQL implementation of DirectoryReader.
//!
//! Plain pool reads outside any ledger transaction.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::attendee::Attendee;
use crate::domain::event::Event;
use crate::domain::foundation::{AttendeeId, DomainError, EventId};
use crate::domain::networking::NetworkingRequest;
use crate::ports::DirectoryReader;

use super::rows::{
    db_error, AttendeeRow, EventRow, RequestRow, ATTENDEE_COLUMNS, EVENT_COLUMNS,
    REQUEST_COLUMNS,
};

#[derive(Clone)]
pub struct PostgresDirectoryReader {
    pool: PgPool,
}

impl PostgresDirectoryReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryReader for PostgresDirectoryReader {
    async fn find_event(&self, id: &EventId) -> Result<Option<Event>, DomainError> {
        let sql = format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS);
        let row: Option<EventRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("fetch event"))?;

        row.map(Event::try_from).transpose()
    }

    async fn find_attendee(
        &self,
        event_id: &EventId,
        id: &AttendeeId,
    ) -> Result<Option<Attendee>, DomainError> {
        let sql = format!(
            "SELECT {} FROM attendees WHERE id = $1 AND event_id = $2",
            ATTENDEE_COLUMNS
        );
        let row: Option<AttendeeRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .bind(event_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("fetch attendee"))?;

        row.map(Attendee::try_from).transpose()
    }

    async fn list_attendees(&self, event_id: &EventId) -> Result<Vec<Attendee>, DomainError> {
        let sql = format!(
            "SELECT {} FROM attendees WHERE event_id = $1 ORDER BY full_name, id",
            ATTENDEE_COLUMNS
        );
        let rows: Vec<AttendeeRow> = sqlx::query_as(&sql)
            .bind(event_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list attendees"))?;

        rows.into_iter().map(Attendee::try_from).collect()
    }

    async fn list_requests(
        &self,
        event_id: &EventId,
    ) -> Result<Vec<NetworkingRequest>, DomainError> {
        let sql = format!(
            "SELECT {} FROM networking_requests WHERE event_id = $1 ORDER BY created_at",
            REQUEST_COLUMNS
        );
        let rows: Vec<RequestRow> = sqlx::query_as(&sql)
            .bind(event_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list networking requests"))?;

        rows.into_iter().map(NetworkingRequest::try_from).collect()
    }
}
