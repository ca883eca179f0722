//! Events and their options.

use crate::{EventRow, OptionRow, PostgresStore, is_unique_violation};
use allocateme_core::{Event, EventId, EventOption, EventStatus, Result, SignupError};
use allocateme_service::providers::EventRepository;
use uuid::Uuid;

const EVENT_COLUMNS: &str = "id, title, description, join_code, admin_token_digest, status, \
                             email_verification, created_at, expires_at";

impl EventRepository for PostgresStore {
    async fn insert_event(&self, event: &Event, options: &[EventOption]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| SignupError::storage(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO events
                (id, title, description, join_code, admin_token_digest, status,
                 email_verification, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(event.id.as_uuid())
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.join_code)
        .bind(&event.admin_token_digest)
        .bind(event.status.as_str())
        .bind(event.email_verification)
        .bind(event.created_at)
        .bind(event.expires_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return SignupError::JoinCodeTaken;
            }
            SignupError::storage(format!("Failed to insert event: {e}"))
        })?;

        let ids: Vec<Uuid> = options.iter().map(|o| *o.id.as_uuid()).collect();
        let names: Vec<&str> = options.iter().map(|o| o.name.as_str()).collect();
        let descriptions: Vec<Option<&str>> =
            options.iter().map(|o| o.description.as_deref()).collect();
        let capacities = options
            .iter()
            .map(|o| i32::try_from(o.capacity))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(SignupError::storage)?;
        let positions = options
            .iter()
            .map(|o| i32::try_from(o.sort_order))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(SignupError::storage)?;

        sqlx::query(
            r"
            INSERT INTO options (id, event_id, name, description, capacity, sort_order)
            SELECT o.id, $1, o.name, o.description, o.capacity, o.sort_order
            FROM UNNEST($2::uuid[], $3::text[], $4::text[], $5::int4[], $6::int4[])
                AS o(id, name, description, capacity, sort_order)
            ",
        )
        .bind(event.id.as_uuid())
        .bind(&ids)
        .bind(&names)
        .bind(&descriptions)
        .bind(&capacities)
        .bind(&positions)
        .execute(&mut *tx)
        .await
        .map_err(|e| SignupError::storage(format!("Failed to insert options: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| SignupError::storage(format!("Failed to commit event: {e}")))?;

        tracing::debug!(event_id = %event.id, options = options.len(), "Event stored");
        Ok(())
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>> {
        let row: Option<EventRow> =
            sqlx::query_as(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| SignupError::storage(format!("Failed to get event: {e}")))?;
        row.map(Event::try_from).transpose()
    }

    async fn find_by_join_code(&self, code: &str) -> Result<Option<Event>> {
        let row: Option<EventRow> = sqlx::query_as(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE join_code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SignupError::storage(format!("Failed to find event: {e}")))?;
        row.map(Event::try_from).transpose()
    }

    async fn list_options(&self, event_id: EventId) -> Result<Vec<EventOption>> {
        let rows: Vec<OptionRow> = sqlx::query_as(
            r"
            SELECT id, event_id, name, description, capacity, sort_order
            FROM options
            WHERE event_id = $1
            ORDER BY sort_order
            ",
        )
        .bind(event_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SignupError::storage(format!("Failed to list options: {e}")))?;
        rows.into_iter().map(EventOption::try_from).collect()
    }

    async fn update_status(
        &self,
        event_id: EventId,
        expected: EventStatus,
        next: EventStatus,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE events SET status = $3 WHERE id = $1 AND status = $2")
            .bind(event_id.as_uuid())
            .bind(expected.as_str())
            .bind(next.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| SignupError::storage(format!("Failed to update status: {e}")))?;
        Ok(result.rows_affected() == 1)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| SignupError::storage(format!("Database unreachable: {e}")))?;
        Ok(())
    }
}
