//! Allocation runs.
//!
//! The status flip and the row inserts share one transaction, so this store
//! never leaves rows behind without the `allocated` status.

use crate::{AllocationRow, PostgresStore};
use allocateme_core::{Allocation, EventId, EventStatus, Result, SignupError};
use allocateme_service::providers::AllocationRepository;
use uuid::Uuid;

impl AllocationRepository for PostgresStore {
    async fn commit_allocation(&self, event_id: EventId, rows: &[Allocation]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| SignupError::storage(format!("Failed to begin transaction: {e}")))?;

        let flipped = sqlx::query(
            r"
            UPDATE events SET status = 'allocated'
            WHERE id = $1
              AND status = 'closed'
              AND NOT EXISTS (SELECT 1 FROM allocations WHERE event_id = $1)
            ",
        )
        .bind(event_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|e| SignupError::storage(format!("Failed to flip status: {e}")))?
        .rows_affected();

        if flipped == 0 {
            tx.rollback()
                .await
                .map_err(|e| SignupError::storage(format!("Failed to roll back: {e}")))?;
            let status: Option<String> =
                sqlx::query_scalar("SELECT status FROM events WHERE id = $1")
                    .bind(event_id.as_uuid())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| SignupError::storage(format!("Failed to read status: {e}")))?;
            let Some(status) = status else {
                return Err(SignupError::EventNotFound);
            };
            let status: EventStatus = status.parse()?;
            return Err(SignupError::for_allocation_status(status)
                .unwrap_or(SignupError::AllocationAlreadyRun));
        }

        let submissions: Vec<Uuid> = rows.iter().map(|r| *r.submission_id.as_uuid()).collect();
        let options: Vec<Option<Uuid>> = rows
            .iter()
            .map(|r| r.option_id.map(|id| *id.as_uuid()))
            .collect();

        sqlx::query(
            r"
            INSERT INTO allocations (event_id, submission_id, option_id, position)
            SELECT $1, a.submission_id, a.option_id, a.position::int4
            FROM UNNEST($2::uuid[], $3::uuid[]) WITH ORDINALITY
                AS a(submission_id, option_id, position)
            ",
        )
        .bind(event_id.as_uuid())
        .bind(&submissions)
        .bind(&options)
        .execute(&mut *tx)
        .await
        .map_err(|e| SignupError::storage(format!("Failed to insert allocations: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| SignupError::storage(format!("Failed to commit allocation: {e}")))?;

        tracing::info!(event_id = %event_id, rows = rows.len(), "Allocation committed");
        Ok(())
    }

    async fn list_allocations(&self, event_id: EventId) -> Result<Vec<Allocation>> {
        let rows: Vec<AllocationRow> = sqlx::query_as(
            r"
            SELECT event_id, submission_id, option_id
            FROM allocations
            WHERE event_id = $1
            ORDER BY position
            ",
        )
        .bind(event_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SignupError::storage(format!("Failed to list allocations: {e}")))?;
        Ok(rows.into_iter().map(Allocation::from).collect())
    }
}
