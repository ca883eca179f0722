//! Participant submissions.

use crate::{PostgresStore, SubmissionRow, is_unique_violation};
use allocateme_core::{EventId, OptionId, Result, SignupError, Submission, SubmissionId};
use allocateme_service::providers::SubmissionRepository;
use chrono::{DateTime, Utc};
use uuid::Uuid;

fn uuids(rankings: &[OptionId]) -> Vec<Uuid> {
    rankings.iter().map(|id| *id.as_uuid()).collect()
}

impl SubmissionRepository for PostgresStore {
    async fn insert_submission(&self, submission: &Submission) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO submissions (id, event_id, email, rankings, verified, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(submission.id.as_uuid())
        .bind(submission.event_id.as_uuid())
        .bind(&submission.email)
        .bind(uuids(&submission.rankings))
        .bind(submission.verified)
        .bind(submission.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return SignupError::DuplicateSubmission;
            }
            SignupError::storage(format!("Failed to insert submission: {e}"))
        })?;
        Ok(())
    }

    async fn find_submission(&self, event_id: EventId, email: &str) -> Result<Option<Submission>> {
        let row: Option<SubmissionRow> = sqlx::query_as(
            r"
            SELECT id, event_id, email, rankings, verified, submitted_at
            FROM submissions
            WHERE event_id = $1 AND email = $2
            ",
        )
        .bind(event_id.as_uuid())
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SignupError::storage(format!("Failed to find submission: {e}")))?;
        Ok(row.map(Submission::from))
    }

    async fn get_submission(&self, id: SubmissionId) -> Result<Option<Submission>> {
        let row: Option<SubmissionRow> = sqlx::query_as(
            r"
            SELECT id, event_id, email, rankings, verified, submitted_at
            FROM submissions
            WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SignupError::storage(format!("Failed to get submission: {e}")))?;
        Ok(row.map(Submission::from))
    }

    async fn update_rankings(
        &self,
        id: SubmissionId,
        rankings: &[OptionId],
        submitted_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE submissions
            SET rankings = $2, submitted_at = COALESCE($3, submitted_at)
            WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .bind(uuids(rankings))
        .bind(submitted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| SignupError::storage(format!("Failed to update rankings: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(SignupError::SubmissionNotFound);
        }
        Ok(())
    }

    async fn mark_verified(&self, id: SubmissionId) -> Result<()> {
        sqlx::query("UPDATE submissions SET verified = TRUE WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| SignupError::storage(format!("Failed to mark verified: {e}")))?;
        Ok(())
    }

    async fn list_submissions(&self, event_id: EventId) -> Result<Vec<Submission>> {
        let rows: Vec<SubmissionRow> = sqlx::query_as(
            r"
            SELECT id, event_id, email, rankings, verified, submitted_at
            FROM submissions
            WHERE event_id = $1
            ORDER BY submitted_at, seq
            ",
        )
        .bind(event_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SignupError::storage(format!("Failed to list submissions: {e}")))?;
        Ok(rows.into_iter().map(Submission::from).collect())
    }

    async fn count_submissions(&self, event_id: EventId) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM submissions WHERE event_id = $1")
            .bind(event_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| SignupError::storage(format!("Failed to count submissions: {e}")))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn delete_submission(&self, event_id: EventId, id: SubmissionId) -> Result<bool> {
        // Codes and the allocation row go with it (ON DELETE CASCADE).
        let result = sqlx::query("DELETE FROM submissions WHERE id = $1 AND event_id = $2")
            .bind(id.as_uuid())
            .bind(event_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| SignupError::storage(format!("Failed to delete submission: {e}")))?;
        Ok(result.rows_affected() > 0)
    }
}
