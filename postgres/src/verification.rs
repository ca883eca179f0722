//! Verification codes.

use crate::{CodeRow, PostgresStore};
use allocateme_core::{Result, SignupError, SubmissionId, VerificationCode};
use allocateme_service::providers::VerificationStore;

impl VerificationStore for PostgresStore {
    async fn replace_code(&self, code: &VerificationCode) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| SignupError::storage(format!("Failed to begin transaction: {e}")))?;

        sqlx::query("DELETE FROM verification_codes WHERE submission_id = $1")
            .bind(code.submission_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| SignupError::storage(format!("Failed to clear codes: {e}")))?;

        sqlx::query(
            "INSERT INTO verification_codes (submission_id, code, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(code.submission_id.as_uuid())
        .bind(&code.code)
        .bind(code.expires_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| SignupError::storage(format!("Failed to store code: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| SignupError::storage(format!("Failed to commit code: {e}")))?;
        Ok(())
    }

    async fn latest_code(&self, submission_id: SubmissionId) -> Result<Option<VerificationCode>> {
        let row: Option<CodeRow> = sqlx::query_as(
            r"
            SELECT submission_id, code, expires_at
            FROM verification_codes
            WHERE submission_id = $1
            ORDER BY id DESC
            LIMIT 1
            ",
        )
        .bind(submission_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SignupError::storage(format!("Failed to load code: {e}")))?;
        Ok(row.map(VerificationCode::from))
    }

    async fn delete_codes(&self, submission_id: SubmissionId) -> Result<()> {
        sqlx::query("DELETE FROM verification_codes WHERE submission_id = $1")
            .bind(submission_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| SignupError::storage(format!("Failed to delete codes: {e}")))?;
        Ok(())
    }
}
