//! Ranking submissions and their admin management.

use super::SignupService;
use crate::providers::{Notifier, RecordStore};
use crate::views::SubmissionReceipt;
use allocateme_core::environment::Clock;
use allocateme_core::lifecycle;
use allocateme_core::validation::{self, SubmissionDraft};
use allocateme_core::{EventId, OptionId, Result, SignupError, Submission, SubmissionId};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

impl<S, N, C> SignupService<S, N, C>
where
    S: RecordStore,
    N: Notifier,
    C: Clock,
{
    /// Record a participant's ranking.
    ///
    /// Without verification, the first submission per email is inserted and
    /// any later one is a conflict. With verification, the email must already
    /// be verified and the call replaces that record's ranking. The priority
    /// timestamp is set on the first non-empty ranking and kept afterwards.
    ///
    /// # Errors
    ///
    /// - validation errors for the email or ranking
    /// - [`SignupError::EventNotFound`], [`SignupError::NotAcceptingSubmissions`]
    /// - [`SignupError::DuplicateSubmission`] (verification off)
    /// - [`SignupError::VerificationRequired`] (verification on, email not verified)
    #[tracing::instrument(skip(self, draft))]
    pub async fn submit(
        &self,
        event_id: EventId,
        draft: SubmissionDraft,
    ) -> Result<SubmissionReceipt> {
        let email = validation::validate_email(draft.email.as_deref().unwrap_or_default())?;
        let raw_rankings = draft.rankings.unwrap_or_default();
        if raw_rankings.is_empty() {
            return Err(SignupError::EmptyRankings);
        }

        let event = self.load_event(event_id).await?;
        lifecycle::ensure_accepting(event.status)?;

        let options = self.env.store.list_options(event_id).await?;
        let rankings = validation::validate_rankings(&raw_rankings, &options)?;
        let now = self.env.clock.now();

        let result = if event.email_verification {
            self.update_verified(event_id, &email, rankings, now).await
        } else {
            let submission = Submission {
                id: SubmissionId::new(),
                event_id,
                email,
                rankings,
                verified: true,
                submitted_at: now,
            };
            self.env
                .store
                .insert_submission(&submission)
                .await
                .map(|()| SubmissionReceipt {
                    id: submission.id,
                    email: submission.email,
                    verified: submission.verified,
                    submitted_at: submission.submitted_at,
                    created: true,
                })
        };

        let outcome = match &result {
            Ok(receipt) if receipt.created => "created",
            Ok(_) => "updated",
            Err(SignupError::DuplicateSubmission) => "duplicate",
            Err(SignupError::VerificationRequired) => "unverified",
            Err(_) => "error",
        };
        metrics::counter!("allocateme_submissions_total", "outcome" => outcome).increment(1);

        if let Ok(receipt) = &result {
            info!(%event_id, submission_id = %receipt.id, outcome, "submission recorded");
        }
        result
    }

    async fn update_verified(
        &self,
        event_id: EventId,
        email: &str,
        rankings: Vec<OptionId>,
        now: DateTime<Utc>,
    ) -> Result<SubmissionReceipt> {
        let existing = self
            .env
            .store
            .find_submission(event_id, email)
            .await?
            .filter(|s| s.verified)
            .ok_or(SignupError::VerificationRequired)?;

        let submitted_at = existing.rankings.is_empty().then_some(now);
        self.env
            .store
            .update_rankings(existing.id, &rankings, submitted_at)
            .await?;
        debug!(submission_id = %existing.id, restamped = submitted_at.is_some(), "ranking updated");

        Ok(SubmissionReceipt {
            id: existing.id,
            email: existing.email,
            verified: true,
            submitted_at: submitted_at.unwrap_or(existing.submitted_at),
            created: false,
        })
    }

    /// All submissions of an event in priority order.
    ///
    /// # Errors
    ///
    /// Authorization failures or storage failures.
    #[tracing::instrument(skip(self, credential))]
    pub async fn list_submissions(
        &self,
        event_id: EventId,
        credential: Option<&str>,
    ) -> Result<Vec<Submission>> {
        self.authorize(event_id, credential).await?;
        self.env.store.list_submissions(event_id).await
    }

    /// Remove a submission with its codes and allocation row.
    ///
    /// # Errors
    ///
    /// [`SignupError::SubmissionNotFound`] when the submission does not exist
    /// or belongs to another event.
    #[tracing::instrument(skip(self, credential))]
    pub async fn delete_submission(
        &self,
        event_id: EventId,
        credential: Option<&str>,
        submission_id: SubmissionId,
    ) -> Result<()> {
        self.authorize(event_id, credential).await?;

        if !self
            .env
            .store
            .delete_submission(event_id, submission_id)
            .await?
        {
            return Err(SignupError::SubmissionNotFound);
        }

        info!(%event_id, %submission_id, "submission deleted");
        Ok(())
    }
}
