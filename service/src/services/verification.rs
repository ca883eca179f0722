//! Email verification: `none → code_issued → verified` per (event, email).

use super::SignupService;
use crate::providers::{Notifier, RecordStore};
use crate::views::{CodeConfirmed, CodeRequested};
use allocateme_core::environment::Clock;
use allocateme_core::validation;
use allocateme_core::verification::{check_code, issue_code};
use allocateme_core::{Event, EventId, Result, SignupError, Submission, SubmissionId, lifecycle};
use tracing::{info, warn};

impl<S, N, C> SignupService<S, N, C>
where
    S: RecordStore,
    N: Notifier,
    C: Clock,
{
    async fn verification_event(&self, event_id: EventId) -> Result<Event> {
        let event = self.load_event(event_id).await?;
        lifecycle::ensure_accepting(event.status)?;
        if !event.email_verification {
            return Err(SignupError::VerificationDisabled);
        }
        Ok(event)
    }

    /// Issue a code for `email` and hand it to the notifier.
    ///
    /// Creates an unverified placeholder submission on first request and
    /// reuses it afterwards; every request supersedes earlier codes. The
    /// code never appears in the response.
    ///
    /// # Errors
    ///
    /// - [`SignupError::EventNotFound`], [`SignupError::NotAcceptingSubmissions`],
    ///   [`SignupError::VerificationDisabled`]
    /// - [`SignupError::InvalidEmail`]
    /// - [`SignupError::AlreadyVerified`] once the email is verified
    #[tracing::instrument(skip(self, email))]
    pub async fn request_code(&self, event_id: EventId, email: &str) -> Result<CodeRequested> {
        let event = self.verification_event(event_id).await?;
        let email = validation::validate_email(email)?;
        let now = self.env.clock.now();

        let submission_id = match self.env.store.find_submission(event_id, &email).await? {
            Some(existing) if existing.verified => return Err(SignupError::AlreadyVerified),
            Some(existing) => existing.id,
            None => {
                let placeholder = Submission {
                    id: SubmissionId::new(),
                    event_id,
                    email: email.clone(),
                    rankings: Vec::new(),
                    verified: false,
                    submitted_at: now,
                };
                self.env.store.insert_submission(&placeholder).await?;
                placeholder.id
            }
        };

        let code = issue_code(submission_id, now, self.env.config.code_ttl());
        self.env.store.replace_code(&code).await?;
        metrics::counter!("allocateme_verification_codes_issued_total").increment(1);

        if let Err(e) = self
            .env
            .notifier
            .send_verification_code(&email, &event.title, &code.code, code.expires_at)
            .await
        {
            warn!(%event_id, %submission_id, error = %e, "verification code delivery failed");
        }

        info!(%event_id, %submission_id, "verification code issued");
        Ok(CodeRequested { submission_id })
    }

    /// Confirm the most recently issued code.
    ///
    /// A wrong code leaves the outstanding code in place; a correct one is
    /// consumed.
    ///
    /// # Errors
    ///
    /// - [`SignupError::CodeNotFound`] when no code is outstanding for a
    ///   submission of this event
    /// - [`SignupError::CodeExpired`], [`SignupError::CodeIncorrect`]
    #[tracing::instrument(skip(self, code))]
    pub async fn confirm_code(
        &self,
        event_id: EventId,
        submission_id: SubmissionId,
        code: &str,
    ) -> Result<CodeConfirmed> {
        self.verification_event(event_id).await?;

        let belongs = self
            .env
            .store
            .get_submission(submission_id)
            .await?
            .is_some_and(|s| s.event_id == event_id);
        let latest = if belongs {
            self.env.store.latest_code(submission_id).await?
        } else {
            None
        };

        let checked = check_code(latest.as_ref(), code, self.env.clock.now());
        let outcome = match &checked {
            Ok(()) => "verified",
            Err(SignupError::CodeNotFound) => "not_found",
            Err(SignupError::CodeExpired) => "expired",
            Err(_) => "incorrect",
        };
        metrics::counter!("allocateme_verification_confirmations_total", "outcome" => outcome)
            .increment(1);
        checked?;

        self.env.store.mark_verified(submission_id).await?;
        self.env.store.delete_codes(submission_id).await?;

        info!(%event_id, %submission_id, "email verified");
        Ok(CodeConfirmed { verified: true })
    }
}
