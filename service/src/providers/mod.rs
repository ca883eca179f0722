//! Provider traits for everything outside the domain core.
//!
//! Operations depend on these interfaces; the server wires in PostgreSQL and
//! SMTP, tests wire in the in-memory mocks.
//!
//! ```text
//!   SignupService ──▶ RecordStore ─┬─ EventRepository
//!        │                         ├─ SubmissionRepository
//!        │                         ├─ VerificationStore
//!        │                         └─ AllocationRepository
//!        └──────────▶ Notifier (console / SMTP)
//! ```
//!
//! Uniqueness rules (join code, one email per event, one allocation row per
//! submission) live in the store, not in check-then-insert logic here.

use allocateme_core::{
    Allocation, Event, EventId, EventOption, EventStatus, OptionId, Result, Submission,
    SubmissionId, VerificationCode,
};
use chrono::{DateTime, Utc};
use std::future::Future;

pub mod console_notifier;
pub mod smtp_notifier;

pub use console_notifier::ConsoleNotifier;
pub use smtp_notifier::SmtpNotifier;

/// Events and their options.
pub trait EventRepository: Send + Sync {
    /// Persist a new event together with its options.
    ///
    /// # Errors
    ///
    /// [`SignupError::JoinCodeTaken`](allocateme_core::SignupError::JoinCodeTaken)
    /// when the join code collides; nothing is written in that case.
    fn insert_event(
        &self,
        event: &Event,
        options: &[EventOption],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Load an event by id.
    ///
    /// # Errors
    ///
    /// Storage failures only; a missing event is `Ok(None)`.
    fn get_event(&self, id: EventId) -> impl Future<Output = Result<Option<Event>>> + Send;

    /// Load an event by its join code.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    fn find_by_join_code(&self, code: &str)
    -> impl Future<Output = Result<Option<Event>>> + Send;

    /// Options of an event ordered by sort position.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    fn list_options(&self, event_id: EventId)
    -> impl Future<Output = Result<Vec<EventOption>>> + Send;

    /// Compare-and-set the event status.
    ///
    /// Returns `false` without writing when the stored status is not
    /// `expected`.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    fn update_status(
        &self,
        event_id: EventId,
        expected: EventStatus,
        next: EventStatus,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Cheap liveness probe.
    ///
    /// # Errors
    ///
    /// When the store is unreachable.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;
}

/// Participant submissions.
pub trait SubmissionRepository: Send + Sync {
    /// Insert a submission.
    ///
    /// # Errors
    ///
    /// [`SignupError::DuplicateSubmission`](allocateme_core::SignupError::DuplicateSubmission)
    /// when the event already has a submission for the email.
    fn insert_submission(&self, submission: &Submission)
    -> impl Future<Output = Result<()>> + Send;

    /// Submission for `email` (already normalized) within an event.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    fn find_submission(
        &self,
        event_id: EventId,
        email: &str,
    ) -> impl Future<Output = Result<Option<Submission>>> + Send;

    /// Submission by id.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    fn get_submission(
        &self,
        id: SubmissionId,
    ) -> impl Future<Output = Result<Option<Submission>>> + Send;

    /// Replace the ranking, optionally restamping `submitted_at`.
    ///
    /// # Errors
    ///
    /// [`SignupError::SubmissionNotFound`](allocateme_core::SignupError::SubmissionNotFound)
    /// when the row is gone.
    fn update_rankings(
        &self,
        id: SubmissionId,
        rankings: &[OptionId],
        submitted_at: Option<DateTime<Utc>>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Set the verified flag.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    fn mark_verified(&self, id: SubmissionId) -> impl Future<Output = Result<()>> + Send;

    /// All submissions of an event ordered by `submitted_at`.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    fn list_submissions(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Vec<Submission>>> + Send;

    /// Number of submissions of an event.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    fn count_submissions(&self, event_id: EventId) -> impl Future<Output = Result<u64>> + Send;

    /// Delete a submission scoped to its event, together with its codes and
    /// allocation row. Returns `false` when nothing matched.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    fn delete_submission(
        &self,
        event_id: EventId,
        id: SubmissionId,
    ) -> impl Future<Output = Result<bool>> + Send;
}

/// Outstanding verification codes.
pub trait VerificationStore: Send + Sync {
    /// Drop every code of the submission and store `code` as the only one.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    fn replace_code(&self, code: &VerificationCode) -> impl Future<Output = Result<()>> + Send;

    /// Most recently issued code.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    fn latest_code(
        &self,
        submission_id: SubmissionId,
    ) -> impl Future<Output = Result<Option<VerificationCode>>> + Send;

    /// Drop every code of the submission.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    fn delete_codes(&self, submission_id: SubmissionId)
    -> impl Future<Output = Result<()>> + Send;
}

/// Allocation records.
pub trait AllocationRepository: Send + Sync {
    /// Persist one allocation run and move the event `closed → allocated`.
    ///
    /// The status compare-and-set is the linearization point: of two racing
    /// commits at most one succeeds, the other writes nothing.
    ///
    /// # Errors
    ///
    /// - [`SignupError::AllocationAlreadyRun`](allocateme_core::SignupError::AllocationAlreadyRun)
    ///   or [`SignupError::AllocationRequiresClosed`](allocateme_core::SignupError::AllocationRequiresClosed)
    ///   when the event is no longer `closed` or rows already exist; nothing written
    /// - [`SignupError::AllocationStatusPending`](allocateme_core::SignupError::AllocationStatusPending)
    ///   when rows were persisted but the status update failed
    /// - [`SignupError::Storage`](allocateme_core::SignupError::Storage) when nothing was written
    fn commit_allocation(
        &self,
        event_id: EventId,
        rows: &[Allocation],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Allocation rows of an event in the order they were written.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    fn list_allocations(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Vec<Allocation>>> + Send;
}

/// Everything the sign-up operations need from storage.
pub trait RecordStore:
    EventRepository + SubmissionRepository + VerificationStore + AllocationRepository
{
}

impl<T> RecordStore for T where
    T: EventRepository + SubmissionRepository + VerificationStore + AllocationRepository
{
}

/// Out-of-band delivery of codes and results.
///
/// Delivery is best effort: operations log and count failures but never
/// fail because of them.
pub trait Notifier: Send + Sync {
    /// Deliver a verification code.
    ///
    /// # Errors
    ///
    /// When the message cannot be built or handed off.
    fn send_verification_code(
        &self,
        to: &str,
        event_title: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Deliver an allocation result. `option_name` is `None` for an
    /// unassigned participant.
    ///
    /// # Errors
    ///
    /// When the message cannot be built or handed off.
    fn send_allocation_result(
        &self,
        to: &str,
        event_title: &str,
        option_name: Option<&str>,
    ) -> impl Future<Output = Result<()>> + Send;
}
