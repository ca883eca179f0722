//! Mock record store for testing.

use crate::providers::{
    AllocationRepository, EventRepository, SubmissionRepository, VerificationStore,
};
use allocateme_core::{
    Allocation, Event, EventId, EventOption, EventStatus, OptionId, Result, SignupError,
    Submission, SubmissionId, VerificationCode,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Tables {
    events: HashMap<EventId, Event>,
    options: Vec<EventOption>,
    submissions: Vec<Submission>,
    codes: Vec<VerificationCode>,
    allocations: Vec<Allocation>,

    reject_join_codes: u32,
    fail_status_flip: bool,
    lost_status_races: u32,
    unavailable: bool,
}

/// Mock record store.
///
/// One lock guards every table, so each call is atomic the way a single
/// database transaction would be. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockRecordStore {
    tables: Arc<Mutex<Tables>>,
}

impl MockRecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report the next `n` event inserts as join code collisions.
    pub async fn reject_join_codes(&self, n: u32) {
        self.tables.lock().await.reject_join_codes = n;
    }

    /// Make every `closed → allocated` status write fail after allocation
    /// rows are written.
    pub async fn fail_status_flip(&self, fail: bool) {
        self.tables.lock().await.fail_status_flip = fail;
    }

    /// Report the next `n` status writes as lost to a concurrent writer.
    pub async fn lose_status_races(&self, n: u32) {
        self.tables.lock().await.lost_status_races = n;
    }

    /// Make [`EventRepository::ping`] fail.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.tables.lock().await.unavailable = unavailable;
    }

    /// Allocation rows of every event (for assertions).
    pub async fn all_allocations(&self) -> Vec<Allocation> {
        self.tables.lock().await.allocations.clone()
    }

    /// Outstanding codes of a submission (for assertions).
    pub async fn codes_for(&self, submission_id: SubmissionId) -> Vec<VerificationCode> {
        self.tables
            .lock()
            .await
            .codes
            .iter()
            .filter(|c| c.submission_id == submission_id)
            .cloned()
            .collect()
    }

    /// Overwrite an event's status without any checks (for test setup).
    pub async fn force_status(&self, event_id: EventId, status: EventStatus) {
        if let Some(event) = self.tables.lock().await.events.get_mut(&event_id) {
            event.status = status;
        }
    }
}

impl EventRepository for MockRecordStore {
    async fn insert_event(&self, event: &Event, options: &[EventOption]) -> Result<()> {
        let mut tables = self.tables.lock().await;

        if tables.reject_join_codes > 0 {
            tables.reject_join_codes -= 1;
            return Err(SignupError::JoinCodeTaken);
        }
        if tables.events.values().any(|e| e.join_code == event.join_code) {
            return Err(SignupError::JoinCodeTaken);
        }

        tables.events.insert(event.id, event.clone());
        tables.options.extend_from_slice(options);
        Ok(())
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>> {
        Ok(self.tables.lock().await.events.get(&id).cloned())
    }

    async fn find_by_join_code(&self, code: &str) -> Result<Option<Event>> {
        Ok(self
            .tables
            .lock()
            .await
            .events
            .values()
            .find(|e| e.join_code == code)
            .cloned())
    }

    async fn list_options(&self, event_id: EventId) -> Result<Vec<EventOption>> {
        let tables = self.tables.lock().await;
        let mut options: Vec<_> = tables
            .options
            .iter()
            .filter(|o| o.event_id == event_id)
            .cloned()
            .collect();
        options.sort_by_key(|o| o.sort_order);
        Ok(options)
    }

    async fn update_status(
        &self,
        event_id: EventId,
        expected: EventStatus,
        next: EventStatus,
    ) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        if tables.fail_status_flip && next == EventStatus::Allocated {
            return Err(SignupError::storage("status update failed"));
        }
        if tables.lost_status_races > 0 {
            tables.lost_status_races -= 1;
            return Ok(false);
        }

        match tables.events.get_mut(&event_id) {
            Some(event) if event.status == expected => {
                event.status = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn ping(&self) -> Result<()> {
        if self.tables.lock().await.unavailable {
            return Err(SignupError::storage("store unavailable"));
        }
        Ok(())
    }
}

impl SubmissionRepository for MockRecordStore {
    async fn insert_submission(&self, submission: &Submission) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let taken = tables
            .submissions
            .iter()
            .any(|s| s.event_id == submission.event_id && s.email == submission.email);
        if taken {
            return Err(SignupError::DuplicateSubmission);
        }
        tables.submissions.push(submission.clone());
        Ok(())
    }

    async fn find_submission(&self, event_id: EventId, email: &str) -> Result<Option<Submission>> {
        Ok(self
            .tables
            .lock()
            .await
            .submissions
            .iter()
            .find(|s| s.event_id == event_id && s.email == email)
            .cloned())
    }

    async fn get_submission(&self, id: SubmissionId) -> Result<Option<Submission>> {
        Ok(self
            .tables
            .lock()
            .await
            .submissions
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn update_rankings(
        &self,
        id: SubmissionId,
        rankings: &[OptionId],
        submitted_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let submission = tables
            .submissions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(SignupError::SubmissionNotFound)?;
        submission.rankings = rankings.to_vec();
        if let Some(at) = submitted_at {
            submission.submitted_at = at;
        }
        Ok(())
    }

    async fn mark_verified(&self, id: SubmissionId) -> Result<()> {
        if let Some(submission) = self
            .tables
            .lock()
            .await
            .submissions
            .iter_mut()
            .find(|s| s.id == id)
        {
            submission.verified = true;
        }
        Ok(())
    }

    async fn list_submissions(&self, event_id: EventId) -> Result<Vec<Submission>> {
        let tables = self.tables.lock().await;
        let mut submissions: Vec<_> = tables
            .submissions
            .iter()
            .filter(|s| s.event_id == event_id)
            .cloned()
            .collect();
        submissions.sort_by_key(|s| s.submitted_at);
        Ok(submissions)
    }

    async fn count_submissions(&self, event_id: EventId) -> Result<u64> {
        let tables = self.tables.lock().await;
        Ok(tables
            .submissions
            .iter()
            .filter(|s| s.event_id == event_id)
            .count() as u64)
    }

    async fn delete_submission(&self, event_id: EventId, id: SubmissionId) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.submissions.len();
        tables
            .submissions
            .retain(|s| !(s.id == id && s.event_id == event_id));
        if tables.submissions.len() == before {
            return Ok(false);
        }
        tables.codes.retain(|c| c.submission_id != id);
        tables.allocations.retain(|a| a.submission_id != id);
        Ok(true)
    }
}

impl VerificationStore for MockRecordStore {
    async fn replace_code(&self, code: &VerificationCode) -> Result<()> {
        let mut tables = self.tables.lock().await;
        tables.codes.retain(|c| c.submission_id != code.submission_id);
        tables.codes.push(code.clone());
        Ok(())
    }

    async fn latest_code(&self, submission_id: SubmissionId) -> Result<Option<VerificationCode>> {
        Ok(self
            .tables
            .lock()
            .await
            .codes
            .iter()
            .rev()
            .find(|c| c.submission_id == submission_id)
            .cloned())
    }

    async fn delete_codes(&self, submission_id: SubmissionId) -> Result<()> {
        self.tables
            .lock()
            .await
            .codes
            .retain(|c| c.submission_id != submission_id);
        Ok(())
    }
}

impl AllocationRepository for MockRecordStore {
    async fn commit_allocation(&self, event_id: EventId, rows: &[Allocation]) -> Result<()> {
        let mut tables = self.tables.lock().await;

        let status = tables
            .events
            .get(&event_id)
            .map(|e| e.status)
            .ok_or(SignupError::EventNotFound)?;
        if let Some(err) = SignupError::for_allocation_status(status) {
            return Err(err);
        }
        if tables.allocations.iter().any(|a| a.event_id == event_id) {
            return Err(SignupError::AllocationAlreadyRun);
        }

        tables.allocations.extend_from_slice(rows);

        if tables.fail_status_flip {
            return Err(SignupError::AllocationStatusPending {
                written: rows.len(),
            });
        }
        if let Some(event) = tables.events.get_mut(&event_id) {
            event.status = EventStatus::Allocated;
        }
        Ok(())
    }

    async fn list_allocations(&self, event_id: EventId) -> Result<Vec<Allocation>> {
        Ok(self
            .tables
            .lock()
            .await
            .allocations
            .iter()
            .filter(|a| a.event_id == event_id)
            .copied()
            .collect())
    }
}
