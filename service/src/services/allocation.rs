//! Allocation runs.

use super::SignupService;
use crate::providers::{Notifier, RecordStore};
use crate::views::{AllocationSummary, NotificationTally};
use allocateme_core::allocation::serial_dictatorship;
use allocateme_core::environment::Clock;
use allocateme_core::notice::AllocationNotice;
use allocateme_core::{
    Allocation, Event, EventId, EventOption, EventStatus, Result, SignupError, Submission,
    lifecycle,
};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{error, info, warn};

/// Allocation notices in flight at once.
const NOTICE_CONCURRENCY: usize = 8;

impl<S, N, C> SignupService<S, N, C>
where
    S: RecordStore,
    N: Notifier,
    C: Clock,
{
    /// Run serial dictatorship over a closed event and commit the result.
    ///
    /// If an earlier run wrote its rows but could not finalize the status,
    /// the existing rows are kept and only the status is finalized. Each
    /// participant is notified afterwards; delivery failures are tallied,
    /// never fatal.
    ///
    /// # Errors
    ///
    /// - [`SignupError::AllocationRequiresClosed`] while open
    /// - [`SignupError::AllocationAlreadyRun`] once allocated, including when
    ///   a concurrent run won
    /// - [`SignupError::NoOptions`], [`SignupError::NoSubmissions`]
    /// - [`SignupError::AllocationStatusPending`] when rows were written but
    ///   the status could not be advanced
    #[tracing::instrument(skip(self, credential))]
    pub async fn allocate(
        &self,
        event_id: EventId,
        credential: Option<&str>,
    ) -> Result<AllocationSummary> {
        let event = self.authorize(event_id, credential).await?;
        lifecycle::ensure_allocatable(event.status)?;

        let options = self.env.store.list_options(event_id).await?;
        let submissions = self.env.store.list_submissions(event_id).await?;
        let existing = self.env.store.list_allocations(event_id).await?;

        let result = if existing.is_empty() {
            self.compute_and_commit(event_id, &options, &submissions).await
        } else {
            self.finalize_pending(event_id, existing).await
        };

        let rows = match result {
            Ok(rows) => rows,
            Err(e) => {
                let outcome = match &e {
                    SignupError::AllocationStatusPending { .. } => "status_pending",
                    SignupError::AllocationAlreadyRun => "already_run",
                    _ => "rejected",
                };
                metrics::counter!("allocateme_allocations_total", "outcome" => outcome)
                    .increment(1);
                return Err(e);
            }
        };

        let assigned = rows.iter().filter(|r| r.option_id.is_some()).count();
        let unassigned = rows.len() - assigned;
        metrics::counter!("allocateme_allocations_total", "outcome" => "committed").increment(1);
        metrics::counter!("allocateme_assignments_total", "assigned" => "true")
            .increment(assigned as u64);
        metrics::counter!("allocateme_assignments_total", "assigned" => "false")
            .increment(unassigned as u64);
        info!(%event_id, assigned, unassigned, "allocation committed");

        let notifications = self.notify_results(&event, &options, &submissions, &rows).await;

        Ok(AllocationSummary {
            assigned,
            unassigned,
            total: rows.len(),
            notifications,
        })
    }

    async fn compute_and_commit(
        &self,
        event_id: EventId,
        options: &[EventOption],
        submissions: &[Submission],
    ) -> Result<Vec<Allocation>> {
        if options.is_empty() {
            return Err(SignupError::NoOptions);
        }
        if submissions.is_empty() {
            return Err(SignupError::NoSubmissions);
        }

        let rows = serial_dictatorship(options, submissions).to_records(event_id);

        match self.env.store.commit_allocation(event_id, &rows).await {
            Ok(()) => Ok(rows),
            Err(e @ SignupError::AllocationStatusPending { written }) => {
                error!(%event_id, written, "allocation rows saved but event status not updated");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Advance a `closed` event whose rows already exist.
    async fn finalize_pending(
        &self,
        event_id: EventId,
        rows: Vec<Allocation>,
    ) -> Result<Vec<Allocation>> {
        warn!(%event_id, rows = rows.len(), "finalizing previously saved allocation");

        match self
            .env
            .store
            .update_status(event_id, EventStatus::Closed, EventStatus::Allocated)
            .await
        {
            Ok(true) => Ok(rows),
            Ok(false) => {
                let current = self.load_event(event_id).await?;
                lifecycle::ensure_allocatable(current.status)?;
                Err(SignupError::AllocationAlreadyRun)
            }
            Err(e) => {
                error!(%event_id, error = %e, "allocation still pending finalization");
                Err(SignupError::AllocationStatusPending {
                    written: rows.len(),
                })
            }
        }
    }

    async fn notify_results(
        &self,
        event: &Event,
        options: &[EventOption],
        submissions: &[Submission],
        rows: &[Allocation],
    ) -> NotificationTally {
        let emails: HashMap<_, _> = submissions.iter().map(|s| (s.id, s.email.clone())).collect();
        let notices = AllocationNotice::for_allocations(&event.title, options, rows, &emails);

        let delivered: Vec<bool> = stream::iter(notices)
            .map(|notice| async move {
                let result = self
                    .env
                    .notifier
                    .send_allocation_result(&notice.to, &event.title, notice.option_name.as_deref())
                    .await;
                if let Err(e) = &result {
                    warn!(event_id = %event.id, error = %e, "allocation notice delivery failed");
                }
                result.is_ok()
            })
            .buffer_unordered(NOTICE_CONCURRENCY)
            .collect()
            .await;

        let sent = delivered.iter().filter(|ok| **ok).count();
        NotificationTally {
            sent,
            failed: delivered.len() - sent,
        }
    }
}
