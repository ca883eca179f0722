//! Read-side views of an allocated event.

use super::SignupService;
use crate::providers::{Notifier, RecordStore};
use crate::views::EventResults;
use allocateme_core::environment::Clock;
use allocateme_core::notice::AllocationNotice;
use allocateme_core::results::ResultsView;
use allocateme_core::{Event, EventId, Result, SubmissionId, lifecycle};
use std::collections::HashMap;

impl<S, N, C> SignupService<S, N, C>
where
    S: RecordStore,
    N: Notifier,
    C: Clock,
{
    async fn allocated_event(&self, event_id: EventId, credential: Option<&str>) -> Result<Event> {
        let event = self.authorize(event_id, credential).await?;
        lifecycle::ensure_allocated(event.status)?;
        Ok(event)
    }

    /// Participants grouped per option.
    ///
    /// # Errors
    ///
    /// Authorization failures,
    /// [`SignupError::AllocationNotRun`](allocateme_core::SignupError::AllocationNotRun)
    /// before allocation, or storage failures.
    #[tracing::instrument(skip(self, credential))]
    pub async fn results(&self, event_id: EventId, credential: Option<&str>) -> Result<EventResults> {
        let event = self.allocated_event(event_id, credential).await?;

        let options = self.env.store.list_options(event_id).await?;
        let rows = self.env.store.list_allocations(event_id).await?;
        let emails = self.emails_by_submission(event_id).await?;

        Ok(EventResults {
            view: ResultsView::project(&options, &rows, &emails),
            event,
        })
    }

    /// Rendered result notice per participant.
    ///
    /// # Errors
    ///
    /// As [`results`](Self::results).
    #[tracing::instrument(skip(self, credential))]
    pub async fn notices(
        &self,
        event_id: EventId,
        credential: Option<&str>,
    ) -> Result<Vec<AllocationNotice>> {
        let event = self.allocated_event(event_id, credential).await?;

        let options = self.env.store.list_options(event_id).await?;
        let rows = self.env.store.list_allocations(event_id).await?;
        let emails = self.emails_by_submission(event_id).await?;

        Ok(AllocationNotice::for_allocations(
            &event.title,
            &options,
            &rows,
            &emails,
        ))
    }

    async fn emails_by_submission(
        &self,
        event_id: EventId,
    ) -> Result<HashMap<SubmissionId, String>> {
        Ok(self
            .env
            .store
            .list_submissions(event_id)
            .await?
            .into_iter()
            .map(|s| (s.id, s.email))
            .collect())
    }
}
