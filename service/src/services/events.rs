//! Event creation, lookup and admin status changes.

use super::SignupService;
use crate::providers::{Notifier, RecordStore};
use crate::views::{AdminEvent, CreatedEvent, OptionSummary, PublicEvent};
use allocateme_core::environment::Clock;
use allocateme_core::lifecycle::{self, Transition};
use allocateme_core::validation::EventDraft;
use allocateme_core::{
    Event, EventId, EventOption, EventStatus, OptionId, Result, SignupError,
};
use tracing::{info, warn};

impl<S, N, C> SignupService<S, N, C>
where
    S: RecordStore,
    N: Notifier,
    C: Clock,
{
    /// Create an event with its options.
    ///
    /// The admin credential is returned in plaintext exactly once; only its
    /// digest is stored. Join code collisions are retried with a fresh code.
    ///
    /// # Errors
    ///
    /// Validation errors from [`EventDraft::validate`],
    /// [`SignupError::JoinCodeTaken`] when every attempt collided, or storage
    /// failures.
    #[tracing::instrument(skip(self, draft))]
    pub async fn create_event(&self, draft: EventDraft) -> Result<CreatedEvent> {
        let new_event = draft.validate()?;
        let now = self.env.clock.now();
        let issued = self.env.tokens.issue();

        let mut event = Event {
            id: EventId::new(),
            title: new_event.title,
            description: new_event.description,
            join_code: String::new(),
            admin_token_digest: issued.digest,
            status: EventStatus::Open,
            email_verification: new_event.email_verification,
            created_at: now,
            expires_at: now + self.env.config.event_ttl(),
        };
        let options: Vec<EventOption> = new_event
            .options
            .into_iter()
            .zip(0u32..)
            .map(|(option, sort_order)| EventOption {
                id: OptionId::new(),
                event_id: event.id,
                name: option.name,
                description: option.description,
                capacity: option.capacity,
                sort_order,
            })
            .collect();

        let attempts = self.env.config.join_code_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            event.join_code = self.env.join_codes.generate();
            match self.env.store.insert_event(&event, &options).await {
                Ok(()) => break,
                Err(SignupError::JoinCodeTaken) if attempt < attempts => {
                    warn!(attempt, "join code collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        metrics::counter!("allocateme_events_created_total").increment(1);
        info!(
            event_id = %event.id,
            join_code = %event.join_code,
            options = options.len(),
            email_verification = event.email_verification,
            "event created"
        );

        Ok(CreatedEvent {
            admin_url: self.env.config.admin_url(event.id, &issued.plaintext),
            id: event.id,
            join_code: event.join_code,
            admin_token: issued.plaintext,
        })
    }

    /// Public view of the event behind a join code.
    ///
    /// The code is matched case-insensitively.
    ///
    /// # Errors
    ///
    /// [`SignupError::EventNotFound`] or storage failures.
    #[tracing::instrument(skip(self))]
    pub async fn public_event(&self, join_code: &str) -> Result<PublicEvent> {
        let code = join_code.trim().to_ascii_uppercase();
        let event = self
            .env
            .store
            .find_by_join_code(&code)
            .await?
            .ok_or(SignupError::EventNotFound)?;
        let options = self.env.store.list_options(event.id).await?;

        Ok(PublicEvent {
            id: event.id,
            title: event.title,
            description: event.description,
            status: event.status,
            email_verification: event.email_verification,
            created_at: event.created_at,
            options: options.into_iter().map(OptionSummary::from).collect(),
        })
    }

    /// Admin view with options and submission count.
    ///
    /// # Errors
    ///
    /// Authorization failures or storage failures.
    #[tracing::instrument(skip(self, credential))]
    pub async fn admin_event(
        &self,
        event_id: EventId,
        credential: Option<&str>,
    ) -> Result<AdminEvent> {
        let event = self.authorize(event_id, credential).await?;
        let options = self.env.store.list_options(event_id).await?;
        let submission_count = self.env.store.count_submissions(event_id).await?;

        Ok(AdminEvent {
            event,
            options: options.into_iter().map(OptionSummary::from).collect(),
            submission_count,
        })
    }

    /// Close or reopen an event.
    ///
    /// `requested` is the raw status string from the caller.
    ///
    /// # Errors
    ///
    /// - [`SignupError::InvalidStatus`] unless `requested` is `open` or `closed`
    /// - [`SignupError::TerminalState`] once allocated
    /// - [`SignupError::AllocationPending`] when reopening an event whose
    ///   allocation rows are written but not finalized
    /// - [`SignupError::StatusConflict`] when another request moved the
    ///   status first
    #[tracing::instrument(skip(self, credential))]
    pub async fn update_status(
        &self,
        event_id: EventId,
        credential: Option<&str>,
        requested: Option<&str>,
    ) -> Result<Event> {
        let mut event = self.authorize(event_id, credential).await?;

        let transition = lifecycle::admin_transition(requested.unwrap_or_default().parse()?)?;
        let next = lifecycle::apply(event.status, transition)?;

        if transition == Transition::Reopen
            && !self.env.store.list_allocations(event_id).await?.is_empty()
        {
            return Err(SignupError::AllocationPending);
        }

        if next != event.status {
            let swapped = self
                .env
                .store
                .update_status(event_id, event.status, next)
                .await?;
            if !swapped {
                let current = self.load_event(event_id).await?;
                if current.status != next {
                    lifecycle::apply(current.status, transition)?;
                    return Err(SignupError::StatusConflict);
                }
            }
            info!(%event_id, from = %event.status, to = %next, "event status changed");
            event.status = next;
        }

        Ok(event)
    }
}
