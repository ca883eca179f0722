//! Sign-up operations.
//!
//! Each operation runs to completion inside one request: load state, apply
//! the domain rules from `allocateme-core`, persist, notify. The persisted
//! event status is the only serialization point between concurrent calls.

mod allocation;
mod events;
mod results;
mod submissions;
mod verification;

use crate::environment::AllocateEnvironment;
use crate::providers::{Notifier, RecordStore};
use allocateme_core::environment::Clock;
use allocateme_core::{Event, EventId, Result, SignupError};
use tracing::warn;

/// Entry point for every sign-up operation.
#[derive(Clone, Debug)]
pub struct SignupService<S, N, C>
where
    S: RecordStore,
    N: Notifier,
    C: Clock,
{
    env: AllocateEnvironment<S, N, C>,
}

impl<S, N, C> SignupService<S, N, C>
where
    S: RecordStore,
    N: Notifier,
    C: Clock,
{
    /// Create a service over `env`.
    #[must_use]
    pub const fn new(env: AllocateEnvironment<S, N, C>) -> Self {
        Self { env }
    }

    /// The injected environment.
    #[must_use]
    pub const fn env(&self) -> &AllocateEnvironment<S, N, C> {
        &self.env
    }

    /// Probe the record store.
    ///
    /// # Errors
    ///
    /// When the store is unreachable.
    pub async fn ping(&self) -> Result<()> {
        self.env.store.ping().await
    }

    async fn load_event(&self, event_id: EventId) -> Result<Event> {
        self.env
            .store
            .get_event(event_id)
            .await?
            .ok_or(SignupError::EventNotFound)
    }

    /// Resolve the event behind an admin credential.
    ///
    /// A missing credential is `Unauthenticated`; an unknown event and a
    /// wrong credential are indistinguishable `InvalidCredential`s.
    async fn authorize(&self, event_id: EventId, credential: Option<&str>) -> Result<Event> {
        let credential = credential.ok_or(SignupError::Unauthenticated)?;

        let Some(event) = self.env.store.get_event(event_id).await? else {
            warn!(%event_id, "admin credential presented for unknown event");
            return Err(SignupError::InvalidCredential);
        };

        if !self.env.tokens.verify(credential, &event.admin_token_digest) {
            warn!(%event_id, "rejected admin credential");
            return Err(SignupError::InvalidCredential);
        }

        Ok(event)
    }
}
