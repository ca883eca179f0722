//! Application state for Axum handlers.

use allocateme_core::environment::Clock;
use allocateme_service::{Notifier, RecordStore, SignupService};
use std::sync::Arc;

/// Shared handle on the sign-up service.
///
/// Cloned into every request; the service itself is shared.
pub struct AppState<S, N, C>
where
    S: RecordStore,
    N: Notifier,
    C: Clock,
{
    service: Arc<SignupService<S, N, C>>,
}

impl<S, N, C> AppState<S, N, C>
where
    S: RecordStore,
    N: Notifier,
    C: Clock,
{
    /// Wrap a service.
    #[must_use]
    pub fn new(service: SignupService<S, N, C>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// The wrapped service.
    #[must_use]
    pub fn service(&self) -> &SignupService<S, N, C> {
        &self.service
    }
}

impl<S, N, C> Clone for AppState<S, N, C>
where
    S: RecordStore,
    N: Notifier,
    C: Clock,
{
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}
