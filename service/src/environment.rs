//! Sign-up environment.
//!
//! Bundles every external dependency an operation may touch so operations
//! can be tested against in-memory doubles.

use crate::config::SignupConfig;
use crate::providers::{Notifier, RecordStore};
use allocateme_core::environment::Clock;
use allocateme_core::join_code::JoinCodeGenerator;
use allocateme_core::token::TokenAuthenticator;

/// Sign-up environment.
///
/// # Type Parameters
///
/// - `S`: record store
/// - `N`: notifier
/// - `C`: clock
#[derive(Clone, Debug)]
pub struct AllocateEnvironment<S, N, C>
where
    S: RecordStore,
    N: Notifier,
    C: Clock,
{
    /// Record store (`PostgreSQL` in production).
    pub store: S,

    /// Code and result delivery.
    pub notifier: N,

    /// Time source.
    pub clock: C,

    /// Admin credential issuance.
    pub tokens: TokenAuthenticator,

    /// Join code source.
    pub join_codes: JoinCodeGenerator,

    /// Tunables.
    pub config: SignupConfig,
}

impl<S, N, C> AllocateEnvironment<S, N, C>
where
    S: RecordStore,
    N: Notifier,
    C: Clock,
{
    /// Create a new environment.
    #[must_use]
    pub const fn new(store: S, notifier: N, clock: C, config: SignupConfig) -> Self {
        Self {
            store,
            notifier,
            clock,
            tokens: TokenAuthenticator::new(),
            join_codes: JoinCodeGenerator::new(),
            config,
        }
    }
}
