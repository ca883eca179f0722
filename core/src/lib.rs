//! # AllocateMe Core
//!
//! Domain rules for capacity-constrained sign-ups.
//!
//! An organizer opens an event with a set of options, participants submit
//! ranked preferences, and once the event is closed every participant is
//! matched to at most one option by serial dictatorship.
//!
//! ## Components
//!
//! - [`token::TokenAuthenticator`]: admin credential issuance and checking
//! - [`join_code::JoinCodeGenerator`]: human-typable event codes
//! - [`validation`]: event creation and submission rules
//! - [`verification`]: six-digit email verification codes
//! - [`lifecycle`]: the `open → closed → allocated` state machine
//! - [`allocation`]: the matching algorithm
//! - [`results`]: grouped and flat views of a finished allocation
//! - [`notice`]: per-participant result messages
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell: nothing here performs I/O
//! - Dependency Injection via Environment ([`environment::Clock`])
//!
//! ## Example
//!
//! ```
//! use allocateme_core::allocation::serial_dictatorship;
//!
//! let outcome = serial_dictatorship(&[], &[]);
//! assert_eq!(outcome.assigned_count(), 0);
//! ```

pub mod allocation;
pub mod error;
pub mod join_code;
pub mod lifecycle;
pub mod notice;
pub mod results;
pub mod token;
pub mod types;
pub mod validation;
pub mod verification;

pub use error::{ErrorKind, Result, SignupError};
pub use types::{
    Allocation, Event, EventId, EventOption, EventStatus, OptionId, Submission, SubmissionId,
    VerificationCode,
};

/// Environment traits for dependency injection.
///
/// Everything time-dependent takes its clock from here so tests can pin or
/// advance it.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
