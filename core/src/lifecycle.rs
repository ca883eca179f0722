//! Event status state machine.
//!
//! ```text
//!            close               allocation run
//!   ┌──────┐ ─────▶ ┌────────┐ ───────────────▶ ┌───────────┐
//!   │ open │        │ closed │                  │ allocated │ (terminal)
//!   └──────┘ ◀───── └────────┘                  └───────────┘
//!            reopen
//! ```
//!
//! Only `close` and `reopen` are admin-triggered. `complete` is reserved for a
//! successful allocation run.

use crate::error::{Result, SignupError};
use crate::types::EventStatus;

/// A requested status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Stop accepting submissions.
    Close,
    /// Accept submissions again.
    Reopen,
    /// Record that allocation has run.
    Complete,
}

impl Transition {
    /// Status this transition lands in.
    #[must_use]
    pub const fn target(self) -> EventStatus {
        match self {
            Self::Close => EventStatus::Closed,
            Self::Reopen => EventStatus::Open,
            Self::Complete => EventStatus::Allocated,
        }
    }
}

/// Apply `transition` to `current`.
///
/// Closing an already closed event and reopening an open one are accepted
/// no-ops.
///
/// # Errors
///
/// - [`SignupError::TerminalState`] for any transition out of `Allocated`
/// - [`SignupError::AllocationRequiresClosed`] when completing an open event
pub const fn apply(current: EventStatus, transition: Transition) -> Result<EventStatus> {
    match (current, transition) {
        (EventStatus::Allocated, Transition::Complete) => Err(SignupError::AllocationAlreadyRun),
        (EventStatus::Allocated, _) => Err(SignupError::TerminalState),
        (EventStatus::Open, Transition::Complete) => Err(SignupError::AllocationRequiresClosed),
        (EventStatus::Open | EventStatus::Closed, Transition::Close) => Ok(EventStatus::Closed),
        (EventStatus::Open | EventStatus::Closed, Transition::Reopen) => Ok(EventStatus::Open),
        (EventStatus::Closed, Transition::Complete) => Ok(EventStatus::Allocated),
    }
}

/// Map an admin-requested status to a transition.
///
/// # Errors
///
/// [`SignupError::InvalidStatus`] when `requested` is `allocated`, which only
/// an allocation run may set.
pub fn admin_transition(requested: EventStatus) -> Result<Transition> {
    match requested {
        EventStatus::Open => Ok(Transition::Reopen),
        EventStatus::Closed => Ok(Transition::Close),
        EventStatus::Allocated => Err(SignupError::InvalidStatus {
            status: requested.to_string(),
        }),
    }
}

/// Submissions and verification requests are accepted only while open.
///
/// # Errors
///
/// [`SignupError::NotAcceptingSubmissions`] otherwise.
pub const fn ensure_accepting(status: EventStatus) -> Result<()> {
    match status {
        EventStatus::Open => Ok(()),
        EventStatus::Closed | EventStatus::Allocated => Err(SignupError::NotAcceptingSubmissions),
    }
}

/// Allocation may run only on a closed event.
///
/// # Errors
///
/// "close first" for open events, "already run" for allocated ones.
pub fn ensure_allocatable(status: EventStatus) -> Result<()> {
    match SignupError::for_allocation_status(status) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Results exist only once allocation has run.
///
/// # Errors
///
/// [`SignupError::AllocationNotRun`] otherwise.
pub const fn ensure_allocated(status: EventStatus) -> Result<()> {
    match status {
        EventStatus::Allocated => Ok(()),
        EventStatus::Open | EventStatus::Closed => Err(SignupError::AllocationNotRun),
    }
}
