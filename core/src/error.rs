//! Error taxonomy for sign-up operations.

use crate::types::EventStatus;
use thiserror::Error;

/// Result type alias for sign-up operations.
pub type Result<T> = std::result::Result<T, SignupError>;

/// Broad class of a [`SignupError`].
///
/// The HTTP layer maps each kind to exactly one status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or rule-breaking input. Never retried automatically.
    Validation,
    /// No admin credential was presented.
    Unauthenticated,
    /// Wrong credential, or an unmet verification precondition.
    Forbidden,
    /// The addressed record does not exist (or is not visible from here).
    NotFound,
    /// A uniqueness rule was violated.
    Conflict,
    /// The operation is not legal in the event's current state.
    State,
    /// Storage read/write failure.
    Persistence,
}

/// Every way a sign-up operation can fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignupError {
    // ═══════════════════════════════════════════════════════════
    // Validation
    // ═══════════════════════════════════════════════════════════

    /// A request field is missing or malformed.
    #[error("{message}")]
    InvalidField {
        /// Offending field.
        field: &'static str,
        /// Human-readable explanation.
        message: String,
    },

    /// Email does not look like `local@domain.tld`.
    #[error("Valid email is required")]
    InvalidEmail,

    /// Rankings list was empty.
    #[error("Rankings must be a non-empty array of option IDs")]
    EmptyRankings,

    /// A ranked id does not name an option of this event.
    #[error("Invalid option ID: {option_id}")]
    InvalidOption {
        /// The offending id, as supplied.
        option_id: String,
    },

    /// The same option was ranked twice.
    #[error("Rankings must not contain duplicate options")]
    DuplicateRanking {
        /// The repeated id.
        option_id: String,
    },

    /// Requested status is not one an admin may set.
    #[error("Status must be 'open' or 'closed' (got '{status}')")]
    InvalidStatus {
        /// The rejected status string.
        status: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Authorization
    // ═══════════════════════════════════════════════════════════

    /// No admin credential in the request.
    #[error("Admin token required")]
    Unauthenticated,

    /// Admin credential does not match (or the event is unknown).
    #[error("Invalid token")]
    InvalidCredential,

    /// Final submission attempted before the email was verified.
    #[error("Email must be verified before submitting")]
    VerificationRequired,

    // ═══════════════════════════════════════════════════════════
    // Not found
    // ═══════════════════════════════════════════════════════════

    /// Event lookup failed.
    #[error("Event not found")]
    EventNotFound,

    /// Submission lookup failed, or it belongs to another event.
    #[error("Submission not found")]
    SubmissionNotFound,

    /// No outstanding verification code for the submission.
    #[error("No verification code found. Please request a new one.")]
    CodeNotFound,

    // ═══════════════════════════════════════════════════════════
    // State conflicts
    // ═══════════════════════════════════════════════════════════

    /// Event is not open.
    #[error("This event is no longer accepting submissions")]
    NotAcceptingSubmissions,

    /// Verification requested on an event that does not use it.
    #[error("Email verification is not enabled for this event")]
    VerificationDisabled,

    /// Any status change after allocation.
    #[error("Cannot change status after allocation")]
    TerminalState,

    /// Allocation attempted while the event is still open.
    #[error("Close submissions before running the allocation")]
    AllocationRequiresClosed,

    /// Allocation attempted a second time.
    #[error("Allocation has already been run")]
    AllocationAlreadyRun,

    /// Results requested before allocation.
    #[error("Allocation has not been run yet")]
    AllocationNotRun,

    /// Allocation rows exist but the status flip is outstanding.
    #[error("Allocation results are pending finalization; run the allocation again to finalize")]
    AllocationPending,

    /// A concurrent request changed the status first.
    #[error("Event status changed concurrently; retry the request")]
    StatusConflict,

    /// Event has no options to allocate into.
    #[error("No options found for this event")]
    NoOptions,

    /// Event has no submissions to allocate.
    #[error("No submissions to allocate")]
    NoSubmissions,

    /// The most recent code is past its expiry.
    #[error("Verification code has expired. Please request a new one.")]
    CodeExpired,

    /// The supplied code does not match the most recent one.
    #[error("Incorrect verification code.")]
    CodeIncorrect,

    // ═══════════════════════════════════════════════════════════
    // Conflicts
    // ═══════════════════════════════════════════════════════════

    /// A submission for this email already exists for the event.
    #[error("A submission with this email already exists for this event")]
    DuplicateSubmission,

    /// The email has already been verified and submitted.
    #[error("This email has already submitted to this event")]
    AlreadyVerified,

    /// Join code collided with an existing event.
    #[error("Join code already in use")]
    JoinCodeTaken,

    // ═══════════════════════════════════════════════════════════
    // Persistence
    // ═══════════════════════════════════════════════════════════

    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A notifier could not build or hand off a message.
    #[error("Notification delivery failed: {0}")]
    Delivery(String),

    /// Allocation rows were written but the status update failed.
    #[error("Allocations saved ({written} rows) but failed to update event status")]
    AllocationStatusPending {
        /// Rows persisted before the failure.
        written: usize,
    },
}

impl SignupError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidField { .. }
            | Self::InvalidEmail
            | Self::EmptyRankings
            | Self::InvalidOption { .. }
            | Self::DuplicateRanking { .. }
            | Self::InvalidStatus { .. } => ErrorKind::Validation,
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::InvalidCredential | Self::VerificationRequired => ErrorKind::Forbidden,
            Self::EventNotFound | Self::SubmissionNotFound | Self::CodeNotFound => {
                ErrorKind::NotFound
            }
            Self::NotAcceptingSubmissions
            | Self::VerificationDisabled
            | Self::TerminalState
            | Self::AllocationRequiresClosed
            | Self::AllocationAlreadyRun
            | Self::AllocationNotRun
            | Self::AllocationPending
            | Self::StatusConflict
            | Self::NoOptions
            | Self::NoSubmissions
            | Self::CodeExpired
            | Self::CodeIncorrect => ErrorKind::State,
            Self::DuplicateSubmission | Self::AlreadyVerified | Self::JoinCodeTaken => {
                ErrorKind::Conflict
            }
            Self::Storage(_) | Self::Delivery(_) | Self::AllocationStatusPending { .. } => {
                ErrorKind::Persistence
            }
        }
    }

    /// Shorthand for [`SignupError::InvalidField`].
    #[must_use]
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }

    /// Wrap a storage failure.
    #[must_use]
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }

    /// The error an operation gated on `Closed` reports for `status`.
    #[must_use]
    pub const fn for_allocation_status(status: EventStatus) -> Option<Self> {
        match status {
            EventStatus::Open => Some(Self::AllocationRequiresClosed),
            EventStatus::Allocated => Some(Self::AllocationAlreadyRun),
            EventStatus::Closed => None,
        }
    }

    /// Returns `true` if the caller can fix this by changing the request.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Validation | ErrorKind::Unauthenticated | ErrorKind::Forbidden
        )
    }
}
