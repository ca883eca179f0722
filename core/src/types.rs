//! Domain types for event sign-ups.
//!
//! Records mirror the persisted shape: an [`Event`] owns its [`EventOption`]s,
//! [`Submission`]s and [`Allocation`]s; a [`VerificationCode`] hangs off one
//! submission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing `Uuid`.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for an event.
    EventId
);
uuid_id!(
    /// Unique identifier for an option of an event.
    OptionId
);
uuid_id!(
    /// Unique identifier for a participant submission.
    SubmissionId
);

// ============================================================================
// Event
// ============================================================================

/// Lifecycle status of an event.
///
/// Legal moves are `Open → Closed`, `Closed → Open` and `Closed → Allocated`.
/// `Allocated` is terminal. See [`crate::lifecycle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Accepting submissions and verification requests.
    Open,
    /// Submissions paused; allocation may run.
    Closed,
    /// Allocation has run. Terminal.
    Allocated,
}

impl EventStatus {
    /// Wire / storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Allocated => "allocated",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = crate::error::SignupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "allocated" => Ok(Self::Allocated),
            other => Err(crate::error::SignupError::InvalidStatus {
                status: other.to_string(),
            }),
        }
    }
}

/// A capacity-constrained sign-up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event identifier.
    pub id: EventId,
    /// Title shown to participants.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Public, human-typable code participants use to find the event.
    pub join_code: String,
    /// One-way digest of the admin credential. Never serialized.
    #[serde(skip_serializing, default)]
    pub admin_token_digest: String,
    /// Current lifecycle status.
    pub status: EventStatus,
    /// Whether participants must confirm their email before submitting.
    pub email_verification: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
}

/// One choice participants can rank.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOption {
    /// Option identifier.
    pub id: OptionId,
    /// Owning event.
    pub event_id: EventId,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Number of participants this option can take (at least 1).
    pub capacity: u32,
    /// Display position within the event.
    pub sort_order: u32,
}

// ============================================================================
// Submission
// ============================================================================

/// A participant's ranked preferences.
///
/// With email verification enabled the record is first created as an
/// unverified placeholder with an empty ranking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Submission identifier.
    pub id: SubmissionId,
    /// Owning event.
    pub event_id: EventId,
    /// Lowercased, trimmed email. Unique per event.
    pub email: String,
    /// Ranked option ids, most preferred first.
    pub rankings: Vec<OptionId>,
    /// Whether the email has been confirmed (always true without verification).
    pub verified: bool,
    /// Priority timestamp for first-come-first-served allocation.
    pub submitted_at: DateTime<Utc>,
}

/// Short-lived numeric code gating a submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCode {
    /// Submission this code confirms.
    pub submission_id: SubmissionId,
    /// Six-digit numeric code.
    pub code: String,
    /// Instant after which the code is rejected.
    pub expires_at: DateTime<Utc>,
}

impl VerificationCode {
    /// Whether the code is past its expiry at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

// ============================================================================
// Allocation
// ============================================================================

/// Persisted outcome for one submission of an allocation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Owning event.
    pub event_id: EventId,
    /// The submission this row decides.
    pub submission_id: SubmissionId,
    /// Assigned option, `None` when unassigned.
    pub option_id: Option<OptionId>,
}
