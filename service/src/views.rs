//! Response shapes returned by [`SignupService`](crate::SignupService).

use allocateme_core::results::ResultsView;
use allocateme_core::{Event, EventId, EventOption, EventStatus, OptionId, SubmissionId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Returned once, at creation. `admin_token` is never retrievable again.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedEvent {
    /// Event id.
    pub id: EventId,
    /// Public join code.
    pub join_code: String,
    /// Plaintext admin credential.
    pub admin_token: String,
    /// Ready-made admin link carrying the credential.
    pub admin_url: String,
}

/// Option as shown to participants and admins.
#[derive(Debug, Clone, Serialize)]
pub struct OptionSummary {
    /// Option id.
    pub id: OptionId,
    /// Name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Seats.
    pub capacity: u32,
    /// Display position.
    pub sort_order: u32,
}

impl From<EventOption> for OptionSummary {
    fn from(option: EventOption) -> Self {
        Self {
            id: option.id,
            name: option.name,
            description: option.description,
            capacity: option.capacity,
            sort_order: option.sort_order,
        }
    }
}

/// Event as seen through its join code.
#[derive(Debug, Clone, Serialize)]
pub struct PublicEvent {
    /// Event id.
    pub id: EventId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Whether submissions need a verified email.
    pub email_verification: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Options in display order.
    pub options: Vec<OptionSummary>,
}

/// Event as seen by its admin.
#[derive(Debug, Clone, Serialize)]
pub struct AdminEvent {
    /// Every event field except the credential digest.
    #[serde(flatten)]
    pub event: Event,
    /// Options in display order.
    pub options: Vec<OptionSummary>,
    /// Submissions received so far, placeholders included.
    pub submission_count: u64,
}

/// Acknowledgement of a ranking submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    /// Submission id.
    pub id: SubmissionId,
    /// Normalized email.
    pub email: String,
    /// Verified flag.
    pub verified: bool,
    /// Priority timestamp.
    pub submitted_at: DateTime<Utc>,
    /// `true` when a new row was inserted, `false` for an update.
    #[serde(skip)]
    pub created: bool,
}

/// Answer to a code request. The code itself travels out of band.
#[derive(Debug, Clone, Serialize)]
pub struct CodeRequested {
    /// Handle to confirm against.
    pub submission_id: SubmissionId,
}

/// Answer to a successful confirmation.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CodeConfirmed {
    /// Always `true`.
    pub verified: bool,
}

/// Delivery tally for allocation notices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NotificationTally {
    /// Handed off successfully.
    pub sent: usize,
    /// Rejected by the notifier.
    pub failed: usize,
}

/// Outcome of an allocation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AllocationSummary {
    /// Participants with a seat.
    pub assigned: usize,
    /// Participants without one.
    pub unassigned: usize,
    /// All participants.
    pub total: usize,
    /// Notice delivery.
    pub notifications: NotificationTally,
}

/// Results of an allocated event.
#[derive(Debug, Clone)]
pub struct EventResults {
    /// The event.
    pub event: Event,
    /// Grouped view.
    pub view: ResultsView,
}

impl EventResults {
    /// Download name for the flat export.
    ///
    /// Control characters and runs of whitespace collapse to one space and
    /// double quotes become single ones, so the name is always a valid
    /// `Content-Disposition` value.
    #[must_use]
    pub fn csv_filename(&self) -> String {
        let title: String = self
            .event
            .title
            .chars()
            .map(|c| match c {
                '"' => '\'',
                c if c.is_control() => ' ',
                c => c,
            })
            .collect();
        let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
        format!("{title} - Results.csv")
    }
}
