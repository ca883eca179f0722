//! Serial dictatorship matching.
//!
//! Participants are served in submission order; each takes the first option
//! in their ranking that still has a seat.

use crate::types::{Allocation, EventId, EventOption, OptionId, Submission, SubmissionId};
use std::collections::HashMap;

/// Where one submission ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// The participant.
    pub submission_id: SubmissionId,
    /// Assigned option, `None` when every ranked option was full.
    pub option_id: Option<OptionId>,
}

/// Result of a matching run, one [`Placement`] per input submission in
/// service order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationOutcome {
    placements: Vec<Placement>,
}

impl AllocationOutcome {
    /// All placements in the order submissions were served.
    #[must_use]
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// `(submission, option)` pairs for assigned participants.
    pub fn assigned(&self) -> impl Iterator<Item = (SubmissionId, OptionId)> + '_ {
        self.placements
            .iter()
            .filter_map(|p| p.option_id.map(|o| (p.submission_id, o)))
    }

    /// Participants left without a seat.
    pub fn unassigned(&self) -> impl Iterator<Item = SubmissionId> + '_ {
        self.placements
            .iter()
            .filter(|p| p.option_id.is_none())
            .map(|p| p.submission_id)
    }

    /// Number of assigned participants.
    #[must_use]
    pub fn assigned_count(&self) -> usize {
        self.assigned().count()
    }

    /// Number of unassigned participants.
    #[must_use]
    pub fn unassigned_count(&self) -> usize {
        self.placements.len() - self.assigned_count()
    }

    /// Option given to `submission_id`, if it was placed.
    #[must_use]
    pub fn option_for(&self, submission_id: SubmissionId) -> Option<OptionId> {
        self.placements
            .iter()
            .find(|p| p.submission_id == submission_id)
            .and_then(|p| p.option_id)
    }

    /// Rows to persist for `event_id`.
    #[must_use]
    pub fn to_records(&self, event_id: EventId) -> Vec<Allocation> {
        self.placements
            .iter()
            .map(|p| Allocation {
                event_id,
                submission_id: p.submission_id,
                option_id: p.option_id,
            })
            .collect()
    }
}

/// Run serial dictatorship over `submissions`.
///
/// Submissions are served by ascending `submitted_at`; equal timestamps keep
/// their input order. Ranked ids that name no option in `options` are
/// skipped.
#[must_use]
pub fn serial_dictatorship(options: &[EventOption], submissions: &[Submission]) -> AllocationOutcome {
    let mut remaining: HashMap<OptionId, u32> =
        options.iter().map(|o| (o.id, o.capacity)).collect();

    let mut queue: Vec<&Submission> = submissions.iter().collect();
    queue.sort_by_key(|s| s.submitted_at);

    let placements = queue
        .into_iter()
        .map(|submission| {
            let option_id = submission.rankings.iter().copied().find(|id| {
                remaining.get_mut(id).is_some_and(|seats| {
                    if *seats > 0 {
                        *seats -= 1;
                        true
                    } else {
                        false
                    }
                })
            });
            Placement {
                submission_id: submission.id,
                option_id,
            }
        })
        .collect();

    AllocationOutcome { placements }
}
