//! Read-side projection of a completed allocation.

use crate::types::{Allocation, EventOption, OptionId, SubmissionId};
use serde::Serialize;
use std::collections::HashMap;

/// Label used for unassigned participants in the flat export.
pub const UNASSIGNED_LABEL: &str = "(Unassigned)";

/// Participants grouped per option, plus the unassigned bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsView {
    /// One entry per option in sort order, including empty ones.
    pub options: Vec<OptionResult>,
    /// Emails of participants with no seat.
    pub unassigned: Vec<String>,
}

/// Assignees of one option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionResult {
    /// Option id.
    pub option_id: OptionId,
    /// Option name.
    pub option_name: String,
    /// Declared capacity.
    pub capacity: u32,
    /// Emails of assigned participants.
    pub assigned: Vec<String>,
}

impl ResultsView {
    /// Group `allocations` under `options`.
    ///
    /// `options` is expected in sort order. `emails` resolves submission ids;
    /// rows whose submission no longer resolves are dropped, as are rows
    /// pointing at an unknown option.
    #[must_use]
    pub fn project(
        options: &[EventOption],
        allocations: &[Allocation],
        emails: &HashMap<SubmissionId, String>,
    ) -> Self {
        let mut groups: Vec<OptionResult> = options
            .iter()
            .map(|o| OptionResult {
                option_id: o.id,
                option_name: o.name.clone(),
                capacity: o.capacity,
                assigned: Vec::new(),
            })
            .collect();
        let index: HashMap<OptionId, usize> =
            groups.iter().enumerate().map(|(i, g)| (g.option_id, i)).collect();

        let mut unassigned = Vec::new();
        for allocation in allocations {
            let Some(email) = emails.get(&allocation.submission_id) else {
                continue;
            };
            match allocation.option_id {
                None => unassigned.push(email.clone()),
                Some(option_id) => {
                    if let Some(&i) = index.get(&option_id) {
                        groups[i].assigned.push(email.clone());
                    }
                }
            }
        }

        Self {
            options: groups,
            unassigned,
        }
    }

    /// Flat `Option,Participant` export.
    ///
    /// Every field is quoted. Options without assignees still get a row with
    /// an empty participant column.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut lines = vec!["Option,Participant".to_string()];

        for group in &self.options {
            let name = quote(&group.option_name);
            if group.assigned.is_empty() {
                lines.push(format!("{name},"));
            }
            for email in &group.assigned {
                lines.push(format!("{name},{}", quote(email)));
            }
        }

        let label = quote(UNASSIGNED_LABEL);
        for email in &self.unassigned {
            lines.push(format!("{label},{}", quote(email)));
        }

        lines.join("\n")
    }

    /// Total participants across both buckets.
    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.unassigned.len() + self.options.iter().map(|g| g.assigned.len()).sum::<usize>()
    }
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventId;

    struct Fixture {
        event_id: EventId,
        options: Vec<EventOption>,
        emails: HashMap<SubmissionId, String>,
    }

    impl Fixture {
        fn new(names: &[&str]) -> Self {
            let event_id = EventId::new();
            let options = names
                .iter()
                .zip(0u32..)
                .map(|(name, sort_order)| EventOption {
                    id: OptionId::new(),
                    event_id,
                    name: (*name).to_string(),
                    description: None,
                    capacity: 2,
                    sort_order,
                })
                .collect();
            Self {
                event_id,
                options,
                emails: HashMap::new(),
            }
        }

        fn participant(&mut self, email: &str, option: Option<usize>) -> Allocation {
            let submission_id = SubmissionId::new();
            self.emails.insert(submission_id, email.to_string());
            Allocation {
                event_id: self.event_id,
                submission_id,
                option_id: option.map(|i| self.options[i].id),
            }
        }
    }

    #[test]
    fn groups_in_option_order_with_empty_options() {
        let mut fx = Fixture::new(&["Pottery", "Archery", "Chess"]);
        let rows = vec![
            fx.participant("a@test.com", Some(1)),
            fx.participant("b@test.com", None),
            fx.participant("c@test.com", Some(1)),
        ];

        let view = ResultsView::project(&fx.options, &rows, &fx.emails);

        let names: Vec<_> = view.options.iter().map(|o| o.option_name.as_str()).collect();
        assert_eq!(names, ["Pottery", "Archery", "Chess"]);
        assert!(view.options[0].assigned.is_empty());
        assert_eq!(view.options[1].assigned, ["a@test.com", "c@test.com"]);
        assert_eq!(view.unassigned, ["b@test.com"]);
        assert_eq!(view.participant_count(), 3);
    }

    #[test]
    fn rows_for_deleted_submissions_are_dropped() {
        let mut fx = Fixture::new(&["Pottery"]);
        let mut rows = vec![fx.participant("a@test.com", Some(0))];
        rows.push(Allocation {
            event_id: fx.event_id,
            submission_id: SubmissionId::new(),
            option_id: None,
        });

        let view = ResultsView::project(&fx.options, &rows, &fx.emails);

        assert_eq!(view.participant_count(), 1);
        assert!(view.unassigned.is_empty());
    }

    #[test]
    fn csv_layout() {
        let mut fx = Fixture::new(&["Pottery", "Archery"]);
        let rows = vec![
            fx.participant("a@test.com", Some(1)),
            fx.participant("b@test.com", None),
        ];

        let csv = ResultsView::project(&fx.options, &rows, &fx.emails).to_csv();

        assert_eq!(
            csv,
            "Option,Participant\n\"Pottery\",\n\"Archery\",\"a@test.com\"\n\"(Unassigned)\",\"b@test.com\""
        );
    }

    #[test]
    fn csv_doubles_embedded_quotes() {
        let fx = Fixture::new(&["The \"Big\" Room"]);
        let csv = ResultsView::project(&fx.options, &[], &fx.emails).to_csv();
        assert!(csv.ends_with("\"The \"\"Big\"\" Room\","));
    }
}
