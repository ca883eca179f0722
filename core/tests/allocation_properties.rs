//! Property tests for serial dictatorship.

#![allow(clippy::unwrap_used)] // Tests can unwrap

use allocateme_core::allocation::serial_dictatorship;
use allocateme_testing::properties::allocation_input;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

proptest! {
    #[test]
    fn every_submission_placed_exactly_once(input in allocation_input(5, 30)) {
        let outcome = serial_dictatorship(&input.options, &input.submissions);

        let placed: Vec<_> = outcome.placements().iter().map(|p| p.submission_id).collect();
        let unique: HashSet<_> = placed.iter().copied().collect();
        let expected: HashSet<_> = input.submissions.iter().map(|s| s.id).collect();

        prop_assert_eq!(placed.len(), input.submissions.len());
        prop_assert_eq!(unique, expected);
        prop_assert_eq!(
            outcome.assigned_count() + outcome.unassigned_count(),
            input.submissions.len()
        );
    }

    #[test]
    fn capacity_never_exceeded(input in allocation_input(5, 30)) {
        let outcome = serial_dictatorship(&input.options, &input.submissions);

        let mut load: HashMap<_, u32> = HashMap::new();
        for (_, option_id) in outcome.assigned() {
            *load.entry(option_id).or_default() += 1;
        }
        for option in &input.options {
            prop_assert!(load.get(&option.id).copied().unwrap_or(0) <= option.capacity);
        }
    }

    #[test]
    fn assignments_come_from_own_ranking(input in allocation_input(5, 30)) {
        let outcome = serial_dictatorship(&input.options, &input.submissions);
        let by_id: HashMap<_, _> = input.submissions.iter().map(|s| (s.id, s)).collect();

        for (submission_id, option_id) in outcome.assigned() {
            prop_assert!(by_id[&submission_id].rankings.contains(&option_id));
        }
    }

    #[test]
    fn deterministic(input in allocation_input(4, 20)) {
        let first = serial_dictatorship(&input.options, &input.submissions);
        let second = serial_dictatorship(&input.options, &input.submissions);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn later_submissions_cannot_change_earlier_outcomes(
        input in allocation_input(4, 20),
        pick in any::<prop::sample::Index>(),
    ) {
        prop_assume!(!input.submissions.is_empty());
        let target = &input.submissions[pick.index(input.submissions.len())];

        let (mut reordered, mut later): (Vec<_>, Vec<_>) = input
            .submissions
            .iter()
            .cloned()
            .partition(|s| s.submitted_at <= target.submitted_at);
        later.reverse();
        reordered.extend(later);

        let before = serial_dictatorship(&input.options, &input.submissions);
        let after = serial_dictatorship(&input.options, &reordered);

        prop_assert_eq!(before.option_for(target.id), after.option_for(target.id));
    }

    #[test]
    fn nobody_left_out_while_a_ranked_option_has_room(input in allocation_input(4, 20)) {
        let outcome = serial_dictatorship(&input.options, &input.submissions);

        let mut load: HashMap<_, u32> = HashMap::new();
        for (_, option_id) in outcome.assigned() {
            *load.entry(option_id).or_default() += 1;
        }
        let by_id: HashMap<_, _> = input.submissions.iter().map(|s| (s.id, s)).collect();

        for submission_id in outcome.unassigned() {
            for option in &input.options {
                if by_id[&submission_id].rankings.contains(&option.id) {
                    prop_assert_eq!(load.get(&option.id).copied().unwrap_or(0), option.capacity);
                }
            }
        }
    }
}
