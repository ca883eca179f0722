//! # AllocateMe Testing
//!
//! Testing utilities shared by the AllocateMe crates.
//!
//! This crate provides:
//! - Deterministic clocks implementing [`Clock`]
//! - Fixture builders for events, options and submissions
//! - `proptest` strategies for allocation inputs
//!
//! ## Example
//!
//! ```
//! use allocateme_testing::{fixtures, test_clock};
//! use allocateme_core::environment::Clock;
//!
//! let clock = test_clock();
//! let event = fixtures::event("Workshops", clock.now());
//! let options = fixtures::options(event.id, &[("Pottery", 1), ("Archery", 2)]);
//! assert_eq!(options[1].capacity, 2);
//! ```

use allocateme_core::environment::Clock;
use chrono::{DateTime, Utc};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use chrono::Duration;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use allocateme_testing::mocks::FixedClock;
    /// use allocateme_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that tests move forward by hand.
    ///
    /// Clones share the same instant, so a test can keep one handle and give
    /// another to the code under test.
    ///
    /// ```
    /// use allocateme_testing::mocks::MockClock;
    /// use allocateme_core::environment::Clock;
    /// use chrono::Duration;
    ///
    /// let clock = MockClock::default();
    /// let start = clock.now();
    /// clock.clone().advance(Duration::minutes(16));
    /// assert_eq!(clock.now() - start, Duration::minutes(16));
    /// ```
    #[derive(Debug, Clone)]
    pub struct MockClock {
        micros: Arc<AtomicI64>,
    }

    impl MockClock {
        /// Start at `time`.
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                micros: Arc::new(AtomicI64::new(time.timestamp_micros())),
            }
        }

        /// Move the clock forward.
        pub fn advance(&self, by: Duration) {
            let step = by.num_microseconds().unwrap_or(i64::MAX);
            self.micros.fetch_add(step, Ordering::SeqCst);
        }

        /// Jump to `time`.
        pub fn set(&self, time: DateTime<Utc>) {
            self.micros.store(time.timestamp_micros(), Ordering::SeqCst);
        }
    }

    impl Default for MockClock {
        fn default() -> Self {
            Self::new(super::test_clock().now())
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> DateTime<Utc> {
            DateTime::from_timestamp_micros(self.micros.load(Ordering::SeqCst)).unwrap_or_default()
        }
    }
}

/// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
///
/// # Panics
///
/// This function will panic if the hardcoded timestamp fails to parse,
/// which should never happen in practice.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_clock() -> mocks::FixedClock {
    mocks::FixedClock::new(
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc),
    )
}

/// Install a `tracing` subscriber writing to the test harness.
///
/// Safe to call from every test; only the first call takes effect.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "allocateme=debug".into()),
        )
        .try_init();
}

/// Builders for domain records.
pub mod fixtures {
    use super::{DateTime, Utc};
    use allocateme_core::token::TokenAuthenticator;
    use allocateme_core::{
        Event, EventId, EventOption, EventStatus, OptionId, Submission, SubmissionId,
    };
    use chrono::Duration;

    /// Admin credential whose digest every fixture event carries.
    pub const ADMIN_TOKEN: &str = "fixture-admin-token";

    /// An open event without verification.
    #[must_use]
    pub fn event(title: &str, created_at: DateTime<Utc>) -> Event {
        Event {
            id: EventId::new(),
            title: title.to_string(),
            description: None,
            join_code: "ABCD-EFGH".to_string(),
            admin_token_digest: TokenAuthenticator::digest(ADMIN_TOKEN),
            status: EventStatus::Open,
            email_verification: false,
            created_at,
            expires_at: created_at + Duration::days(30),
        }
    }

    /// Options named and sized by `specs`, sorted in the given order.
    #[must_use]
    pub fn options(event_id: EventId, specs: &[(&str, u32)]) -> Vec<EventOption> {
        specs
            .iter()
            .zip(0u32..)
            .map(|((name, capacity), sort_order)| EventOption {
                id: OptionId::new(),
                event_id,
                name: (*name).to_string(),
                description: None,
                capacity: *capacity,
                sort_order,
            })
            .collect()
    }

    /// A verified submission stamped `offset_secs` after `base`.
    #[must_use]
    pub fn submission(
        event_id: EventId,
        email: &str,
        rankings: Vec<OptionId>,
        base: DateTime<Utc>,
        offset_secs: i64,
    ) -> Submission {
        Submission {
            id: SubmissionId::new(),
            event_id,
            email: email.to_string(),
            rankings,
            verified: true,
            submitted_at: base + Duration::seconds(offset_secs),
        }
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use super::{DateTime, Utc};
    use allocateme_core::{EventId, EventOption, OptionId, Submission, SubmissionId};
    use chrono::Duration;
    use proptest::prelude::*;

    /// Options and submissions for one event.
    #[derive(Debug, Clone)]
    pub struct AllocationInput {
        /// Options with capacities in `1..=4`.
        pub options: Vec<EventOption>,
        /// Submissions whose rankings mostly reference `options`; a few
        /// carry ids that resolve to nothing.
        pub submissions: Vec<Submission>,
    }

    /// Up to `max_options` options and `max_submissions` submissions.
    ///
    /// Timestamps come from a narrow window so ties are common.
    pub fn allocation_input(
        max_options: usize,
        max_submissions: usize,
    ) -> impl Strategy<Value = AllocationInput> {
        let capacities = prop::collection::vec(1u32..=4, 1..=max_options);
        capacities.prop_flat_map(move |capacities| {
            let option_count = capacities.len();
            let ranking = prop::collection::vec(0..option_count + 1, 0..=option_count + 1);
            let submissions = prop::collection::vec((ranking, 0i64..20), 0..=max_submissions);
            (Just(capacities), submissions).prop_map(build_input)
        })
    }

    fn build_input((capacities, raw): (Vec<u32>, Vec<(Vec<usize>, i64)>)) -> AllocationInput {
        let event_id = EventId::new();
        let base = DateTime::<Utc>::UNIX_EPOCH;

        let options: Vec<EventOption> = capacities
            .iter()
            .zip(0u32..)
            .map(|(capacity, sort_order)| EventOption {
                id: OptionId::new(),
                event_id,
                name: format!("Option {sort_order}"),
                description: None,
                capacity: *capacity,
                sort_order,
            })
            .collect();

        let submissions = raw
            .into_iter()
            .enumerate()
            .map(|(n, (picks, offset))| {
                let mut rankings: Vec<OptionId> = Vec::new();
                for pick in picks {
                    // One past the last index stands for a dangling id.
                    let id = options.get(pick).map_or_else(OptionId::new, |o| o.id);
                    if !rankings.contains(&id) {
                        rankings.push(id);
                    }
                }
                Submission {
                    id: SubmissionId::new(),
                    event_id,
                    email: format!("participant{n}@test.com"),
                    rankings,
                    verified: true,
                    submitted_at: base + Duration::seconds(offset),
                }
            })
            .collect();

        AllocationInput {
            options,
            submissions,
        }
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, MockClock};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn mock_clock_clones_share_time() {
        let clock = MockClock::default();
        let handle = clock.clone();
        let start = clock.now();

        handle.advance(Duration::minutes(15));
        assert_eq!(clock.now() - start, Duration::minutes(15));

        handle.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn fixture_submissions_are_spaced() {
        let now = test_clock().now();
        let event = fixtures::event("Workshops", now);
        let a = fixtures::submission(event.id, "a@test.com", vec![], now, 0);
        let b = fixtures::submission(event.id, "b@test.com", vec![], now, 5);
        assert!(a.submitted_at < b.submitted_at);
    }
}
