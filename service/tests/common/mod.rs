//! Shared harness for service integration tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use allocateme_core::validation::{EventDraft, OptionDraft, SubmissionDraft};
use allocateme_core::{EventId, OptionId};
use allocateme_service::mocks::{MockRecordStore, RecordingNotifier};
use allocateme_service::views::CreatedEvent;
use allocateme_service::{AllocateEnvironment, SignupConfig, SignupService};
use allocateme_testing::MockClock;

pub type Service = SignupService<MockRecordStore, RecordingNotifier, MockClock>;

pub struct Harness {
    pub service: Service,
    pub store: MockRecordStore,
    pub notifier: RecordingNotifier,
    pub clock: MockClock,
}

pub fn harness() -> Harness {
    allocateme_testing::init_test_tracing();
    let store = MockRecordStore::new();
    let notifier = RecordingNotifier::new();
    let clock = MockClock::default();
    let env = AllocateEnvironment::new(
        store.clone(),
        notifier.clone(),
        clock.clone(),
        SignupConfig::new("https://allocate.test".to_string()),
    );
    Harness {
        service: SignupService::new(env),
        store,
        notifier,
        clock,
    }
}

pub fn draft(title: &str, verification: bool, options: &[(&str, i64)]) -> EventDraft {
    EventDraft {
        title: Some(title.to_string()),
        description: None,
        email_verification: Some(verification),
        options: options
            .iter()
            .map(|(name, capacity)| OptionDraft {
                name: Some((*name).to_string()),
                description: None,
                capacity: Some(*capacity),
            })
            .collect(),
    }
}

pub fn ranking(email: &str, options: &[OptionId]) -> SubmissionDraft {
    SubmissionDraft {
        email: Some(email.to_string()),
        rankings: Some(options.iter().map(ToString::to_string).collect()),
    }
}

impl Harness {
    /// Create an event and return it with its option ids in sort order.
    pub async fn event(
        &self,
        verification: bool,
        options: &[(&str, i64)],
    ) -> (CreatedEvent, Vec<OptionId>) {
        let created = self
            .service
            .create_event(draft("Workshops", verification, options))
            .await
            .unwrap();
        let ids = self
            .service
            .public_event(&created.join_code)
            .await
            .unwrap()
            .options
            .into_iter()
            .map(|o| o.id)
            .collect();
        (created, ids)
    }

    pub async fn close(&self, created: &CreatedEvent) {
        self.service
            .update_status(created.id, Some(&created.admin_token), Some("closed"))
            .await
            .unwrap();
    }

    pub fn clock_now(&self) -> chrono::DateTime<chrono::Utc> {
        use allocateme_core::environment::Clock;
        self.clock.now()
    }

    pub async fn submit_at(&self, event_id: EventId, email: &str, options: &[OptionId]) {
        self.service
            .submit(event_id, ranking(email, options))
            .await
            .unwrap();
        self.clock.advance(chrono::Duration::seconds(1));
    }
}
