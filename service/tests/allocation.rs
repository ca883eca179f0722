//! Allocation runs, results and notices.

#![allow(clippy::unwrap_used)]

mod common;

use allocateme_core::{EventStatus, SignupError};
use allocateme_service::mocks::SentMessage;
use allocateme_service::views::NotificationTally;
use common::harness;

#[tokio::test]
async fn single_seat_goes_to_first_submitter() {
    let h = harness();
    let (created, ids) = h.event(false, &[("Pottery", 1)]).await;
    let token = Some(created.admin_token.as_str());
    h.submit_at(created.id, "s1@test.com", &ids).await;
    h.submit_at(created.id, "s2@test.com", &ids).await;
    h.close(&created).await;

    let summary = h.service.allocate(created.id, token).await.unwrap();

    assert_eq!(summary.assigned, 1);
    assert_eq!(summary.unassigned, 1);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.notifications, NotificationTally { sent: 2, failed: 0 });

    let results = h.service.results(created.id, token).await.unwrap();
    assert_eq!(results.view.options[0].assigned, ["s1@test.com"]);
    assert_eq!(results.view.unassigned, ["s2@test.com"]);
}

#[tokio::test]
async fn second_choice_when_first_is_full() {
    let h = harness();
    let (created, ids) = h.event(false, &[("A", 1), ("B", 1)]).await;
    let token = Some(created.admin_token.as_str());
    h.submit_at(created.id, "s1@test.com", &ids).await;
    h.submit_at(created.id, "s2@test.com", &ids).await;
    h.close(&created).await;

    h.service.allocate(created.id, token).await.unwrap();

    let view = h.service.results(created.id, token).await.unwrap().view;
    assert_eq!(view.options[0].assigned, ["s1@test.com"]);
    assert_eq!(view.options[1].assigned, ["s2@test.com"]);
    assert!(view.unassigned.is_empty());
}

#[tokio::test]
async fn second_run_fails_without_writing() {
    let h = harness();
    let (created, ids) = h.event(false, &[("Pottery", 3)]).await;
    let token = Some(created.admin_token.as_str());
    h.submit_at(created.id, "s1@test.com", &ids).await;
    h.close(&created).await;

    h.service.allocate(created.id, token).await.unwrap();
    let rows_after_first = h.store.all_allocations().await.len();

    let err = h.service.allocate(created.id, token).await.unwrap_err();

    assert_eq!(err, SignupError::AllocationAlreadyRun);
    assert_eq!(err.to_string(), "Allocation has already been run");
    assert_eq!(h.store.all_allocations().await.len(), rows_after_first);
}

#[tokio::test]
async fn preconditions() {
    let h = harness();
    let (created, _) = h.event(false, &[("Pottery", 1)]).await;
    let token = Some(created.admin_token.as_str());

    let err = h.service.allocate(created.id, token).await.unwrap_err();
    assert_eq!(err, SignupError::AllocationRequiresClosed);
    assert_eq!(err.to_string(), "Close submissions before running the allocation");

    h.close(&created).await;
    let err = h.service.allocate(created.id, token).await.unwrap_err();
    assert_eq!(err, SignupError::NoSubmissions);

    let err = h.service.allocate(created.id, None).await.unwrap_err();
    assert_eq!(err, SignupError::Unauthenticated);
}

#[tokio::test]
async fn results_require_allocation() {
    let h = harness();
    let (created, _) = h.event(false, &[("Pottery", 1)]).await;
    let token = Some(created.admin_token.as_str());

    assert_eq!(
        h.service.results(created.id, token).await.unwrap_err(),
        SignupError::AllocationNotRun
    );
    assert_eq!(
        h.service.notices(created.id, token).await.unwrap_err(),
        SignupError::AllocationNotRun
    );
}

#[tokio::test]
async fn unverified_placeholders_are_allocated_as_unassigned() {
    let h = harness();
    let (created, ids) = h.event(true, &[("Pottery", 1)]).await;
    let token = Some(created.admin_token.as_str());

    h.service.request_code(created.id, "lurker@test.com").await.unwrap();
    let requested = h.service.request_code(created.id, "keen@test.com").await.unwrap();
    let code = h.notifier.last_code_for("keen@test.com").await.unwrap();
    h.service
        .confirm_code(created.id, requested.submission_id, &code)
        .await
        .unwrap();
    h.submit_at(created.id, "keen@test.com", &ids).await;
    h.close(&created).await;

    let summary = h.service.allocate(created.id, token).await.unwrap();

    assert_eq!(summary.assigned, 1);
    assert_eq!(summary.unassigned, 1);
    let view = h.service.results(created.id, token).await.unwrap().view;
    assert_eq!(view.unassigned, ["lurker@test.com"]);
}

#[tokio::test]
async fn notices_match_outcomes() {
    let h = harness();
    let (created, ids) = h.event(false, &[("Pottery", 1)]).await;
    let token = Some(created.admin_token.as_str());
    h.submit_at(created.id, "s1@test.com", &ids).await;
    h.submit_at(created.id, "s2@test.com", &ids).await;
    h.close(&created).await;
    h.service.allocate(created.id, token).await.unwrap();

    let notices = h.service.notices(created.id, token).await.unwrap();
    assert_eq!(notices.len(), 2);
    let winner = notices.iter().find(|n| n.to == "s1@test.com").unwrap();
    assert!(winner.assigned);
    assert!(winner.html.contains("<strong>Pottery</strong>"));
    assert_eq!(winner.subject, "Your allocation result for \"Workshops\"");

    let sent = h.notifier.sent().await;
    assert!(sent.contains(&SentMessage::AllocationResult {
        to: "s2@test.com".into(),
        option_name: None,
    }));
}

#[tokio::test]
async fn notifier_failures_are_counted_not_fatal() {
    let h = harness();
    let (created, ids) = h.event(false, &[("Pottery", 1)]).await;
    h.submit_at(created.id, "s1@test.com", &ids).await;
    h.close(&created).await;
    h.notifier.set_failing(true).await;

    let summary = h
        .service
        .allocate(created.id, Some(&created.admin_token))
        .await
        .unwrap();

    assert_eq!(summary.notifications, NotificationTally { sent: 0, failed: 1 });
}

#[tokio::test]
async fn partial_commit_is_reported_and_recoverable() {
    let h = harness();
    let (created, ids) = h.event(false, &[("Pottery", 1)]).await;
    let token = Some(created.admin_token.as_str());
    h.submit_at(created.id, "s1@test.com", &ids).await;
    h.submit_at(created.id, "s2@test.com", &ids).await;
    h.close(&created).await;
    h.store.fail_status_flip(true).await;

    let err = h.service.allocate(created.id, token).await.unwrap_err();
    assert_eq!(err, SignupError::AllocationStatusPending { written: 2 });
    assert!(h.notifier.sent().await.is_empty());

    let admin = h.service.admin_event(created.id, token).await.unwrap();
    assert_eq!(admin.event.status, EventStatus::Closed);

    let err = h
        .service
        .update_status(created.id, token, Some("open"))
        .await
        .unwrap_err();
    assert_eq!(err, SignupError::AllocationPending);

    let err = h.service.allocate(created.id, token).await.unwrap_err();
    assert_eq!(err, SignupError::AllocationStatusPending { written: 2 });

    h.store.fail_status_flip(false).await;
    let summary = h.service.allocate(created.id, token).await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.assigned, 1);
    assert_eq!(h.store.all_allocations().await.len(), 2);
    let admin = h.service.admin_event(created.id, token).await.unwrap();
    assert_eq!(admin.event.status, EventStatus::Allocated);
}

#[tokio::test]
async fn deleting_a_participant_after_allocation_drops_their_row() {
    let h = harness();
    let (created, ids) = h.event(false, &[("Pottery", 2)]).await;
    let token = Some(created.admin_token.as_str());
    h.submit_at(created.id, "s1@test.com", &ids).await;
    h.submit_at(created.id, "s2@test.com", &ids).await;
    h.close(&created).await;
    h.service.allocate(created.id, token).await.unwrap();

    let s1 = h
        .service
        .list_submissions(created.id, token)
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.email == "s1@test.com")
        .unwrap();
    h.service
        .delete_submission(created.id, token, s1.id)
        .await
        .unwrap();

    let view = h.service.results(created.id, token).await.unwrap().view;
    assert_eq!(view.options[0].assigned, ["s2@test.com"]);
}

#[tokio::test]
async fn csv_export_names_the_file_after_the_event() {
    let h = harness();
    let (created, ids) = h.event(false, &[("Pottery", 1)]).await;
    let token = Some(created.admin_token.as_str());
    h.submit_at(created.id, "s1@test.com", &ids).await;
    h.close(&created).await;
    h.service.allocate(created.id, token).await.unwrap();

    let results = h.service.results(created.id, token).await.unwrap();

    assert_eq!(results.csv_filename(), "Workshops - Results.csv");
    assert_eq!(
        results.view.to_csv(),
        "Option,Participant\n\"Pottery\",\"s1@test.com\""
    );
}

#[tokio::test]
async fn concurrent_runs_commit_exactly_once() {
    let h = harness();
    let (created, ids) = h.event(false, &[("Pottery", 1), ("Climbing", 1)]).await;
    let token = Some(created.admin_token.as_str());
    h.submit_at(created.id, "s1@test.com", &ids).await;
    h.submit_at(created.id, "s2@test.com", &ids).await;
    h.close(&created).await;

    let (a, b) = tokio::join!(
        h.service.allocate(created.id, token),
        h.service.allocate(created.id, token)
    );

    let outcomes = [a, b];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        outcomes
            .iter()
            .any(|r| r.as_ref().err() == Some(&SignupError::AllocationAlreadyRun))
    );
    assert_eq!(h.store.all_allocations().await.len(), 2);
}

#[tokio::test]
async fn csv_filename_flattens_control_characters() {
    let h = harness();
    let created = h
        .service
        .create_event(common::draft("Week 1\nWorkshops", false, &[("Pottery", 1)]))
        .await
        .unwrap();
    let token = Some(created.admin_token.as_str());
    let option = h.service.public_event(&created.join_code).await.unwrap().options[0].id;
    h.submit_at(created.id, "s1@test.com", &[option]).await;
    h.close(&created).await;
    h.service.allocate(created.id, token).await.unwrap();

    let results = h.service.results(created.id, token).await.unwrap();

    assert_eq!(results.csv_filename(), "Week 1 Workshops - Results.csv");
}
