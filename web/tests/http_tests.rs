//! HTTP tests driving the full router over the in-memory store.

#![allow(clippy::unwrap_used)] // Test code can use unwrap

use allocateme_service::mocks::{MockRecordStore, RecordingNotifier};
use allocateme_service::{AllocateEnvironment, SignupConfig, SignupService};
use allocateme_testing::MockClock;
use allocateme_web::{AppState, router};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    notifier: RecordingNotifier,
    clock: MockClock,
}

fn app() -> TestApp {
    allocateme_testing::init_test_tracing();
    let notifier = RecordingNotifier::new();
    let clock = MockClock::default();
    let env = AllocateEnvironment::new(
        MockRecordStore::new(),
        notifier.clone(),
        clock.clone(),
        SignupConfig::new("https://allocate.test".to_string()),
    );
    TestApp {
        router: router(AppState::new(SignupService::new(env))),
        notifier,
        clock,
    }
}

struct Reply {
    status: StatusCode,
    headers: axum::http::HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    fn text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }
}

impl TestApp {
    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> Reply {
        let body = body.map_or_else(Body::empty, |b| Body::from(b.to_string()));
        self.send_raw(Request::builder().method(method).uri(uri).body(body).unwrap())
            .await
    }

    async fn send_raw(&self, request: Request<Body>) -> Reply {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        Reply {
            status,
            headers,
            body: body.to_vec(),
        }
    }

    /// Create an event; returns `(id, join_code, admin_token, option ids)`.
    async fn create(&self, verification: bool, options: Value) -> (String, String, String, Vec<String>) {
        let created = self
            .send(
                Method::POST,
                "/events",
                Some(json!({
                    "title": "Workshops",
                    "email_verification": verification,
                    "options": options,
                })),
            )
            .await;
        assert_eq!(created.status, StatusCode::CREATED);
        let created = created.json();
        let join_code = created["join_code"].as_str().unwrap().to_string();

        let public = self
            .send(Method::GET, &format!("/events/join/{join_code}"), None)
            .await
            .json();
        let option_ids = public["options"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["id"].as_str().unwrap().to_string())
            .collect();

        (
            created["id"].as_str().unwrap().to_string(),
            join_code,
            created["admin_token"].as_str().unwrap().to_string(),
            option_ids,
        )
    }

    async fn submit(&self, id: &str, email: &str, rankings: &[&String]) -> Reply {
        let reply = self
            .send(
                Method::POST,
                &format!("/events/{id}/submissions"),
                Some(json!({ "email": email, "rankings": rankings })),
            )
            .await;
        self.clock.advance(chrono::Duration::seconds(1));
        reply
    }
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = app();
    let live = app.send(Method::GET, "/health", None).await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.text(), "ok");

    let ready = app.send(Method::GET, "/health/ready", None).await;
    assert_eq!(ready.status, StatusCode::OK);
    assert_eq!(ready.json()["status"], "ready");
}

#[tokio::test]
async fn test_create_event_returns_credential_once() {
    let app = app();
    let reply = app
        .send(
            Method::POST,
            "/events",
            Some(json!({"title": "  Lab slots ", "options": [{"name": "Morning"}]})),
        )
        .await;

    assert_eq!(reply.status, StatusCode::CREATED);
    let body = reply.json();
    let id = body["id"].as_str().unwrap();
    let token = body["admin_token"].as_str().unwrap();
    assert_eq!(
        body["admin_url"],
        format!("https://allocate.test/event/{id}/admin?token={token}")
    );

    let public = app
        .send(Method::GET, &format!("/events/join/{}", body["join_code"].as_str().unwrap()), None)
        .await
        .json();
    assert_eq!(public["title"], "Lab slots");
    assert_eq!(public["options"][0]["capacity"], 1);
    assert!(public.get("admin_token_digest").is_none());
}

#[tokio::test]
async fn test_create_event_validation_errors() {
    let app = app();

    let no_title = app
        .send(Method::POST, "/events", Some(json!({"options": [{"name": "A"}]})))
        .await;
    assert_eq!(no_title.status, StatusCode::BAD_REQUEST);
    assert_eq!(no_title.json()["message"], "Title is required");

    let bad_capacity = app
        .send(
            Method::POST,
            "/events",
            Some(json!({"title": "T", "options": [{"name": "A", "capacity": 0}]})),
        )
        .await;
    assert_eq!(bad_capacity.status, StatusCode::BAD_REQUEST);

    let garbage = app
        .send_raw(
            Request::builder()
                .method(Method::POST)
                .uri("/events")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(garbage.status, StatusCode::BAD_REQUEST);
    assert_eq!(garbage.json()["message"], "Invalid JSON");
}

#[tokio::test]
async fn test_admin_credential_transport() {
    let app = app();
    let (id, _, token, _) = app.create(false, json!([{"name": "A"}])).await;

    let missing = app.send(Method::GET, &format!("/events/{id}/admin"), None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let wrong = app
        .send(Method::GET, &format!("/events/{id}/admin?token=nope"), None)
        .await;
    assert_eq!(wrong.status, StatusCode::FORBIDDEN);

    let by_query = app
        .send(Method::GET, &format!("/events/{id}/admin?token={token}"), None)
        .await;
    assert_eq!(by_query.status, StatusCode::OK);
    assert_eq!(by_query.json()["submission_count"], 0);

    let by_header = app
        .send_raw(
            Request::builder()
                .uri(format!("/events/{id}/admin"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(by_header.status, StatusCode::OK);

    let bad_id = app
        .send(Method::GET, &format!("/events/not-a-uuid/admin?token={token}"), None)
        .await;
    assert_eq!(bad_id.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_status_transitions() {
    let app = app();
    let (id, _, token, options) = app.create(false, json!([{"name": "A"}])).await;
    let admin = format!("/events/{id}/admin?token={token}");

    let bogus = app
        .send(Method::PATCH, &admin, Some(json!({"status": "allocated"})))
        .await;
    assert_eq!(bogus.status, StatusCode::BAD_REQUEST);

    let closed = app
        .send(Method::PATCH, &admin, Some(json!({"status": "closed"})))
        .await;
    assert_eq!(closed.status, StatusCode::OK);
    assert_eq!(closed.json()["status"], "closed");
    assert!(closed.json().get("admin_token_digest").is_none());

    let rejected = app.submit(&id, "a@example.com", &[&options[0]]).await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        rejected.json()["message"],
        "This event is no longer accepting submissions"
    );
}

#[tokio::test]
async fn test_submission_rules() {
    let app = app();
    let (id, _, _, options) = app.create(false, json!([{"name": "A"}, {"name": "B"}])).await;

    let ok = app.submit(&id, "  Ada@Example.COM ", &[&options[1], &options[0]]).await;
    assert_eq!(ok.status, StatusCode::CREATED);
    assert_eq!(ok.json()["email"], "ada@example.com");
    assert_eq!(ok.json()["verified"], true);

    let dup = app.submit(&id, "ada@example.com", &[&options[0]]).await;
    assert_eq!(dup.status, StatusCode::CONFLICT);

    let bad_email = app.submit(&id, "not-an-email", &[&options[0]]).await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_email.json()["message"], "Valid email is required");

    let unknown = "00000000-0000-0000-0000-000000000000".to_string();
    let bad_option = app.submit(&id, "b@example.com", &[&unknown]).await;
    assert_eq!(bad_option.status, StatusCode::BAD_REQUEST);

    let missing_event = app
        .submit("00000000-0000-0000-0000-000000000000", "c@example.com", &[&options[0]])
        .await;
    assert_eq!(missing_event.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_verification_flow() {
    let app = app();
    let (id, _, _, options) = app.create(true, json!([{"name": "A"}])).await;
    let verify = format!("/events/{id}/verify");

    let early = app.submit(&id, "v@example.com", &[&options[0]]).await;
    assert_eq!(early.status, StatusCode::FORBIDDEN);

    let requested = app
        .send(Method::POST, &verify, Some(json!({"email": "V@example.com"})))
        .await;
    assert_eq!(requested.status, StatusCode::OK);
    let submission_id = requested.json()["submission_id"].as_str().unwrap().to_string();
    let code = app.notifier.last_code_for("v@example.com").await.unwrap();

    let wrong = app
        .send(
            Method::POST,
            &verify,
            Some(json!({"submission_id": submission_id, "code": "000000"})),
        )
        .await;
    // Issued codes are 100000..=999999.
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong.json()["message"], "Incorrect verification code.");

    let numeric: u64 = code.parse().unwrap();
    let confirmed = app
        .send(
            Method::POST,
            &verify,
            Some(json!({"submission_id": submission_id, "code": numeric})),
        )
        .await;
    assert_eq!(confirmed.status, StatusCode::OK);
    assert_eq!(confirmed.json(), json!({"verified": true}));

    let submitted = app.submit(&id, "v@example.com", &[&options[0]]).await;
    assert_eq!(submitted.status, StatusCode::OK);
    assert_eq!(submitted.json()["id"], submission_id.as_str());

    let invalid = app.send(Method::POST, &verify, Some(json!({"code": "1"}))).await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.json()["message"], "Invalid request body");

    let mistyped = app
        .send(Method::POST, &verify, Some(json!({"email": 42})))
        .await;
    assert_eq!(mistyped.status, StatusCode::BAD_REQUEST);
    assert_eq!(mistyped.json()["message"], "Invalid request body");
}

#[tokio::test]
async fn test_verify_rejected_when_disabled() {
    let app = app();
    let (id, _, _, _) = app.create(false, json!([{"name": "A"}])).await;
    let reply = app
        .send(
            Method::POST,
            &format!("/events/{id}/verify"),
            Some(json!({"email": "a@example.com"})),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        reply.json()["message"],
        "Email verification is not enabled for this event"
    );
}

#[tokio::test]
async fn test_allocation_results_and_csv() {
    let app = app();
    let (id, _, token, options) = app
        .create(false, json!([{"name": "Pottery", "capacity": 1}, {"name": "Climbing \"Wall\"", "capacity": 1}]))
        .await;

    app.submit(&id, "first@example.com", &[&options[0], &options[1]]).await;
    app.submit(&id, "second@example.com", &[&options[0], &options[1]]).await;
    app.submit(&id, "third@example.com", &[&options[0]]).await;

    let open = app
        .send(Method::POST, &format!("/events/{id}/allocate?token={token}"), None)
        .await;
    assert_eq!(open.status, StatusCode::BAD_REQUEST);
    assert_eq!(open.json()["message"], "Close submissions before running the allocation");

    let early_results = app
        .send(Method::GET, &format!("/events/{id}/results?token={token}"), None)
        .await;
    assert_eq!(early_results.status, StatusCode::BAD_REQUEST);

    app.send(
        Method::PATCH,
        &format!("/events/{id}/admin?token={token}"),
        Some(json!({"status": "closed"})),
    )
    .await;

    let run = app
        .send(Method::POST, &format!("/events/{id}/allocate?token={token}"), None)
        .await;
    assert_eq!(run.status, StatusCode::OK);
    assert_eq!(
        run.json(),
        json!({"assigned": 2, "unassigned": 1, "total": 3, "notifications": {"sent": 3, "failed": 0}})
    );

    let again = app
        .send(Method::POST, &format!("/events/{id}/allocate?token={token}"), None)
        .await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.json()["message"], "Allocation has already been run");

    let grouped = app
        .send(Method::GET, &format!("/events/{id}/results?token={token}"), None)
        .await
        .json();
    assert_eq!(grouped["options"][0]["assigned"], json!(["first@example.com"]));
    assert_eq!(grouped["options"][1]["assigned"], json!(["second@example.com"]));
    assert_eq!(grouped["unassigned"], json!(["third@example.com"]));

    let csv = app
        .send(Method::GET, &format!("/events/{id}/results?format=csv&token={token}"), None)
        .await;
    assert_eq!(csv.status, StatusCode::OK);
    assert!(
        csv.headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    assert_eq!(
        csv.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Workshops - Results.csv\""
    );
    assert_eq!(
        csv.text(),
        "Option,Participant\n\
         \"Pottery\",\"first@example.com\"\n\
         \"Climbing \"\"Wall\"\"\",\"second@example.com\"\n\
         \"(Unassigned)\",\"third@example.com\""
    );

    let emails = app
        .send(Method::GET, &format!("/events/{id}/emails?token={token}"), None)
        .await
        .json();
    let emails = emails["emails"].as_array().unwrap();
    assert_eq!(emails.len(), 3);
    assert_eq!(
        emails.iter().filter(|e| e["assigned"] == true).count(),
        2
    );
}

#[tokio::test]
async fn test_csv_filename_survives_multiline_title() {
    let app = app();
    let created = app
        .send(
            Method::POST,
            "/events",
            Some(json!({"title": "Week 1\nWorkshops\t\"B\"", "options": [{"name": "A"}]})),
        )
        .await
        .json();
    let id = created["id"].as_str().unwrap().to_string();
    let token = created["admin_token"].as_str().unwrap().to_string();
    let join_code = created["join_code"].as_str().unwrap();
    let public = app
        .send(Method::GET, &format!("/events/join/{join_code}"), None)
        .await
        .json();
    let option = public["options"][0]["id"].as_str().unwrap().to_string();

    app.submit(&id, "a@example.com", &[&option]).await;
    app.send(
        Method::PATCH,
        &format!("/events/{id}/admin?token={token}"),
        Some(json!({"status": "closed"})),
    )
    .await;
    app.send(Method::POST, &format!("/events/{id}/allocate?token={token}"), None)
        .await;

    let csv = app
        .send(Method::GET, &format!("/events/{id}/results?format=csv&token={token}"), None)
        .await;
    assert_eq!(csv.status, StatusCode::OK);
    assert_eq!(
        csv.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Week 1 Workshops 'B' - Results.csv\""
    );
}

#[tokio::test]
async fn test_delete_submission() {
    let app = app();
    let (id, _, token, options) = app.create(false, json!([{"name": "A"}])).await;
    let created = app.submit(&id, "a@example.com", &[&options[0]]).await.json();
    let sub_id = created["id"].as_str().unwrap();

    let (other, _, other_token, _) = app.create(false, json!([{"name": "B"}])).await;
    let cross = app
        .send(
            Method::DELETE,
            &format!("/events/{other}/submissions/{sub_id}?token={other_token}"),
            None,
        )
        .await;
    assert_eq!(cross.status, StatusCode::NOT_FOUND);

    let deleted = app
        .send(
            Method::DELETE,
            &format!("/events/{id}/submissions/{sub_id}?token={token}"),
            None,
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.json(), json!({"success": true}));

    let listed = app
        .send(Method::GET, &format!("/events/{id}/submissions?token={token}"), None)
        .await
        .json();
    assert_eq!(listed["submissions"], json!([]));
}
