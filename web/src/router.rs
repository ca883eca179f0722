//! Route table.

use crate::handlers::{allocation, events, health, results, submissions, verify};
use crate::state::AppState;
use allocateme_core::environment::Clock;
use allocateme_service::{Notifier, RecordStore};
use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

/// Every AllocateMe route over `state`, wrapped in request tracing.
///
/// ```text
/// POST   /events
/// GET    /events/join/{code}
/// GET    /events/{id}/admin            (credential)
/// PATCH  /events/{id}/admin            (credential)
/// POST   /events/{id}/submissions
/// GET    /events/{id}/submissions      (credential)
/// DELETE /events/{id}/submissions/{s}  (credential)
/// POST   /events/{id}/verify
/// POST   /events/{id}/allocate         (credential)
/// GET    /events/{id}/results          (credential)
/// GET    /events/{id}/emails           (credential)
/// GET    /health
/// GET    /health/ready
/// ```
pub fn router<S, N, C>(state: AppState<S, N, C>) -> Router
where
    S: RecordStore + 'static,
    N: Notifier + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness::<S, N, C>))
        .route("/events", post(events::create_event::<S, N, C>))
        .route("/events/join/:code", get(events::public_event::<S, N, C>))
        .route(
            "/events/:id/admin",
            get(events::admin_event::<S, N, C>).patch(events::update_status::<S, N, C>),
        )
        .route(
            "/events/:id/submissions",
            post(submissions::submit::<S, N, C>).get(submissions::list_submissions::<S, N, C>),
        )
        .route(
            "/events/:id/submissions/:sub_id",
            delete(submissions::delete_submission::<S, N, C>),
        )
        .route("/events/:id/verify", post(verify::verify::<S, N, C>))
        .route("/events/:id/allocate", post(allocation::allocate::<S, N, C>))
        .route("/events/:id/results", get(results::results::<S, N, C>))
        .route("/events/:id/emails", get(results::emails::<S, N, C>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
