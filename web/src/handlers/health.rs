//! Health check endpoints.
//!
//! Used by load balancers and monitoring systems to verify service health.

use crate::state::AppState;
use allocateme_core::environment::Clock;
use allocateme_service::{Notifier, RecordStore};
use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

/// Liveness. Does NOT check the database.
///
/// ```text
/// GET /health  →  200 ok
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness report.
#[derive(Debug, Serialize)]
pub struct Readiness {
    /// `ready` or `unavailable`.
    pub status: &'static str,
    /// Failure detail when unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Readiness: pings the record store.
///
/// # Status Codes
///
/// - 200 OK: store reachable
/// - 503 Service Unavailable: store unreachable
///
/// ```text
/// GET /health/ready
/// ```
pub async fn readiness<S, N, C>(
    State(state): State<AppState<S, N, C>>,
) -> (StatusCode, Json<Readiness>)
where
    S: RecordStore + 'static,
    N: Notifier + 'static,
    C: Clock + 'static,
{
    match state.service().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(Readiness {
                status: "ready",
                message: None,
            }),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Readiness {
                    status: "unavailable",
                    message: Some(err.to_string()),
                }),
            )
        }
    }
}
