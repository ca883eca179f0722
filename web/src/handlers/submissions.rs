//! Ranking submissions.

use super::{admin_event_id, event_id};
use crate::WebResult;
use crate::extractors::{AdminCredential, JsonBody};
use crate::state::AppState;
use allocateme_core::environment::Clock;
use allocateme_core::validation::SubmissionDraft;
use allocateme_core::{SignupError, Submission, SubmissionId};
use allocateme_service::views::SubmissionReceipt;
use allocateme_service::{Notifier, RecordStore};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

/// `POST /events/{id}/submissions`
///
/// 201 for a new submission, 200 when a verified placeholder was filled in.
///
/// # Errors
///
/// 400 for validation and state errors, 403 for an unverified email,
/// 409 for a duplicate.
pub async fn submit<S, N, C>(
    State(state): State<AppState<S, N, C>>,
    Path(id): Path<String>,
    JsonBody(draft): JsonBody<SubmissionDraft>,
) -> WebResult<(StatusCode, Json<SubmissionReceipt>)>
where
    S: RecordStore + 'static,
    N: Notifier + 'static,
    C: Clock + 'static,
{
    let receipt = state.service().submit(event_id(&id)?, draft).await?;
    let status = if receipt.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(receipt)))
}

/// Body of `GET /events/{id}/submissions`.
#[derive(Debug, Serialize)]
pub struct SubmissionList {
    /// Submissions in priority order.
    pub submissions: Vec<Submission>,
}

/// `GET /events/{id}/submissions`
///
/// # Errors
///
/// 401 / 403 for a missing or wrong credential.
pub async fn list_submissions<S, N, C>(
    State(state): State<AppState<S, N, C>>,
    Path(id): Path<String>,
    credential: AdminCredential,
) -> WebResult<Json<SubmissionList>>
where
    S: RecordStore + 'static,
    N: Notifier + 'static,
    C: Clock + 'static,
{
    let id = admin_event_id(&id, &credential)?;
    let submissions = state
        .service()
        .list_submissions(id, credential.as_deref())
        .await?;
    Ok(Json(SubmissionList { submissions }))
}

/// Body of a successful delete.
#[derive(Debug, Serialize)]
pub struct Deleted {
    /// Always `true`.
    pub success: bool,
}

/// `DELETE /events/{id}/submissions/{sub_id}`
///
/// # Errors
///
/// 404 when the submission does not exist or belongs to another event.
pub async fn delete_submission<S, N, C>(
    State(state): State<AppState<S, N, C>>,
    Path((id, sub_id)): Path<(String, String)>,
    credential: AdminCredential,
) -> WebResult<Json<Deleted>>
where
    S: RecordStore + 'static,
    N: Notifier + 'static,
    C: Clock + 'static,
{
    let id = admin_event_id(&id, &credential)?;
    let sub_id: SubmissionId = sub_id
        .parse()
        .map_err(|_| SignupError::SubmissionNotFound)?;
    state
        .service()
        .delete_submission(id, credential.as_deref(), sub_id)
        .await?;
    Ok(Json(Deleted { success: true }))
}
