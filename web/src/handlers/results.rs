//! Allocation results and the participant notices built from them.

use super::admin_event_id;
use crate::WebResult;
use crate::extractors::AdminCredential;
use crate::state::AppState;
use allocateme_core::environment::Clock;
use allocateme_core::notice::AllocationNotice;
use allocateme_service::{Notifier, RecordStore};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Query of `GET /events/{id}/results`.
#[derive(Debug, Default, Deserialize)]
pub struct ResultsQuery {
    /// `csv` for the flat export; anything else is JSON.
    pub format: Option<String>,
}

/// `GET /events/{id}/results[?format=csv]`
///
/// # Errors
///
/// 400 until the allocation has run.
pub async fn results<S, N, C>(
    State(state): State<AppState<S, N, C>>,
    Path(id): Path<String>,
    Query(query): Query<ResultsQuery>,
    credential: AdminCredential,
) -> WebResult<Response>
where
    S: RecordStore + 'static,
    N: Notifier + 'static,
    C: Clock + 'static,
{
    let id = admin_event_id(&id, &credential)?;
    let results = state.service().results(id, credential.as_deref()).await?;

    if query.format.as_deref() == Some("csv") {
        let disposition = format!("attachment; filename=\"{}\"", results.csv_filename());
        return Ok((
            [
                (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (CONTENT_DISPOSITION, disposition),
            ],
            results.view.to_csv(),
        )
            .into_response());
    }

    Ok(Json(results.view).into_response())
}

/// Body of `GET /events/{id}/emails`.
#[derive(Debug, Serialize)]
pub struct NoticeList {
    /// One notice per allocated participant.
    pub emails: Vec<AllocationNotice>,
}

/// `GET /events/{id}/emails`
///
/// # Errors
///
/// 400 until the allocation has run.
pub async fn emails<S, N, C>(
    State(state): State<AppState<S, N, C>>,
    Path(id): Path<String>,
    credential: AdminCredential,
) -> WebResult<Json<NoticeList>>
where
    S: RecordStore + 'static,
    N: Notifier + 'static,
    C: Clock + 'static,
{
    let id = admin_event_id(&id, &credential)?;
    let emails = state.service().notices(id, credential.as_deref()).await?;
    Ok(Json(NoticeList { emails }))
}
