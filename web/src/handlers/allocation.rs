//! Running the allocation.

use super::admin_event_id;
use crate::WebResult;
use crate::extractors::AdminCredential;
use crate::state::AppState;
use allocateme_core::environment::Clock;
use allocateme_service::views::AllocationSummary;
use allocateme_service::{Notifier, RecordStore};
use axum::{
    Json,
    extract::{Path, State},
};

/// `POST /events/{id}/allocate`
///
/// # Errors
///
/// 400 while the event is open or once it is allocated, and when there is
/// nothing to allocate. 500 with a distinct message when the rows were
/// saved but the status could not be advanced.
pub async fn allocate<S, N, C>(
    State(state): State<AppState<S, N, C>>,
    Path(id): Path<String>,
    credential: AdminCredential,
) -> WebResult<Json<AllocationSummary>>
where
    S: RecordStore + 'static,
    N: Notifier + 'static,
    C: Clock + 'static,
{
    let id = admin_event_id(&id, &credential)?;
    let summary = state.service().allocate(id, credential.as_deref()).await?;
    Ok(Json(summary))
}
