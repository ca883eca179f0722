//! Event creation, lookup and status changes.

use super::admin_event_id;
use crate::WebResult;
use crate::extractors::{AdminCredential, JsonBody};
use crate::state::AppState;
use allocateme_core::Event;
use allocateme_core::environment::Clock;
use allocateme_core::validation::EventDraft;
use allocateme_service::views::{AdminEvent, CreatedEvent, PublicEvent};
use allocateme_service::{Notifier, RecordStore};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

/// `POST /events`
///
/// # Errors
///
/// 400 for an invalid draft.
pub async fn create_event<S, N, C>(
    State(state): State<AppState<S, N, C>>,
    JsonBody(draft): JsonBody<EventDraft>,
) -> WebResult<(StatusCode, Json<CreatedEvent>)>
where
    S: RecordStore + 'static,
    N: Notifier + 'static,
    C: Clock + 'static,
{
    let created = state.service().create_event(draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /events/join/{code}`
///
/// # Errors
///
/// 404 when no event has the code.
pub async fn public_event<S, N, C>(
    State(state): State<AppState<S, N, C>>,
    Path(code): Path<String>,
) -> WebResult<Json<PublicEvent>>
where
    S: RecordStore + 'static,
    N: Notifier + 'static,
    C: Clock + 'static,
{
    Ok(Json(state.service().public_event(&code).await?))
}

/// `GET /events/{id}/admin`
///
/// # Errors
///
/// 401 / 403 for a missing or wrong credential.
pub async fn admin_event<S, N, C>(
    State(state): State<AppState<S, N, C>>,
    Path(id): Path<String>,
    credential: AdminCredential,
) -> WebResult<Json<AdminEvent>>
where
    S: RecordStore + 'static,
    N: Notifier + 'static,
    C: Clock + 'static,
{
    let id = admin_event_id(&id, &credential)?;
    Ok(Json(
        state.service().admin_event(id, credential.as_deref()).await?,
    ))
}

/// Body of `PATCH /events/{id}/admin`.
#[derive(Debug, Default, Deserialize)]
pub struct StatusChange {
    /// `open` or `closed`.
    #[serde(default)]
    pub status: Option<String>,
}

/// `PATCH /events/{id}/admin`
///
/// Returns the updated event.
///
/// # Errors
///
/// 400 for an unknown status or once the event is allocated.
pub async fn update_status<S, N, C>(
    State(state): State<AppState<S, N, C>>,
    Path(id): Path<String>,
    credential: AdminCredential,
    JsonBody(change): JsonBody<StatusChange>,
) -> WebResult<Json<Event>>
where
    S: RecordStore + 'static,
    N: Notifier + 'static,
    C: Clock + 'static,
{
    let id = admin_event_id(&id, &credential)?;
    let event = state
        .service()
        .update_status(id, credential.as_deref(), change.status.as_deref())
        .await?;
    Ok(Json(event))
}
