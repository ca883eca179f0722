//! HTTP request handlers, one module per resource.

pub mod allocation;
pub mod events;
pub mod health;
pub mod results;
pub mod submissions;
pub mod verify;

use crate::error::AppError;
use crate::extractors::AdminCredential;
use allocateme_core::{EventId, SignupError};

/// Event id from a public route. Unparseable ids name no event.
fn event_id(raw: &str) -> Result<EventId, AppError> {
    raw.parse().map_err(|_| SignupError::EventNotFound.into())
}

/// Event id from an admin route.
///
/// A missing credential is reported first; an unparseable id is then as
/// good as a wrong credential.
fn admin_event_id(raw: &str, credential: &AdminCredential) -> Result<EventId, AppError> {
    if credential.as_deref().is_none() {
        return Err(SignupError::Unauthenticated.into());
    }
    raw.parse().map_err(|_| SignupError::InvalidCredential.into())
}
