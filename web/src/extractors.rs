//! Custom Axum extractors.
//!
//! - [`AdminCredential`]: the admin token from `?token=` or a bearer header
//! - [`JsonBody`]: a typed JSON body whose rejections are 400s
//!
//! # Examples
//!
//! ```ignore
//! async fn handler(
//!     credential: AdminCredential,
//!     JsonBody(draft): JsonBody<EventDraft>,
//! ) -> Result<Json<Response>, AppError> {
//!     service.update_status(id, credential.as_deref(), draft.status.as_deref()).await?;
//!     Ok(Json(response))
//! }
//! ```

use crate::error::AppError;
use allocateme_core::token::extract_credential;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Admin credential presented with a request, if any.
///
/// The `token` query parameter wins over `Authorization: Bearer <token>`.
/// Never rejects: a missing credential is `None` and the operation decides
/// what that means.
#[derive(Debug, Clone, Default)]
pub struct AdminCredential(pub Option<String>);

impl AdminCredential {
    /// Borrow the credential.
    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminCredential
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let query = Query::<TokenQuery>::from_request_parts(parts, state)
            .await
            .ok()
            .and_then(|Query(q)| q.token);
        let authorization = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        Ok(Self(extract_credential(query.as_deref(), authorization)))
    }
}

/// JSON request body.
///
/// Unlike `axum::Json` this does not require a `Content-Type` header and
/// rejects with 400: `"Invalid JSON"` for unparseable input, `"Invalid
/// request body"` when the JSON has the wrong shape.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| AppError::bad_request("Invalid JSON"))?;
        parse_json(&bytes).map(Self)
    }
}

fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(bytes).map_err(|e| {
        if e.is_data() {
            AppError::bad_request("Invalid request body")
        } else {
            AppError::bad_request("Invalid JSON")
        }
    })
}
