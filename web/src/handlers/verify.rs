//! Email verification: one endpoint, two modes.
//!
//! `{email}` asks for a code, `{submission_id, code}` confirms one. A body
//! carrying `submission_id` is never treated as a request, even with an
//! `email` alongside.

use super::event_id;
use crate::WebResult;
use crate::error::AppError;
use crate::extractors::JsonBody;
use crate::state::AppState;
use allocateme_core::environment::Clock;
use allocateme_core::{SignupError, SubmissionId};
use allocateme_service::{Notifier, RecordStore};
use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

/// Body of `POST /events/{id}/verify`.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyBody {
    /// Present in send mode.
    pub email: Option<String>,
    /// Present in confirm mode.
    pub submission_id: Option<String>,
    /// Present in confirm mode.
    pub code: Option<CodeField>,
}

/// A verification code sent as a JSON string or number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CodeField {
    /// `"123456"`
    Text(String),
    /// `123456`
    Number(u64),
}

impl CodeField {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(n) => n.to_string(),
        }
    }
}

/// The two modes `POST /events/{id}/verify` supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyRequest {
    /// Issue a code for `email`.
    Send {
        /// Raw email, normalized by the service.
        email: String,
    },
    /// Confirm `code` for a submission.
    Confirm {
        /// Raw submission id.
        submission_id: String,
        /// Code as text.
        code: String,
    },
}

impl VerifyBody {
    /// Pick the mode. `None` when the fields fit neither; empty strings
    /// count as missing.
    #[must_use]
    pub fn into_request(self) -> Option<VerifyRequest> {
        let email = self.email.filter(|s| !s.is_empty());
        let submission_id = self.submission_id.filter(|s| !s.is_empty());
        let code = self
            .code
            .map(CodeField::into_text)
            .filter(|s| !s.is_empty());

        match (email, submission_id, code) {
            (Some(email), None, _) => Some(VerifyRequest::Send { email }),
            (_, Some(submission_id), Some(code)) => Some(VerifyRequest::Confirm {
                submission_id,
                code,
            }),
            _ => None,
        }
    }
}

/// `POST /events/{id}/verify`
///
/// Send mode answers `{submission_id}`; confirm mode `{verified: true}`.
///
/// # Errors
///
/// 400 for any other body shape, plus the service's verification errors.
pub async fn verify<S, N, C>(
    State(state): State<AppState<S, N, C>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<VerifyBody>,
) -> WebResult<Response>
where
    S: RecordStore + 'static,
    N: Notifier + 'static,
    C: Clock + 'static,
{
    let id = event_id(&id)?;
    let request = body
        .into_request()
        .ok_or_else(|| AppError::bad_request("Invalid request body"))?;

    match request {
        VerifyRequest::Send { email } => {
            let requested = state.service().request_code(id, &email).await?;
            Ok(Json(requested).into_response())
        }
        VerifyRequest::Confirm {
            submission_id,
            code,
        } => {
            let submission_id: SubmissionId = submission_id
                .parse()
                .map_err(|_| SignupError::CodeNotFound)?;
            let confirmed = state
                .service()
                .confirm_code(id, submission_id, &code)
                .await?;
            Ok(Json(confirmed).into_response())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn mode(body: Value) -> Option<VerifyRequest> {
        serde_json::from_value::<VerifyBody>(body)
            .unwrap()
            .into_request()
    }

    #[test]
    fn test_email_selects_send_mode() {
        assert_eq!(
            mode(json!({"email": "a@example.com"})),
            Some(VerifyRequest::Send {
                email: "a@example.com".to_string()
            })
        );
    }

    #[test]
    fn test_numeric_code_is_accepted() {
        assert_eq!(
            mode(json!({"submission_id": "abc", "code": 123_456})),
            Some(VerifyRequest::Confirm {
                submission_id: "abc".to_string(),
                code: "123456".to_string()
            })
        );
    }

    #[test]
    fn test_submission_id_wins_over_email() {
        let body = json!({"email": "a@example.com", "submission_id": "abc", "code": "1"});
        assert!(matches!(mode(body), Some(VerifyRequest::Confirm { .. })));
        assert_eq!(
            mode(json!({"email": "a@example.com", "submission_id": "abc"})),
            None
        );
    }

    #[test]
    fn test_other_shapes_are_rejected() {
        assert_eq!(mode(json!({})), None);
        assert_eq!(mode(json!({"email": ""})), None);
        assert_eq!(mode(json!({"code": "123456"})), None);
    }

    #[test]
    fn test_wrongly_typed_fields_do_not_deserialize() {
        assert!(serde_json::from_value::<VerifyBody>(json!({"email": 5})).is_err());
        assert!(serde_json::from_value::<VerifyBody>(json!({"code": true})).is_err());
        assert!(serde_json::from_value::<VerifyBody>(json!([1, 2])).is_err());
    }
}
