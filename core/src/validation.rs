//! Input rules for event creation and participant submissions.
//!
//! Request bodies deserialize into the `*Draft` types with every field
//! defaulted, so a missing field surfaces as a named validation error rather
//! than a parse failure. Each draft has exactly one `validate` step that runs
//! before any domain logic.

use crate::error::{Result, SignupError};
use crate::types::{EventOption, OptionId};
use serde::Deserialize;
use std::collections::HashSet;

/// Capacity applied when an option omits it.
pub const DEFAULT_CAPACITY: u32 = 1;

// ═══════════════════════════════════════════════════════════════════════
// Event creation
// ═══════════════════════════════════════════════════════════════════════

/// Raw event creation request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventDraft {
    /// Event title (required).
    pub title: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Gate submissions on email verification.
    pub email_verification: Option<bool>,
    /// Options in display order.
    pub options: Vec<OptionDraft>,
}

/// Raw option inside an [`EventDraft`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OptionDraft {
    /// Option name (required).
    pub name: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Seats; defaults to [`DEFAULT_CAPACITY`].
    pub capacity: Option<i64>,
}

/// An [`EventDraft`] that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    /// Trimmed title.
    pub title: String,
    /// Trimmed description, `None` when blank.
    pub description: Option<String>,
    /// Verification flag.
    pub email_verification: bool,
    /// Options; index is the sort position.
    pub options: Vec<NewOption>,
}

/// An [`OptionDraft`] that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOption {
    /// Trimmed name.
    pub name: String,
    /// Trimmed description, `None` when blank.
    pub description: Option<String>,
    /// Seats, at least one.
    pub capacity: u32,
}

impl EventDraft {
    /// Check the draft and normalize its text fields.
    ///
    /// # Errors
    ///
    /// [`SignupError::InvalidField`] naming `title`, `options`,
    /// `options.name` or `options.capacity`.
    pub fn validate(self) -> Result<NewEvent> {
        let title = non_blank(self.title)
            .ok_or_else(|| SignupError::invalid_field("title", "Title is required"))?;

        if self.options.is_empty() {
            return Err(SignupError::invalid_field(
                "options",
                "At least one option is required",
            ));
        }

        let options = self
            .options
            .into_iter()
            .map(OptionDraft::validate)
            .collect::<Result<Vec<_>>>()?;

        Ok(NewEvent {
            title,
            description: non_blank(self.description),
            email_verification: self.email_verification.unwrap_or(false),
            options,
        })
    }
}

impl OptionDraft {
    fn validate(self) -> Result<NewOption> {
        let name = non_blank(self.name)
            .ok_or_else(|| SignupError::invalid_field("options.name", "Each option must have a name"))?;

        let capacity = match self.capacity {
            None => DEFAULT_CAPACITY,
            Some(raw) => u32::try_from(raw)
                .ok()
                .filter(|c| *c >= 1)
                .ok_or_else(|| {
                    SignupError::invalid_field(
                        "options.capacity",
                        "Option capacity must be at least 1",
                    )
                })?,
        };

        Ok(NewOption {
            name,
            description: non_blank(self.description),
            capacity,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ═══════════════════════════════════════════════════════════════════════
// Submissions
// ═══════════════════════════════════════════════════════════════════════

/// Raw ranking submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubmissionDraft {
    /// Participant email, any case.
    pub email: Option<String>,
    /// Option ids, most preferred first.
    pub rankings: Option<Vec<String>>,
}

/// A [`SubmissionDraft`] checked against the target event's options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    /// Normalized email.
    pub email: String,
    /// Resolved ranking.
    pub rankings: Vec<OptionId>,
}

impl SubmissionDraft {
    /// Validate against `options` of the target event.
    ///
    /// # Errors
    ///
    /// See [`validate_email`] and [`validate_rankings`].
    pub fn validate(&self, options: &[EventOption]) -> Result<ValidSubmission> {
        let email = validate_email(self.email.as_deref().unwrap_or_default())?;
        let rankings = validate_rankings(self.rankings.as_deref().unwrap_or_default(), options)?;
        Ok(ValidSubmission { email, rankings })
    }
}

/// Trim and lowercase an email.
#[must_use]
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Accepts `local@domain.tld`: no whitespace, exactly one `@`, and a dot in
/// the domain with text on both sides.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Normalize `raw` and check its shape.
///
/// # Errors
///
/// [`SignupError::InvalidEmail`] when the normalized value is malformed.
pub fn validate_email(raw: &str) -> Result<String> {
    let email = normalize_email(raw);
    if is_valid_email(&email) {
        Ok(email)
    } else {
        Err(SignupError::InvalidEmail)
    }
}

/// Resolve a ranking against the event's options.
///
/// Unknown ids are reported before duplicates.
///
/// # Errors
///
/// - [`SignupError::EmptyRankings`] for an empty list
/// - [`SignupError::InvalidOption`] naming the first unknown id
/// - [`SignupError::DuplicateRanking`] naming the first repeated id
pub fn validate_rankings(raw: &[String], options: &[EventOption]) -> Result<Vec<OptionId>> {
    if raw.is_empty() {
        return Err(SignupError::EmptyRankings);
    }

    let known: HashSet<OptionId> = options.iter().map(|o| o.id).collect();

    let resolved = raw
        .iter()
        .map(|id| {
            id.parse::<OptionId>()
                .ok()
                .filter(|parsed| known.contains(parsed))
                .ok_or_else(|| SignupError::InvalidOption {
                    option_id: id.clone(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::with_capacity(resolved.len());
    for (id, original) in resolved.iter().zip(raw) {
        if !seen.insert(*id) {
            return Err(SignupError::DuplicateRanking {
                option_id: original.clone(),
            });
        }
    }

    Ok(resolved)
}
