//! Verification code issuance and confirm-time checks.

use crate::error::{Result, SignupError};
use crate::types::{SubmissionId, VerificationCode};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::rngs::OsRng;

/// Digits in a verification code.
pub const CODE_DIGITS: usize = 6;

/// Issue a fresh code for `submission_id`, valid for `ttl` from `now`.
#[must_use]
pub fn issue_code(submission_id: SubmissionId, now: DateTime<Utc>, ttl: Duration) -> VerificationCode {
    let code: u32 = OsRng.gen_range(100_000..1_000_000);
    VerificationCode {
        submission_id,
        code: code.to_string(),
        expires_at: now + ttl,
    }
}

/// Check `supplied` against the most recently issued code.
///
/// Expiry is evaluated before the comparison; surrounding whitespace in
/// `supplied` is ignored.
///
/// # Errors
///
/// - [`SignupError::CodeNotFound`] when no code is outstanding
/// - [`SignupError::CodeExpired`] when `now` is past the expiry
/// - [`SignupError::CodeIncorrect`] on mismatch
pub fn check_code(
    latest: Option<&VerificationCode>,
    supplied: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    let record = latest.ok_or(SignupError::CodeNotFound)?;
    if record.is_expired(now) {
        return Err(SignupError::CodeExpired);
    }
    if record.code != supplied.trim() {
        return Err(SignupError::CodeIncorrect);
    }
    Ok(())
}
