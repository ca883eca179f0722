//! Admin credential issuance and verification.
//!
//! The plaintext credential is handed to the event creator exactly once; only
//! its SHA-256 digest is stored on the event.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// Number of random bytes in an admin credential (base64url, 43 chars).
pub const ADMIN_TOKEN_BYTES: usize = 32;

/// A freshly issued credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Plaintext credential. Return it to the caller, never persist it.
    pub plaintext: String,
    /// Hex SHA-256 digest to persist.
    pub digest: String,
}

/// Derives and checks one-way digests of admin credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenAuthenticator;

impl TokenAuthenticator {
    /// Create a new authenticator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Issue a new random credential along with its digest.
    #[must_use]
    pub fn issue(&self) -> IssuedToken {
        let mut bytes = [0u8; ADMIN_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let plaintext = URL_SAFE_NO_PAD.encode(bytes);
        let digest = Self::digest(&plaintext);
        IssuedToken { plaintext, digest }
    }

    /// Hex SHA-256 of `plaintext`.
    #[must_use]
    pub fn digest(plaintext: &str) -> String {
        hex::encode(Sha256::digest(plaintext.as_bytes()))
    }

    /// Check `plaintext` against a stored digest.
    #[must_use]
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let candidate = Self::digest(plaintext);
        constant_time_eq::constant_time_eq(candidate.as_bytes(), digest.as_bytes())
    }
}

/// Pick the admin credential out of a request.
///
/// `query` is the `token` query parameter, `authorization` the raw
/// `Authorization` header value. The query parameter wins when both are
/// present; empty values count as absent. `None` means unauthenticated.
#[must_use]
pub fn extract_credential(query: Option<&str>, authorization: Option<&str>) -> Option<String> {
    if let Some(token) = query.filter(|t| !t.is_empty()) {
        return Some(token.to_string());
    }

    authorization
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
}
