//! Human-typable event join codes.

use rand::RngCore;
use rand::rngs::OsRng;

/// 32 symbols: A-Z and 2-9 without the look-alikes I, O, 0 and 1.
pub const JOIN_CODE_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Symbols per code, excluding the separator.
pub const JOIN_CODE_LEN: usize = 8;

/// Produces `XXXX-XXXX` codes from the OS random source.
///
/// Uniqueness is enforced by the store; with 32^8 (about 10^12) codes,
/// collisions are rare enough that a retry on conflict suffices.
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinCodeGenerator;

impl JoinCodeGenerator {
    /// Create a new generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Generate a code.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut bytes = [0u8; JOIN_CODE_LEN];
        OsRng.fill_bytes(&mut bytes);

        let mut code = String::with_capacity(JOIN_CODE_LEN + 1);
        for (i, b) in bytes.iter().enumerate() {
            if i == JOIN_CODE_LEN / 2 {
                code.push('-');
            }
            // 256 is a multiple of 32, so the modulo is unbiased.
            code.push(char::from(JOIN_CODE_ALPHABET[usize::from(*b) % JOIN_CODE_ALPHABET.len()]));
        }
        code
    }
}

/// Whether `code` has the `XXXX-XXXX` shape over the join code alphabet.
#[must_use]
pub fn is_well_formed(code: &str) -> bool {
    let bytes = code.as_bytes();
    bytes.len() == JOIN_CODE_LEN + 1
        && bytes.iter().enumerate().all(|(i, b)| {
            if i == JOIN_CODE_LEN / 2 {
                *b == b'-'
            } else {
                JOIN_CODE_ALPHABET.contains(b)
            }
        })
}
