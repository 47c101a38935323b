//! One-time verification tokens for email confirmation.
//!
//! Tokens are never derived from user input. Single-use semantics live in the
//! store round-trip: redemption is a conditional update that only applies
//! while the stored token still matches, so a replayed token finds nothing.

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{RngCore, rngs::OsRng};

use crate::error::Error;

const TOKEN_BYTES: usize = 32;

/// Create a new verification token for email links.
///
/// # Errors
///
/// Fails only when the system entropy source is unavailable.
pub fn generate() -> Result<String, Error> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|_| Error::TokenGeneration)?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}
