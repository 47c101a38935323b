//! Password hashing and verification.
//!
//! Argon2id with a per-hash random salt; digests carry their own parameters,
//! so two hashes of the same plaintext always differ and verification needs
//! no side configuration.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::{Rng, rngs::OsRng, seq::SliceRandom};

use crate::error::Error;

const GENERATED_PASSWORD_LEN: usize = 8;
const UPPER_LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER_LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const NUMBERS: &[u8] = b"0123456789";
const SPECIAL_CHARS: &[u8] = b"!@#$%^&*()-_+=<>?{}[]|";

/// Hash a plaintext with Argon2id and a fresh random salt.
///
/// # Errors
///
/// `Error::Hashing` only when the hasher itself fails; never for any
/// particular plaintext.
pub fn hash(plaintext: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|digest| digest.to_string())
        .map_err(|_| Error::Hashing)
}

/// Check a plaintext against a stored digest.
///
/// A mismatch is `Ok(false)`, not an error.
///
/// # Errors
///
/// `Error::Hashing` when the digest cannot be parsed or verification fails
/// for a reason other than a mismatch.
pub fn verify(digest: &str, plaintext: &str) -> Result<bool, Error> {
    let parsed = PasswordHash::new(digest).map_err(|_| Error::Hashing)?;
    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(_) => Err(Error::Hashing),
    }
}

/// Generate a short random password for the reset flow, with at least one
/// character from each class (upper, lower, digit, special).
#[must_use]
pub fn generate_password() -> String {
    let mut rng = OsRng;
    let all_chars: Vec<u8> = [UPPER_LETTERS, LOWER_LETTERS, NUMBERS, SPECIAL_CHARS].concat();

    let mut password = vec![
        pick(&mut rng, UPPER_LETTERS),
        pick(&mut rng, LOWER_LETTERS),
        pick(&mut rng, NUMBERS),
        pick(&mut rng, SPECIAL_CHARS),
    ];
    while password.len() < GENERATED_PASSWORD_LEN {
        password.push(pick(&mut rng, &all_chars));
    }
    password.shuffle(&mut rng);

    String::from_utf8_lossy(&password).into_owned()
}

fn pick<R: Rng + ?Sized>(rng: &mut R, alphabet: &[u8]) -> u8 {
    alphabet.choose(rng).copied().unwrap_or(b'0')
}
