//! Signed session tokens.
//!
//! HS256 only, against a process-wide shared secret; any other algorithm in
//! an inbound token is treated as a forgery. Claims are a fixed record, not
//! an open map. Expiry is a fixed 72 hour policy from issue time. There is
//! no revocation list: rotating the secret invalidates every outstanding
//! token, which is the accepted recovery path for a compromised secret.

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::Role;
use crate::error::Error;

const SESSION_TTL_HOURS: i64 = 72;

/// Claims carried by a session token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: i64,
}

/// Issues and validates session tokens for one signing secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a token for the given identity, expiring 72 hours from now.
    ///
    /// # Errors
    ///
    /// `Error::TokenInvalid` when claim serialization fails, which does not
    /// happen for well-formed inputs.
    pub fn issue(&self, id: Uuid, email: &str, role: Role) -> Result<String, Error> {
        let claims = SessionClaims {
            sub: id,
            email: email.to_string(),
            role,
            exp: (Utc::now() + chrono::Duration::hours(SESSION_TTL_HOURS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(|_| Error::TokenInvalid)
    }

    /// Validate a token and return its claims.
    ///
    /// # Errors
    ///
    /// `Error::TokenExpired` once past the expiry claim; `Error::TokenInvalid`
    /// for any signature, algorithm, or shape mismatch.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, Error> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => Error::TokenExpired,
                _ => Error::TokenInvalid,
            })
    }
}
