use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid email")]
    InvalidEmail,
    #[error("empty password")]
    EmptyPassword,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("email not verified")]
    EmailUnverified,
    #[error("account not approved")]
    AccountNotApproved,
    #[error("invalid session token")]
    TokenInvalid,
    #[error("session token expired")]
    TokenExpired,
    #[error("verification token not found")]
    TokenNotFound,
    #[error("account not eligible")]
    NotEligible,
    #[error("account not found")]
    AccountNotFound,
    #[error("access denied")]
    AccessDenied,
    #[error("locked out: {retry_after_seconds}s remaining")]
    LockedOut { retry_after_seconds: u64 },
    #[error("collaborator call timed out")]
    CollaboratorTimeout,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("password hashing failed")]
    Hashing,
    #[error("failed to generate verification token")]
    TokenGeneration,
}
