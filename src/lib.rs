//! # Komerco (Authentication & Account-Lifecycle Guard)
//!
//! `komerco` is the authentication and account-lifecycle core of a merchant
//! platform. It owns credential hashing, session tokens, the email
//! verification and approval state machine, and the brute-force guard around
//! password reset.
//!
//! ## Account Lifecycle
//!
//! Accounts move along two independent axes, both one-way:
//!
//! - **Verification:** `unverified` to `verified`, by redeeming a single-use
//!   emailed token. Changing the email address drops the account back to
//!   `unverified` with a fresh token outstanding.
//! - **Approval:** `pending` to `approved`, by an administrator, and only
//!   once the email is verified.
//!
//! Sign-in requires both: an unverified account is reported before an
//! unapproved one.
//!
//! ## Credentials & Sessions
//!
//! Passwords are stored as **Argon2id** digests with per-password random
//! salts. Sessions are **HS256** tokens carrying exactly the account id,
//! email, role, and a 72 hour expiry; validation is pure and needs no store
//! round-trip.
//!
//! ## Password Reset & Lockout
//!
//! A reset replaces the password with a generated one delivered over email.
//! Failed resolutions count per email address: the fifth consecutive failure
//! locks the address out for 15 minutes. Unknown and ineligible addresses
//! both count; infrastructure failures never do.
//!
//! ## Collaborators
//!
//! The account store and the mailer are injected behind traits and every
//! call to them is bounded by a configurable timeout. A mail failure after a
//! successful mutation is logged and swallowed; the mutation stands.

pub mod account;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod lockout;
pub mod mailer;
pub mod password;
pub mod policy;
pub mod service;
pub mod store;
pub mod token;
pub mod verification;

pub use account::{Account, Profile, Role, Status};
pub use config::ServiceConfig;
pub use error::Error;
pub use mailer::{LogMailer, Mailer};
pub use service::{AccountService, ProfileChanges};
pub use store::{AccountStore, MemoryAccountStore, StoreError};
pub use token::SessionClaims;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
