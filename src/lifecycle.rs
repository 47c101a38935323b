//! Account lifecycle transitions.
//!
//! Two one-way axes: `unverified -> verified` and `pending -> approved`.
//! Approval is an administrator action orthogonal to verification; sign-in
//! requires both. The builders here are pure: they produce the record or the
//! sparse update to persist, and the caller owns the store round-trip.

use chrono::Utc;
use uuid::Uuid;

use crate::account::{Account, Profile, Role, Status};
use crate::error::Error;
use crate::store::AccountUpdate;

/// Build a fresh merchant account in `(pending, unverified)` with an
/// outstanding verification token.
#[must_use]
pub fn registration(
    email: String,
    password_hash: String,
    profile: Profile,
    verification_token: String,
) -> Account {
    let now = Utc::now();
    Account {
        id: Uuid::new_v4(),
        email,
        password_hash,
        role: Role::Merchant,
        status: Status::Pending,
        email_verified: false,
        verification_token: Some(verification_token),
        profile,
        created_at: now,
        updated_at: now,
    }
}

/// Build an administrator account that starts verified and approved, for
/// bootstrap seeding only.
#[must_use]
pub fn admin_bootstrap(email: String, password_hash: String, name: String) -> Account {
    let now = Utc::now();
    Account {
        id: Uuid::new_v4(),
        email,
        password_hash,
        role: Role::Administrator,
        status: Status::Approved,
        email_verified: true,
        verification_token: None,
        profile: Profile {
            merchant_name: name.clone(),
            person_in_charge: name,
            terms_and_conditions: true,
            ..Profile::default()
        },
        created_at: now,
        updated_at: now,
    }
}

/// Update which marks the email verified and clears the outstanding token.
///
/// Persist it with a token-match guard so redemption applies at most once.
#[must_use]
pub fn redemption() -> AccountUpdate {
    AccountUpdate {
        email_verified: Some(true),
        verification_token: Some(None),
        ..AccountUpdate::default()
    }
}

/// Update which moves a verified account to `approved`. Re-approving an
/// already approved account is a no-op that refreshes `updated_at`.
///
/// # Errors
///
/// `Error::NotEligible` while the email is unverified.
pub fn approval(account: &Account) -> Result<AccountUpdate, Error> {
    if !account.email_verified {
        return Err(Error::NotEligible);
    }
    Ok(AccountUpdate {
        status: Some(Status::Approved),
        ..AccountUpdate::default()
    })
}

/// Update for a profile edit that keeps the current email address.
#[must_use]
pub fn profile_edit(profile: Profile, password_hash: Option<String>) -> AccountUpdate {
    AccountUpdate {
        password_hash,
        profile: Some(profile),
        ..AccountUpdate::default()
    }
}

/// Update for an edit that moves the account to a new email address.
///
/// Trust in the old address does not carry over: the verified flag drops and
/// a fresh token becomes outstanding, in the same update unit as the address
/// itself.
#[must_use]
pub fn email_change(
    new_email: String,
    profile: Profile,
    password_hash: Option<String>,
    verification_token: String,
) -> AccountUpdate {
    AccountUpdate {
        email: Some(new_email),
        password_hash,
        email_verified: Some(false),
        verification_token: Some(Some(verification_token)),
        profile: Some(profile),
        ..AccountUpdate::default()
    }
}

/// Update which replaces the stored credential after a password reset.
#[must_use]
pub fn credential_reset(password_hash: String) -> AccountUpdate {
    AccountUpdate {
        password_hash: Some(password_hash),
        ..AccountUpdate::default()
    }
}

/// Whether an account may go through the password-reset flow. Unverified or
/// unapproved accounts count as failed resolutions for the lockout guard.
#[must_use]
pub fn reset_eligible(account: &Account) -> bool {
    account.email_verified && account.status == Status::Approved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_starts_pending_and_unverified() {
        let account = registration(
            "shop@example.com".to_string(),
            "$argon2id$stub".to_string(),
            Profile::default(),
            "token".to_string(),
        );
        assert_eq!(account.status, Status::Pending);
        assert_eq!(account.role, Role::Merchant);
        assert!(!account.email_verified);
        assert_eq!(account.verification_token.as_deref(), Some("token"));
        assert_eq!(account.created_at, account.updated_at);
    }

    #[test]
    fn admin_bootstrap_starts_verified_and_approved() {
        let account = admin_bootstrap(
            "root@example.com".to_string(),
            "$argon2id$stub".to_string(),
            "Root".to_string(),
        );
        assert_eq!(account.role, Role::Administrator);
        assert_eq!(account.status, Status::Approved);
        assert!(account.email_verified);
        assert!(account.verification_token.is_none());
        assert_eq!(account.profile.merchant_name, "Root");
    }

    #[test]
    fn redemption_clears_the_token() {
        let update = redemption();
        assert_eq!(update.email_verified, Some(true));
        assert_eq!(update.verification_token, Some(None));
        assert!(update.email.is_none());
    }

    #[test]
    fn approval_requires_verified_email() {
        let mut account = registration(
            "shop@example.com".to_string(),
            "$argon2id$stub".to_string(),
            Profile::default(),
            "token".to_string(),
        );
        assert!(matches!(approval(&account), Err(Error::NotEligible)));

        account.email_verified = true;
        let update = approval(&account).unwrap();
        assert_eq!(update.status, Some(Status::Approved));
    }

    #[test]
    fn email_change_revokes_verification_atomically() {
        let update = email_change(
            "new@example.com".to_string(),
            Profile::default(),
            None,
            "fresh-token".to_string(),
        );
        assert_eq!(update.email.as_deref(), Some("new@example.com"));
        assert_eq!(update.email_verified, Some(false));
        assert_eq!(
            update.verification_token,
            Some(Some("fresh-token".to_string()))
        );
    }

    #[test]
    fn plain_profile_edit_leaves_verification_alone() {
        let update = profile_edit(Profile::default(), None);
        assert!(update.email.is_none());
        assert!(update.email_verified.is_none());
        assert!(update.verification_token.is_none());
    }

    #[test]
    fn reset_eligibility_requires_both_flags() {
        let mut account = registration(
            "shop@example.com".to_string(),
            "$argon2id$stub".to_string(),
            Profile::default(),
            "token".to_string(),
        );
        assert!(!reset_eligible(&account));
        account.email_verified = true;
        assert!(!reset_eligible(&account));
        account.status = Status::Approved;
        assert!(reset_eligible(&account));
    }
}
