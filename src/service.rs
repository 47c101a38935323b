//! Account service facade.
//!
//! Every operation follows the same shape: validate input, check the caller
//! where the action is account-scoped, run the lifecycle transition against
//! the store, and only then talk to the mailer. Collaborator calls are
//! bounded by the configured timeout; mail failures after a successful
//! mutation are logged, never escalated, and the mutation stands.

use secrecy::SecretString;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::account::{Account, Profile, Status, valid_email};
use crate::config::ServiceConfig;
use crate::error::Error;
use crate::lifecycle;
use crate::lockout::LockoutGuard;
use crate::mailer::Mailer;
use crate::password;
use crate::policy;
use crate::store::{AccountStore, InsertOutcome, StoreError, UpdateGuard, UpdateOutcome};
use crate::token::{SessionClaims, TokenSigner};
use crate::verification;

const VERIFY_MAIL_SUBJECT: &str = "Verify your email address";
const RESET_MAIL_SUBJECT: &str = "Your new password";

/// Requested account edits; `None` keeps the current value.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProfileChanges {
    pub email: Option<String>,
    pub password: Option<String>,
    pub merchant_name: Option<String>,
    pub person_in_charge: Option<String>,
    pub phone_number: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub terms_and_conditions: Option<bool>,
}

/// Authentication and account-lifecycle guard over injected collaborators.
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    mailer: Arc<dyn Mailer>,
    signer: TokenSigner,
    lockout: LockoutGuard,
    config: ServiceConfig,
}

impl AccountService {
    #[must_use]
    pub fn new(
        store: Arc<dyn AccountStore>,
        mailer: Arc<dyn Mailer>,
        signing_secret: &SecretString,
        config: ServiceConfig,
    ) -> Self {
        debug!(commit = %crate::GIT_COMMIT_HASH, "account service initialized");
        Self {
            store,
            mailer,
            signer: TokenSigner::new(signing_secret),
            lockout: LockoutGuard::new(),
            config,
        }
    }

    /// Register a merchant account in `(pending, unverified)` and send the
    /// verification email. Registration succeeds even when the mail does not
    /// go out.
    ///
    /// # Errors
    ///
    /// `Error::InvalidEmail`, `Error::EmptyPassword`, or
    /// `Error::DuplicateEmail`, plus collaborator failures.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        profile: Profile,
    ) -> Result<Account, Error> {
        if !valid_email(email) {
            return Err(Error::InvalidEmail);
        }
        if password.is_empty() {
            return Err(Error::EmptyPassword);
        }

        let password_hash = password::hash(password)?;
        let token = verification::generate()?;
        let account =
            lifecycle::registration(email.to_string(), password_hash, profile, token.clone());

        match self.store_call(self.store.insert(account.clone())).await? {
            InsertOutcome::Inserted => {}
            InsertOutcome::DuplicateEmail => return Err(Error::DuplicateEmail),
        }

        self.send_verification_mail(&account, &token).await;
        info!(account_id = %account.id, "account registered");
        Ok(account)
    }

    /// Seed a ready-to-use administrator account. Meant for process
    /// bootstrap, not for request paths.
    ///
    /// # Errors
    ///
    /// `Error::DuplicateEmail` when the address is taken, plus input and
    /// collaborator failures.
    pub async fn bootstrap_admin(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Account, Error> {
        if !valid_email(email) {
            return Err(Error::InvalidEmail);
        }
        if password.is_empty() {
            return Err(Error::EmptyPassword);
        }

        let password_hash = password::hash(password)?;
        let account =
            lifecycle::admin_bootstrap(email.to_string(), password_hash, name.to_string());

        match self.store_call(self.store.insert(account.clone())).await? {
            InsertOutcome::Inserted => {
                info!(account_id = %account.id, "administrator bootstrapped");
                Ok(account)
            }
            InsertOutcome::DuplicateEmail => Err(Error::DuplicateEmail),
        }
    }

    /// Authenticate and issue a session token.
    ///
    /// # Errors
    ///
    /// `Error::InvalidCredentials` for an unknown email or a wrong password,
    /// without distinguishing the two; then `Error::EmailUnverified` and
    /// `Error::AccountNotApproved` in that order.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<String, Error> {
        let account = match self.store_call(self.store.find_by_email(email)).await? {
            Some(account) => account,
            None => return Err(Error::InvalidCredentials),
        };
        if !password::verify(&account.password_hash, password)? {
            return Err(Error::InvalidCredentials);
        }
        if !account.email_verified {
            return Err(Error::EmailUnverified);
        }
        if account.status != Status::Approved {
            return Err(Error::AccountNotApproved);
        }
        self.signer.issue(account.id, &account.email, account.role)
    }

    /// Redeem a verification token, marking the email verified and clearing
    /// the token in one conditional update.
    ///
    /// # Errors
    ///
    /// `Error::TokenNotFound` for an unknown, already redeemed, or raced
    /// token.
    pub async fn verify_email(&self, token: &str) -> Result<Account, Error> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::TokenNotFound);
        }

        let account = match self
            .store_call(self.store.find_by_verification_token(token))
            .await?
        {
            Some(account) => account,
            None => return Err(Error::TokenNotFound),
        };

        let outcome = self
            .store_call(self.store.update(
                account.id,
                lifecycle::redemption(),
                UpdateGuard::VerificationTokenIs(token.to_string()),
            ))
            .await?;
        match outcome {
            UpdateOutcome::Updated(account) => {
                info!(account_id = %account.id, "email verified");
                Ok(account)
            }
            // A concurrent redemption consumed the token between lookup and
            // update.
            UpdateOutcome::PreconditionFailed | UpdateOutcome::NotFound => {
                Err(Error::TokenNotFound)
            }
            UpdateOutcome::DuplicateEmail => Err(Error::DuplicateEmail),
        }
    }

    /// Replace the caller's password with a generated one and mail it, under
    /// the per-email lockout guard.
    ///
    /// An unknown or ineligible email counts as a failed attempt; the fifth
    /// consecutive failure arms a 15 minute lockout. Success clears the
    /// counter. Collaborator failures are surfaced as-is and do not count.
    ///
    /// # Errors
    ///
    /// `Error::AccountNotFound`, `Error::NotEligible`, or
    /// `Error::LockedOut`, plus input and collaborator failures.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), Error> {
        if !valid_email(email) {
            return Err(Error::InvalidEmail);
        }
        self.lockout.check(email).await?;

        let account = match self.store_call(self.store.find_by_email(email)).await? {
            Some(account) => account,
            None => {
                self.lockout.record_failure(email).await?;
                return Err(Error::AccountNotFound);
            }
        };
        if !lifecycle::reset_eligible(&account) {
            self.lockout.record_failure(email).await?;
            return Err(Error::NotEligible);
        }

        let new_password = password::generate_password();
        let password_hash = password::hash(&new_password)?;
        let outcome = self
            .store_call(self.store.update(
                account.id,
                lifecycle::credential_reset(password_hash),
                UpdateGuard::Always,
            ))
            .await?;
        let account = match outcome {
            UpdateOutcome::Updated(account) => account,
            _ => return Err(Error::AccountNotFound),
        };

        self.lockout.clear(email).await;
        self.send_reset_mail(&account, &new_password).await;
        info!(account_id = %account.id, "password reset issued");
        Ok(())
    }

    /// Approve a verified account. Administrator only; re-approving an
    /// approved account is a no-op.
    ///
    /// # Errors
    ///
    /// `Error::AccessDenied`, `Error::AccountNotFound`, or
    /// `Error::NotEligible` while the email is unverified.
    pub async fn approve(
        &self,
        caller: &SessionClaims,
        target_id: Uuid,
    ) -> Result<Account, Error> {
        policy::can_administer(caller.role)?;

        let account = match self.store_call(self.store.find_by_id(target_id)).await? {
            Some(account) => account,
            None => return Err(Error::AccountNotFound),
        };
        let update = lifecycle::approval(&account)?;

        match self
            .store_call(self.store.update(target_id, update, UpdateGuard::Always))
            .await?
        {
            UpdateOutcome::Updated(account) => {
                info!(account_id = %account.id, approved_by = %caller.sub, "account approved");
                Ok(account)
            }
            UpdateOutcome::NotFound | UpdateOutcome::PreconditionFailed => {
                Err(Error::AccountNotFound)
            }
            UpdateOutcome::DuplicateEmail => Err(Error::DuplicateEmail),
        }
    }

    /// Validate a session token and return its claims. Pure check; no store
    /// round-trip.
    ///
    /// # Errors
    ///
    /// `Error::TokenExpired` or `Error::TokenInvalid`.
    pub fn validate_session(&self, token: &str) -> Result<SessionClaims, Error> {
        self.signer.validate(token)
    }

    /// Fetch an account, self-or-admin.
    ///
    /// # Errors
    ///
    /// `Error::AccessDenied` or `Error::AccountNotFound`.
    pub async fn get_account(
        &self,
        caller: &SessionClaims,
        target_id: Uuid,
    ) -> Result<Account, Error> {
        policy::can_act(caller.sub, caller.role, target_id)?;
        match self.store_call(self.store.find_by_id(target_id)).await? {
            Some(account) => Ok(account),
            None => Err(Error::AccountNotFound),
        }
    }

    /// List every account. Administrator only.
    ///
    /// # Errors
    ///
    /// `Error::AccessDenied` for non-administrators.
    pub async fn list_accounts(&self, caller: &SessionClaims) -> Result<Vec<Account>, Error> {
        policy::can_administer(caller.role)?;
        self.store_call(self.store.list()).await
    }

    /// Edit an account, self-or-admin. Changing the email address revokes
    /// verification and sends a fresh verification mail to the new address,
    /// all in one update unit. The new email is compared against the stored
    /// record, so an edit that restates the current address is a plain edit.
    ///
    /// # Errors
    ///
    /// `Error::AccessDenied`, `Error::AccountNotFound`,
    /// `Error::DuplicateEmail` when the new address is taken, plus input and
    /// collaborator failures.
    pub async fn update_profile(
        &self,
        caller: &SessionClaims,
        target_id: Uuid,
        changes: ProfileChanges,
    ) -> Result<Account, Error> {
        policy::can_act(caller.sub, caller.role, target_id)?;

        let account = match self.store_call(self.store.find_by_id(target_id)).await? {
            Some(account) => account,
            None => return Err(Error::AccountNotFound),
        };

        if let Some(new_email) = changes.email.as_deref() {
            if !valid_email(new_email) {
                return Err(Error::InvalidEmail);
            }
        }
        let password_hash = match changes.password.as_deref() {
            Some("") => return Err(Error::EmptyPassword),
            Some(password) => Some(password::hash(password)?),
            None => None,
        };

        let profile = merged_profile(&account, &changes);
        let new_email = changes.email.filter(|email| *email != account.email);

        let (update, fresh_token) = match new_email {
            Some(email) => {
                let token = verification::generate()?;
                (
                    lifecycle::email_change(email, profile, password_hash, token.clone()),
                    Some(token),
                )
            }
            None => (lifecycle::profile_edit(profile, password_hash), None),
        };

        let updated = match self
            .store_call(self.store.update(target_id, update, UpdateGuard::Always))
            .await?
        {
            UpdateOutcome::Updated(account) => account,
            UpdateOutcome::DuplicateEmail => return Err(Error::DuplicateEmail),
            UpdateOutcome::NotFound | UpdateOutcome::PreconditionFailed => {
                return Err(Error::AccountNotFound);
            }
        };

        if let Some(token) = fresh_token {
            self.send_verification_mail(&updated, &token).await;
        }
        Ok(updated)
    }

    /// Remove an account, self-or-admin.
    ///
    /// # Errors
    ///
    /// `Error::AccessDenied` or `Error::AccountNotFound`.
    pub async fn delete_account(
        &self,
        caller: &SessionClaims,
        target_id: Uuid,
    ) -> Result<(), Error> {
        policy::can_act(caller.sub, caller.role, target_id)?;
        if self.store_call(self.store.delete(target_id)).await? {
            info!(account_id = %target_id, "account deleted");
            Ok(())
        } else {
            Err(Error::AccountNotFound)
        }
    }

    async fn store_call<T, F>(&self, call: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match timeout(self.config.collaborator_timeout(), call).await {
            Ok(result) => result.map_err(Error::from),
            Err(_) => Err(Error::CollaboratorTimeout),
        }
    }

    async fn send_verification_mail(&self, account: &Account, token: &str) {
        let link = self.config.verify_url(token);
        let body = format!(
            "<p>Dear {name},</p>\
             <p>Please verify your email address by clicking \
             <a href=\"{link}\">this link</a>.</p>\
             <p>If you did not expect this email, you can ignore it.</p>",
            name = account.profile.merchant_name,
        );
        self.send_mail(&account.email, VERIFY_MAIL_SUBJECT, &body)
            .await;
    }

    async fn send_reset_mail(&self, account: &Account, new_password: &str) {
        let body = format!(
            "<p>Dear {name},</p>\
             <p>Your new password is <strong>{new_password}</strong>. \
             Please sign in and change it.</p>",
            name = account.profile.merchant_name,
        );
        self.send_mail(&account.email, RESET_MAIL_SUBJECT, &body)
            .await;
    }

    async fn send_mail(&self, recipient: &str, subject: &str, body: &str) {
        let recipients = vec![recipient.to_string()];
        let send = self.mailer.send(&recipients, subject, body);
        match timeout(self.config.collaborator_timeout(), send).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!("failed to send \"{subject}\" mail: {err}"),
            Err(_) => error!("sending \"{subject}\" mail timed out"),
        }
    }
}

fn merged_profile(account: &Account, changes: &ProfileChanges) -> Profile {
    let current = account.profile.clone();
    Profile {
        merchant_name: changes
            .merchant_name
            .clone()
            .unwrap_or(current.merchant_name),
        person_in_charge: changes
            .person_in_charge
            .clone()
            .unwrap_or(current.person_in_charge),
        phone_number: changes.phone_number.clone().unwrap_or(current.phone_number),
        website: changes.website.clone().unwrap_or(current.website),
        address: changes.address.clone().unwrap_or(current.address),
        terms_and_conditions: changes
            .terms_and_conditions
            .unwrap_or(current.terms_and_conditions),
    }
}
