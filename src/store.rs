//! Account persistence contract and the in-process reference store.
//!
//! The store owns the persisted records; the rest of the crate holds
//! transient copies. Single-use token semantics lean on [`UpdateGuard`]: the
//! store applies an update only while its predicate still holds, so two
//! racing redemptions of one token cannot both succeed.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::account::{Account, Profile, Status};

/// Failure surfaced by a store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable")]
    Unavailable,
    #[error("store operation failed: {0}")]
    Backend(String),
}

/// Outcome of [`AccountStore::insert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    DuplicateEmail,
}

/// Outcome of [`AccountStore::update`].
#[derive(Clone, Debug)]
pub enum UpdateOutcome {
    /// The update applied; carries the record as persisted.
    Updated(Account),
    NotFound,
    /// The [`UpdateGuard`] predicate no longer held.
    PreconditionFailed,
    /// The new email is already taken by another account.
    DuplicateEmail,
}

/// Predicate an update must satisfy against the current record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateGuard {
    /// Apply unconditionally.
    Always,
    /// Apply only while the stored verification token equals the given one.
    VerificationTokenIs(String),
}

/// Sparse field updates applied by [`AccountStore::update`].
///
/// `None` leaves a field untouched. `verification_token` is doubly optional
/// so an update can distinguish "leave as is" (`None`) from "clear the
/// outstanding token" (`Some(None)`).
#[derive(Clone, Debug, Default)]
pub struct AccountUpdate {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub status: Option<Status>,
    pub email_verified: Option<bool>,
    pub verification_token: Option<Option<String>>,
    pub profile: Option<Profile>,
}

/// Document-store collaborator owning account records.
///
/// Implementations decide durability and indexing; callers bound every
/// operation with their own timeout.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    async fn find_by_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<Account>, StoreError>;

    /// Insert a new record; reports rather than errors on a taken email.
    async fn insert(&self, account: Account) -> Result<InsertOutcome, StoreError>;

    /// Apply `update` to the record `id` while `guard` holds, refreshing the
    /// record's `updated_at`.
    async fn update(
        &self,
        id: Uuid,
        update: AccountUpdate,
        guard: UpdateGuard,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Remove the record `id`; `false` when no such record exists.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn list(&self) -> Result<Vec<Account>, StoreError>;
}

/// In-process store for tests and local development.
///
/// All operations run under one async mutex, which matches the conditional
/// update guarantees a real document store provides per record.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<HashMap<Uuid, Account>>,
}

impl MemoryAccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().await;
        Ok(accounts
            .values()
            .find(|account| account.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.get(&id).cloned())
    }

    async fn find_by_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().await;
        Ok(accounts
            .values()
            .find(|account| account.verification_token.as_deref() == Some(token))
            .cloned())
    }

    async fn insert(&self, account: Account) -> Result<InsertOutcome, StoreError> {
        let mut accounts = self.accounts.lock().await;
        if accounts
            .values()
            .any(|existing| existing.email == account.email)
        {
            return Ok(InsertOutcome::DuplicateEmail);
        }
        accounts.insert(account.id, account);
        Ok(InsertOutcome::Inserted)
    }

    async fn update(
        &self,
        id: Uuid,
        update: AccountUpdate,
        guard: UpdateGuard,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut accounts = self.accounts.lock().await;

        if let Some(new_email) = update.email.as_deref() {
            let taken = accounts
                .values()
                .any(|existing| existing.id != id && existing.email == new_email);
            if taken {
                return Ok(UpdateOutcome::DuplicateEmail);
            }
        }

        let Some(account) = accounts.get_mut(&id) else {
            return Ok(UpdateOutcome::NotFound);
        };

        match &guard {
            UpdateGuard::Always => {}
            UpdateGuard::VerificationTokenIs(token) => {
                if account.verification_token.as_deref() != Some(token.as_str()) {
                    return Ok(UpdateOutcome::PreconditionFailed);
                }
            }
        }

        if let Some(email) = update.email {
            account.email = email;
        }
        if let Some(password_hash) = update.password_hash {
            account.password_hash = password_hash;
        }
        if let Some(status) = update.status {
            account.status = status;
        }
        if let Some(email_verified) = update.email_verified {
            account.email_verified = email_verified;
        }
        if let Some(verification_token) = update.verification_token {
            account.verification_token = verification_token;
        }
        if let Some(profile) = update.profile {
            account.profile = profile;
        }
        account.updated_at = Utc::now();

        Ok(UpdateOutcome::Updated(account.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut accounts = self.accounts.lock().await;
        Ok(accounts.remove(&id).is_some())
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        let accounts = self.accounts.lock().await;
        let mut all: Vec<Account> = accounts.values().cloned().collect();
        all.sort_by_key(|account| (account.created_at, account.id));
        Ok(all)
    }
}
