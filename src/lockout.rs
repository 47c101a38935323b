//! Failed-attempt tracking and timed lockout for the password-reset flow.
//!
//! One record per email behind a single lock. The read-check-increment
//! sequence for a key happens entirely under that lock, so parallel attempts
//! against the same email cannot both slip past the threshold, and a failure
//! landing after the lockout armed cannot push the count further.
//!
//! State is process-lifetime only; a restart forgets it. This is abuse
//! mitigation, not an audit log.

use std::collections::HashMap;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::error::Error;

const MAX_FAILED_ATTEMPTS: u32 = 5;
const LOCKOUT_WINDOW: Duration = Duration::from_secs(15 * 60);

#[derive(Clone, Copy, Debug, Default)]
struct LockoutRecord {
    failed_count: u32,
    locked_until: Option<Instant>,
}

/// Keyed lockout state for password-reset attempts.
#[derive(Debug, Default)]
pub struct LockoutGuard {
    records: Mutex<HashMap<String, LockoutRecord>>,
}

impl LockoutGuard {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Gate an attempt for `key` before doing any work on its behalf.
    ///
    /// Observing an expired lock resets the record to a fresh state.
    ///
    /// # Errors
    ///
    /// `Error::LockedOut` with the remaining seconds, rounded up, while a
    /// lockout window is active.
    pub async fn check(&self, key: &str) -> Result<(), Error> {
        let mut records = self.records.lock().await;
        let now = Instant::now();
        if let Some(record) = records.get_mut(key) {
            if let Some(locked_until) = record.locked_until {
                if locked_until > now {
                    return Err(Error::LockedOut {
                        retry_after_seconds: remaining_seconds(locked_until, now),
                    });
                }
                *record = LockoutRecord::default();
            }
        }
        Ok(())
    }

    /// Record a failed attempt for `key`.
    ///
    /// The fifth consecutive failure arms a 15 minute lockout and reports it
    /// immediately. A failure landing while a lock is already armed neither
    /// increments the count nor extends the window.
    ///
    /// # Errors
    ///
    /// `Error::LockedOut` when this failure arms the lockout or when one is
    /// already active.
    pub async fn record_failure(&self, key: &str) -> Result<(), Error> {
        let mut records = self.records.lock().await;
        let now = Instant::now();
        let record = records.entry(key.to_string()).or_default();
        if let Some(locked_until) = record.locked_until {
            if locked_until > now {
                return Err(Error::LockedOut {
                    retry_after_seconds: remaining_seconds(locked_until, now),
                });
            }
            *record = LockoutRecord::default();
        }
        record.failed_count += 1;
        if record.failed_count >= MAX_FAILED_ATTEMPTS {
            let locked_until = now + LOCKOUT_WINDOW;
            record.locked_until = Some(locked_until);
            return Err(Error::LockedOut {
                retry_after_seconds: remaining_seconds(locked_until, now),
            });
        }
        Ok(())
    }

    /// Forget all state for `key` after a successful attempt.
    pub async fn clear(&self, key: &str) {
        self.records.lock().await.remove(key);
    }
}

/// Remaining seconds, rounded up so a caller told "1s" can never retry early.
fn remaining_seconds(locked_until: Instant, now: Instant) -> u64 {
    let remaining = locked_until.saturating_duration_since(now);
    if remaining.subsec_nanos() > 0 {
        remaining.as_secs() + 1
    } else {
        remaining.as_secs()
    }
}
