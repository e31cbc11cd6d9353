// ============================
// crates/backend-lib/src/auth/lockout.rs
// ============================
//! Time-windowed lockout tracking for authentication attempts.
//!
//! Failed tries are appended to an [`AttemptStore`] and counted over a
//! sliding window; an identifier at or over the threshold is locked out
//! until enough records age past the window.

use crate::error::AppError;
use crate::storage::{AttemptStore, FailedAttempt};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::warn;

/// Default number of failed attempts before lockout
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default lockout window (60 minutes)
const DEFAULT_WINDOW_MINUTES: i64 = 60;

/// Lockout tracker for authentication attempts
#[derive(Clone)]
pub struct LockoutTracker {
    store: Arc<dyn AttemptStore>,
    /// Maximum number of failed attempts before lockout
    max_attempts: u32,
    /// Sliding window over which attempts count
    window: Duration,
}

impl LockoutTracker {
    /// Create a new lockout tracker
    pub fn new(store: Arc<dyn AttemptStore>, max_attempts: u32, window_minutes: i64) -> Self {
        Self {
            store,
            max_attempts,
            window: Duration::minutes(window_minutes),
        }
    }

    /// Create a tracker with the default threshold and window
    pub fn with_defaults(store: Arc<dyn AttemptStore>) -> Self {
        Self::new(store, DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW_MINUTES)
    }

    /// Record a failed authentication attempt.
    ///
    /// The append must succeed or the error propagates: if tracking storage
    /// is unavailable we refuse the attempt rather than allow unlimited
    /// retries. The follow-up purge of expired records only bounds storage
    /// growth, so its failures are logged and swallowed.
    pub async fn record_failed_attempt(
        &self,
        identifier: &str,
        origin: &str,
    ) -> Result<(), AppError> {
        let now = Utc::now();
        self.store
            .append(&FailedAttempt {
                identifier: identifier.to_string(),
                origin: origin.to_string(),
                attempted_at: now,
            })
            .await?;

        if let Err(err) = self.store.purge_before(now - self.window).await {
            warn!(%err, "failed to purge expired login attempts");
        }
        Ok(())
    }

    /// Whether the identifier has reached the threshold within the window.
    /// One `now` snapshot is used for the whole evaluation.
    pub async fn is_locked_out(&self, identifier: &str) -> Result<bool, AppError> {
        let cutoff = Utc::now() - self.window;
        let count = self.store.count_since(identifier, cutoff).await?;
        Ok(count >= self.max_attempts)
    }

    /// How many attempts remain before lockout, never negative.
    pub async fn remaining_attempts(&self, identifier: &str) -> Result<u32, AppError> {
        let cutoff = Utc::now() - self.window;
        let count = self.store.count_since(identifier, cutoff).await?;
        Ok(self.max_attempts.saturating_sub(count))
    }

    /// Drop every record for the identifier, expired or not.
    /// Called only after a successful authentication.
    pub async fn clear_failed_attempts(&self, identifier: &str) -> Result<u64, AppError> {
        self.store.clear(identifier).await
    }

    /// Length of the lockout window in minutes, for user-facing messages.
    pub fn window_minutes(&self) -> i64 {
        self.window.num_minutes()
    }
}
