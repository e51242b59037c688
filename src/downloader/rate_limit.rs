//! Request-rate governor for the catalog API
//!
//! Implements a leaky-bucket admission policy, not just a concurrency cap:
//! at most `max_requests` guarded calls may be in flight at once, and
//! successive request *submissions* are spaced at least
//! `window / max_requests` apart. One governor instance is shared by every
//! concurrent worker; it is the only synchronized state in the system.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

/// Rate governor errors
#[derive(Debug, thiserror::Error)]
pub enum GovernorError {
    /// Failed to acquire a request permit
    #[error("failed to acquire request permit: {0}")]
    Acquire(String),
}

/// Ephemeral permission to issue one request.
///
/// Holding the token keeps one in-flight slot occupied; dropping it releases
/// the slot on every exit path, success or failure.
pub struct RateToken {
    _permit: OwnedSemaphorePermit,
}

/// Leaky-bucket admission governor shared by all fetch workers.
pub struct RateGovernor {
    semaphore: Arc<Semaphore>,
    min_spacing: Duration,
    next_submission: Mutex<Option<Instant>>,
}

impl RateGovernor {
    /// Create a governor admitting at most `max_requests` concurrent calls,
    /// spaced evenly across `window`. A zero `max_requests` is treated as 1.
    pub fn new(max_requests: usize, window: Duration) -> Self {
        let max_requests = max_requests.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_requests)),
            min_spacing: window / max_requests as u32,
            next_submission: Mutex::new(None),
        }
    }

    /// Governor configured with the NVD public-quota defaults.
    pub fn from_config() -> Self {
        Self::new(
            super::config::MAX_REQUESTS,
            super::config::rate_window(),
        )
    }

    /// Block until both admission conditions hold, then return a token.
    ///
    /// Waits for an in-flight slot first, then for the minimum spacing since
    /// the previous submission. The spacing lock is held through the wait so
    /// submissions are serialized in arrival order.
    pub async fn acquire(&self) -> Result<RateToken, GovernorError> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| GovernorError::Acquire(e.to_string()))?;

        let mut next_submission = self.next_submission.lock().await;
        if let Some(not_before) = *next_submission {
            if not_before > Instant::now() {
                tokio::time::sleep_until(not_before).await;
            }
        }
        *next_submission = Some(Instant::now() + self.min_spacing);
        drop(next_submission);

        Ok(RateToken { _permit: permit })
    }

    /// Number of in-flight slots currently free.
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}
