//! Bounded retry policy for throttled catalog calls
//!
//! The NVD rejects requests over quota with a throttling status; waiting out
//! one full rate window and re-issuing the identical call is always safe
//! because every wrapped operation is a pure read keyed by `(window, offset)`.
//! Only throttling is self-healing: transport and parse failures are returned
//! to the caller on the first occurrence.
//!
//! The retry count is bounded. Sustained throttling past the bound surfaces
//! as [`FetcherError::ExhaustedRetries`] instead of stalling a worker forever.

use crate::fetcher::{FetcherError, FetcherResult};
use crate::shutdown::SharedShutdown;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retries throttled calls after a full rate-window sleep, up to a bound.
#[derive(Clone)]
pub struct RetryPolicy {
    window: Duration,
    max_retries: u32,
    shutdown: Option<SharedShutdown>,
}

impl RetryPolicy {
    /// Create a policy that sleeps `window` between attempts and gives up
    /// after `max_retries` retries.
    pub fn new(window: Duration, max_retries: u32) -> Self {
        Self {
            window,
            max_retries,
            shutdown: None,
        }
    }

    /// Attach a shutdown handle so retry sleeps can be interrupted.
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Run `op`, retrying on [`FetcherError::Throttled`].
    ///
    /// The operation is re-invoked with identical arguments after each
    /// full-window sleep. Any other error is returned immediately. A
    /// shutdown request during a sleep aborts with
    /// [`FetcherError::Cancelled`].
    pub async fn run<T, F, Fut>(&self, mut op: F) -> FetcherResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = FetcherResult<T>>,
    {
        let attempts = self.max_retries + 1;
        for attempt in 1..=attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(FetcherError::Throttled) if attempt < attempts => {
                    warn!(
                        attempt,
                        max_attempts = attempts,
                        sleep_secs = self.window.as_secs(),
                        "throttled by the API, sleeping out the rate window"
                    );
                    self.sleep_full_window().await?;
                }
                Err(FetcherError::Throttled) => {
                    return Err(FetcherError::ExhaustedRetries { attempts });
                }
                Err(e) => return Err(e),
            }
        }
        // The loop always returns from its final iteration.
        unreachable!("retry loop exited without a result")
    }

    async fn sleep_full_window(&self) -> FetcherResult<()> {
        match &self.shutdown {
            Some(shutdown) => {
                tokio::select! {
                    _ = tokio::time::sleep(self.window) => Ok(()),
                    _ = shutdown.wait_for_shutdown() => Err(FetcherError::Cancelled),
                }
            }
            None => {
                tokio::time::sleep(self.window).await;
                Ok(())
            }
        }
    }
}
