//! Catalog API clients and retry policy

use crate::chunk::DateWindow;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

pub mod nvd;
pub mod retry;

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Rate-limit rejection from the API. Self-healing: the retry policy
    /// waits out the window and re-issues the same call.
    #[error("request throttled by the API")]
    Throttled,

    /// Network or HTTP failure other than throttling. Not retried.
    #[error("transport error: {0}")]
    Transport(String),

    /// Malformed JSON or missing fields in a response. Not retried.
    #[error("parse error: {0}")]
    Parse(String),

    /// Still throttled after the maximum number of retry attempts.
    #[error("throttled on all {attempts} attempts, giving up")]
    ExhaustedRetries { attempts: u32 },

    /// Shutdown was requested while the call was waiting to retry.
    #[error("cancelled by shutdown request")]
    Cancelled,
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Response envelope returned by the catalog for both count and page queries.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogPage {
    /// Total results available for the queried window
    #[serde(rename = "totalResults")]
    pub total_results: u64,

    /// Raw vulnerability records, kept verbatim for downstream consumers
    #[serde(default)]
    pub vulnerabilities: Vec<Value>,
}

/// Read-only catalog query operations.
///
/// Both operations are idempotent reads keyed by `(window, offset)`, which is
/// what makes retrying after throttling safe. Implementations surface
/// throttling as [`FetcherError::Throttled`] so the retry policy can
/// distinguish it from genuine failures.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Query the total result count for a window.
    ///
    /// Requests the minimal page (`resultsPerPage=1`) and reads the declared
    /// total without transferring record bodies.
    async fn count_results(&self, window: &DateWindow) -> FetcherResult<u64>;

    /// Fetch records `[offset, offset + page_size)` within a window.
    ///
    /// Returns whatever the API returns verbatim; the page may hold fewer
    /// than `page_size` records when the window is exhausted.
    async fn fetch_page(
        &self,
        window: &DateWindow,
        offset: u64,
        page_size: u64,
    ) -> FetcherResult<Vec<Value>>;
}
