//! NVD CVE 2.0 API client
//!
//! Thin HTTP client over the NVD REST endpoint. Knows the wire shape of
//! requests (query parameters) and responses (the [`CatalogPage`] envelope)
//! and classifies failures for the retry policy; it does not throttle
//! itself — pacing is the rate governor's job.

use crate::chunk::DateWindow;
use crate::fetcher::{CatalogApi, CatalogPage, FetcherError, FetcherResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// Production NVD CVE API endpoint
pub const NVD_BASE_URL: &str = "https://services.nvd.nist.gov/rest/json/cves/2.0";

/// HTTP client for the NVD CVE 2.0 API
pub struct NvdClient {
    client: Client,
    base_url: String,
}

impl NvdClient {
    /// Create a client against the production NVD endpoint.
    pub fn new() -> Self {
        Self::with_base_url(NVD_BASE_URL)
    }

    /// Create a client against a custom endpoint (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Format a timestamp the way the NVD API expects its date parameters.
    fn format_date(ts: &DateTime<Utc>) -> String {
        ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
    }

    /// Execute one GET and decode the response envelope.
    ///
    /// Classifies the outcome for the retry policy: 403 and 429 both mean the
    /// rate quota was exceeded (the NVD signals throttling with 403), any
    /// other non-success status or network failure is a transport error, and
    /// an undecodable body is a parse error.
    async fn get_envelope(&self, params: &[(&str, String)]) -> FetcherResult<CatalogPage> {
        debug!(url = %self.base_url, params = params.len(), "issuing catalog request");

        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .send()
            .await
            .map_err(|e| FetcherError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 403 || status.as_u16() == 429 {
            return Err(FetcherError::Throttled);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(FetcherError::Transport(format!(
                "unexpected status {status}: {body}"
            )));
        }

        response
            .json::<CatalogPage>()
            .await
            .map_err(|e| FetcherError::Parse(e.to_string()))
    }
}

impl Default for NvdClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogApi for NvdClient {
    async fn count_results(&self, window: &DateWindow) -> FetcherResult<u64> {
        let params = [
            ("pubStartDate", Self::format_date(&window.start)),
            ("pubEndDate", Self::format_date(&window.end)),
            ("startIndex", "0".to_string()),
            ("resultsPerPage", "1".to_string()),
        ];

        let envelope = self.get_envelope(&params).await?;
        debug!(window = %window, total = envelope.total_results, "count query complete");
        Ok(envelope.total_results)
    }

    async fn fetch_page(
        &self,
        window: &DateWindow,
        offset: u64,
        page_size: u64,
    ) -> FetcherResult<Vec<Value>> {
        let params = [
            ("pubStartDate", Self::format_date(&window.start)),
            ("pubEndDate", Self::format_date(&window.end)),
            ("startIndex", offset.to_string()),
            ("resultsPerPage", page_size.to_string()),
        ];

        let envelope = self.get_envelope(&params).await?;
        debug!(
            window = %window,
            offset,
            records = envelope.vulnerabilities.len(),
            "page fetch complete"
        );
        Ok(envelope.vulnerabilities)
    }
}
