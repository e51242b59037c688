//! Fetch orchestrator
//!
//! Drives chunk → count → paginate → fetch → write. Windows are processed in
//! order; page fetches within a window run concurrently, bounded by the rate
//! governor. A window with zero results is skipped outright, a window whose
//! count query fails is reported and skipped whole, and a page or batch
//! failure degrades only its own window. Output batches carry self-contained
//! identity, so no write-order guarantee is needed or given.

use crate::chunk::{chunk_date_range, ChunkError, DateWindow};
use crate::downloader::config::{self, MAX_REQUESTS, RESULTS_PER_PAGE};
use crate::downloader::rate_limit::RateGovernor;
use crate::fetcher::retry::RetryPolicy;
use crate::fetcher::{CatalogApi, FetcherError, FetcherResult};
use crate::output::{BatchWriteReport, BatchWriter};
use crate::shutdown::SharedShutdown;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};

/// Aggregate outcome of one fetch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Windows produced by chunking
    pub windows_total: usize,
    /// Windows skipped because their count was zero
    pub windows_empty: usize,
    /// Windows with a failed count query, page fetch, or batch write
    pub windows_failed: usize,
    /// Records persisted across all batches
    pub records_written: usize,
    /// Batch files written
    pub batches_written: usize,
}

impl RunSummary {
    /// Whether every non-empty window completed without failures.
    pub fn is_success(&self) -> bool {
        self.windows_failed == 0
    }
}

/// Result of processing a single window.
enum WindowOutcome {
    Empty,
    Complete(BatchWriteReport),
    Failed(BatchWriteReport),
}

/// Orchestrates the fetch pipeline over a chunked date range.
pub struct FetchOrchestrator {
    api: Arc<dyn CatalogApi>,
    governor: Arc<RateGovernor>,
    retry: RetryPolicy,
    writer: BatchWriter,
    page_size: u64,
    concurrency: usize,
    shutdown: Option<SharedShutdown>,
}

impl FetchOrchestrator {
    /// Create an orchestrator with the NVD quota defaults.
    pub fn new(api: Arc<dyn CatalogApi>, governor: Arc<RateGovernor>, writer: BatchWriter) -> Self {
        Self {
            api,
            governor,
            retry: RetryPolicy::new(config::rate_window(), config::MAX_RETRIES),
            writer,
            page_size: RESULTS_PER_PAGE,
            concurrency: MAX_REQUESTS,
            shutdown: None,
        }
    }

    /// Override the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override the page size requested per fetch.
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Override the number of concurrent page fetches.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Attach a shared shutdown handle, checked at every suspension point.
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.retry = self.retry.clone().with_shutdown(shutdown.clone());
        self.shutdown = Some(shutdown);
        self
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .map(|s| s.is_shutdown_requested())
            .unwrap_or(false)
    }

    /// Fetch every window of `[start, end]` and persist the results.
    ///
    /// Client-level failures never abort the run; each failing window is
    /// reported in the summary and the remaining windows still complete.
    ///
    /// # Errors
    /// Returns [`ChunkError`] only for an invalid date range; everything else
    /// is reflected in the [`RunSummary`].
    pub async fn run(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<RunSummary, ChunkError> {
        let windows = chunk_date_range(start, end)?;
        info!(windows = windows.len(), "date range chunked");

        let mut summary = RunSummary {
            windows_total: windows.len(),
            ..RunSummary::default()
        };

        for window in &windows {
            if self.shutdown_requested() {
                warn!("shutdown requested, stopping before next window");
                break;
            }

            let outcome = self
                .process_window(window)
                .instrument(info_span!("window", range = %window))
                .await;

            match outcome {
                WindowOutcome::Empty => summary.windows_empty += 1,
                WindowOutcome::Complete(report) => {
                    summary.records_written += report.records_written;
                    summary.batches_written += report.batches_written;
                }
                WindowOutcome::Failed(report) => {
                    summary.windows_failed += 1;
                    summary.records_written += report.records_written;
                    summary.batches_written += report.batches_written;
                }
            }
        }

        info!(
            windows = summary.windows_total,
            empty = summary.windows_empty,
            failed = summary.windows_failed,
            records = summary.records_written,
            batches = summary.batches_written,
            "fetch run complete"
        );

        Ok(summary)
    }

    /// Count, paginate, and fetch one window.
    async fn process_window(&self, window: &DateWindow) -> WindowOutcome {
        let count = match self.count_window(window).await {
            Ok(count) => count,
            Err(e) => {
                error!(error = %e, "count query failed, skipping window");
                return WindowOutcome::Failed(BatchWriteReport::default());
            }
        };

        if count == 0 {
            info!("no results in window");
            return WindowOutcome::Empty;
        }

        info!(total = count, "downloading records for window");

        // Count is known, so every page offset can be scheduled up front.
        let offsets = (0..count).step_by(self.page_size as usize);
        let unit_results: Vec<FetcherResult<BatchWriteReport>> =
            stream::iter(offsets.map(|offset| self.fetch_and_write(window, offset)))
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        let mut report = BatchWriteReport::default();
        let mut failed_units = 0usize;
        for result in unit_results {
            match result {
                Ok(unit_report) => {
                    if !unit_report.is_complete() {
                        failed_units += 1;
                    }
                    report.batches_written += unit_report.batches_written;
                    report.records_written += unit_report.records_written;
                    report.batches_failed += unit_report.batches_failed;
                }
                Err(e) => {
                    error!(error = %e, "page fetch abandoned");
                    failed_units += 1;
                }
            }
        }

        if failed_units > 0 {
            warn!(failed_units, "window completed with failures");
            WindowOutcome::Failed(report)
        } else {
            WindowOutcome::Complete(report)
        }
    }

    /// Issue the count query through the governor and retry policy.
    async fn count_window(&self, window: &DateWindow) -> FetcherResult<u64> {
        self.retry
            .run(|| async {
                let _token = self
                    .governor
                    .acquire()
                    .await
                    .map_err(|e| FetcherError::Transport(format!("rate governor: {e}")))?;
                self.api.count_results(window).await
            })
            .await
    }

    /// One unit of work: fetch a page through the governor and retry policy,
    /// then hand it straight to the batch writer.
    async fn fetch_and_write(
        &self,
        window: &DateWindow,
        offset: u64,
    ) -> FetcherResult<BatchWriteReport> {
        if self.shutdown_requested() {
            return Err(FetcherError::Cancelled);
        }

        let page = self
            .retry
            .run(|| async {
                let _token = self
                    .governor
                    .acquire()
                    .await
                    .map_err(|e| FetcherError::Transport(format!("rate governor: {e}")))?;
                self.api.fetch_page(window, offset, self.page_size).await
            })
            .await?;

        Ok(self.writer.write(window, offset, &page))
    }
}
