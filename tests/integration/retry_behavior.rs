//! Throttling and retry behavior through the full pipeline

use crate::common::FakeCatalog;
use chrono::{TimeZone, Utc};
use nvd_cve_downloader::downloader::{FetchOrchestrator, RateGovernor};
use nvd_cve_downloader::fetcher::retry::RetryPolicy;
use nvd_cve_downloader::{chunk_date_range, BatchWriter, DateWindow};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const RATE_WINDOW: Duration = Duration::from_secs(32);

fn window() -> DateWindow {
    let start = Utc.with_ymd_and_hms(2023, 9, 8, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2023, 9, 9, 0, 0, 0).unwrap();
    chunk_date_range(start, end).unwrap()[0]
}

fn orchestrator(api: Arc<FakeCatalog>, dir: &Path, max_retries: u32) -> FetchOrchestrator {
    FetchOrchestrator::new(
        api,
        Arc::new(RateGovernor::new(5, RATE_WINDOW)),
        BatchWriter::new(dir).unwrap(),
    )
    .with_retry_policy(RetryPolicy::new(RATE_WINDOW, max_retries))
}

#[tokio::test(start_paused = true)]
async fn throttled_call_recovers_transparently() {
    let window = window();
    let api = Arc::new(
        FakeCatalog::new()
            .with_window(&window, 54)
            .with_throttle_budget(1),
    );
    let dir = tempfile::tempdir().unwrap();
    let started = tokio::time::Instant::now();

    let summary = orchestrator(api.clone(), dir.path(), 3)
        .run(window.start, window.end)
        .await
        .unwrap();

    // The throttle hit the count query; it retried and the run saw no error.
    assert!(summary.is_success());
    assert_eq!(summary.records_written, 54);
    assert_eq!(api.count_calls(), 2);
    assert!(
        started.elapsed() >= RATE_WINDOW,
        "recovery requires one full-window sleep"
    );
}

#[tokio::test(start_paused = true)]
async fn sustained_throttling_fails_the_window() {
    let window = window();
    let api = Arc::new(
        FakeCatalog::new()
            .with_window(&window, 54)
            .with_throttle_budget(100),
    );
    let dir = tempfile::tempdir().unwrap();

    let summary = orchestrator(api.clone(), dir.path(), 2)
        .run(window.start, window.end)
        .await
        .unwrap();

    assert!(!summary.is_success());
    assert_eq!(summary.windows_failed, 1);
    assert_eq!(api.count_calls(), 3, "initial attempt plus two retries");
    assert_eq!(api.page_calls(), 0, "no pages without a successful count");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test(start_paused = true)]
async fn transport_failure_is_not_retried() {
    let window = window();
    let api = Arc::new(
        FakeCatalog::new()
            .with_window(&window, 54)
            .with_failing_count(&window),
    );
    let dir = tempfile::tempdir().unwrap();

    let summary = orchestrator(api.clone(), dir.path(), 5)
        .run(window.start, window.end)
        .await
        .unwrap();

    assert!(!summary.is_success());
    assert_eq!(api.count_calls(), 1, "transport errors are terminal");
    assert_eq!(api.page_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn throttled_page_fetch_recovers_and_writes() {
    let window = window();
    // The first two calls are throttled wherever they land; the retry policy
    // absorbs both without surfacing an error.
    let api = Arc::new(
        FakeCatalog::new()
            .with_window(&window, 120)
            .with_throttle_budget(2),
    );
    let dir = tempfile::tempdir().unwrap();

    let summary = orchestrator(api.clone(), dir.path(), 3)
        .with_page_size(100)
        .run(window.start, window.end)
        .await
        .unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.records_written, 120);
    assert_eq!(summary.batches_written, 3);
}
