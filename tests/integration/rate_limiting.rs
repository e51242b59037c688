//! Rate governor behavior under concurrent page fetches

use crate::common::FakeCatalog;
use chrono::{TimeZone, Utc};
use nvd_cve_downloader::downloader::{FetchOrchestrator, RateGovernor};
use nvd_cve_downloader::fetcher::retry::RetryPolicy;
use nvd_cve_downloader::{chunk_date_range, BatchWriter, DateWindow};
use std::sync::Arc;
use std::time::Duration;

fn window() -> DateWindow {
    let start = Utc.with_ymd_and_hms(2023, 9, 8, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2023, 9, 9, 0, 0, 0).unwrap();
    chunk_date_range(start, end).unwrap()[0]
}

#[tokio::test(start_paused = true)]
async fn in_flight_requests_never_exceed_the_cap() {
    let window = window();
    let api = Arc::new(
        FakeCatalog::new()
            .with_window(&window, 1000)
            .with_per_call_delay(Duration::from_secs(5)),
    );
    let dir = tempfile::tempdir().unwrap();

    let governor = Arc::new(RateGovernor::new(2, Duration::from_secs(4)));
    let summary = FetchOrchestrator::new(api.clone(), governor, BatchWriter::new(dir.path()).unwrap())
        .with_retry_policy(RetryPolicy::new(Duration::from_secs(4), 1))
        .with_page_size(100)
        .with_concurrency(5)
        .run(window.start, window.end)
        .await
        .unwrap();

    assert!(summary.is_success());
    assert_eq!(api.page_calls(), 10);
    assert!(
        api.max_in_flight() <= 2,
        "governor admitted {} concurrent requests with a cap of 2",
        api.max_in_flight()
    );
}

#[tokio::test(start_paused = true)]
async fn submissions_are_spaced_across_the_window() {
    let window = window();
    let api = Arc::new(FakeCatalog::new().with_window(&window, 500));
    let dir = tempfile::tempdir().unwrap();

    let rate_window = Duration::from_secs(32);
    let governor = Arc::new(RateGovernor::new(5, rate_window));
    let started = tokio::time::Instant::now();

    let summary = FetchOrchestrator::new(api.clone(), governor, BatchWriter::new(dir.path()).unwrap())
        .with_retry_policy(RetryPolicy::new(rate_window, 1))
        .with_page_size(100)
        .run(window.start, window.end)
        .await
        .unwrap();

    assert!(summary.is_success());

    // 1 count + 5 pages = 6 submissions; the first is immediate and each of
    // the rest waits out the minimum spacing of window / max_requests.
    let min_spacing = rate_window / 5;
    assert!(
        started.elapsed() >= min_spacing * 5,
        "elapsed {:?} is too fast for 6 spaced submissions",
        started.elapsed()
    );
}
