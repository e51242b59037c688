//! Batch writer behavior across multiple pages of one window

use crate::common::record;
use chrono::{TimeZone, Utc};
use nvd_cve_downloader::{BatchWriter, DateWindow};
use serde_json::Value;
use std::path::Path;

fn window() -> DateWindow {
    DateWindow {
        start: Utc.with_ymd_and_hms(2023, 9, 8, 0, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2023, 9, 9, 0, 0, 0).unwrap(),
    }
}

fn page(from: usize, to: usize) -> Vec<Value> {
    (from..to).map(|i| record("w", i)).collect()
}

fn read_batch(path: &Path) -> Vec<Value> {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[test]
fn pages_at_different_offsets_write_disjoint_batches() {
    let dir = tempfile::tempdir().unwrap();
    let writer = BatchWriter::new(dir.path()).unwrap();
    let window = window();

    // Two full API pages of 2000 records, as the orchestrator hands them over.
    let first = writer.write(&window, 0, &page(0, 2000));
    let second = writer.write(&window, 2000, &page(2000, 4000));

    assert_eq!(first.batches_written, 40);
    assert_eq!(second.batches_written, 40);

    // Index ranges do not collide across pages.
    assert!(writer.batch_path(&window, 1950).exists());
    assert!(writer.batch_path(&window, 2000).exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 80);

    // Record order is preserved inside each batch.
    let boundary = read_batch(&writer.batch_path(&window, 2000));
    assert_eq!(boundary[0], record("w", 2000));
    assert_eq!(boundary[49], record("w", 2049));
}

#[test]
fn short_final_page_yields_a_short_final_batch() {
    let dir = tempfile::tempdir().unwrap();
    let writer = BatchWriter::new(dir.path()).unwrap();
    let window = window();

    let report = writer.write(&window, 2000, &page(2000, 2054));

    assert_eq!(report.batches_written, 2);
    assert_eq!(read_batch(&writer.batch_path(&window, 2000)).len(), 50);
    assert_eq!(read_batch(&writer.batch_path(&window, 2050)).len(), 4);
}

#[test]
fn writer_creates_missing_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("data").join("cves");

    let writer = BatchWriter::new(&nested).unwrap();
    let report = writer.write(&window(), 0, &page(0, 3));

    assert!(report.is_complete());
    assert!(nested.join("cves-2023-09-09-0.json").exists());
}
