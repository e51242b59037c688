//! Fixed-size batch writer for fetched CVE records
//!
//! Result pages arrive sized by the API's pagination cap; output files are
//! re-batched into groups of [`RESULTS_PER_FILE`] records independent of page
//! boundaries. Batch identity is `(window end date, start index)`, which is
//! deterministic from the inputs, so re-running an identical fetch overwrites
//! the same file set instead of duplicating it.

use crate::chunk::DateWindow;
use crate::downloader::config::RESULTS_PER_FILE;
use crate::output::{OutputError, OutputResult};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Outcome of one [`BatchWriter::write`] call.
///
/// A failed batch never aborts its siblings, so the report carries both
/// counts instead of short-circuiting on the first error.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchWriteReport {
    /// Batches successfully written
    pub batches_written: usize,
    /// Records contained in the written batches
    pub records_written: usize,
    /// Batches that failed to write
    pub batches_failed: usize,
}

impl BatchWriteReport {
    /// Whether every batch of the call was persisted.
    pub fn is_complete(&self) -> bool {
        self.batches_failed == 0
    }

    fn merge(&mut self, other: BatchWriteReport) {
        self.batches_written += other.batches_written;
        self.records_written += other.records_written;
        self.batches_failed += other.batches_failed;
    }
}

/// Writes record pages as fixed-size JSON array files.
pub struct BatchWriter {
    output_dir: PathBuf,
    batch_size: usize,
}

impl BatchWriter {
    /// Create a writer rooted at `output_dir`, creating the directory if
    /// absent. Batches hold at most [`RESULTS_PER_FILE`] records.
    pub fn new(output_dir: impl Into<PathBuf>) -> OutputResult<Self> {
        Self::with_batch_size(output_dir, RESULTS_PER_FILE)
    }

    /// Create a writer with a custom batch size.
    pub fn with_batch_size(output_dir: impl Into<PathBuf>, batch_size: usize) -> OutputResult<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir).map_err(|e| {
            OutputError::Io(format!(
                "failed to create output directory {}: {e}",
                output_dir.display()
            ))
        })?;

        Ok(Self {
            output_dir,
            batch_size,
        })
    }

    /// Path of the batch file identified by `(window end date, index)`.
    pub fn batch_path(&self, window: &DateWindow, start_index: u64) -> PathBuf {
        self.output_dir
            .join(format!("cves-{}-{}.json", window.end_date(), start_index))
    }

    /// Split `records` into consecutive fixed-size groups and persist each as
    /// one JSON array file.
    ///
    /// Group *g* gets index `start_index + g * batch_size`, matching the
    /// record's absolute position within the window. Each file is fully
    /// overwritten; a failed group is logged and skipped without aborting
    /// the remaining groups.
    pub fn write(
        &self,
        window: &DateWindow,
        start_index: u64,
        records: &[Value],
    ) -> BatchWriteReport {
        let mut report = BatchWriteReport::default();

        for (group, batch) in records.chunks(self.batch_size).enumerate() {
            let index = start_index + (group * self.batch_size) as u64;
            let path = self.batch_path(window, index);

            match write_json_array(&path, batch) {
                Ok(()) => {
                    debug!(path = %path.display(), records = batch.len(), "batch written");
                    report.merge(BatchWriteReport {
                        batches_written: 1,
                        records_written: batch.len(),
                        batches_failed: 0,
                    });
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "failed to write batch");
                    report.merge(BatchWriteReport {
                        batches_written: 0,
                        records_written: 0,
                        batches_failed: 1,
                    });
                }
            }
        }

        report
    }
}

/// Serialize `records` as a JSON array and overwrite `path` with it.
fn write_json_array(path: &Path, records: &[Value]) -> OutputResult<()> {
    let body = serde_json::to_vec(records)
        .map_err(|e| OutputError::Serialization(e.to_string()))?;
    std::fs::write(path, body)
        .map_err(|e| OutputError::Io(format!("failed to write {}: {e}", path.display())))
}
