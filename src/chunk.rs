//! Date range chunking for API-legal query windows
//!
//! The NVD API rejects publication date ranges longer than
//! [`MAX_WINDOW_DAYS`](crate::downloader::config::MAX_WINDOW_DAYS), so an
//! arbitrary `[start, end]` range must be split into consecutive sub-windows
//! before any request is made. [`chunk_date_range`] produces those windows:
//! contiguous, ordered, covering the full range with no gaps and no overlap
//! beyond shared boundary points.

use crate::downloader::config::MAX_WINDOW_DAYS;
use chrono::{DateTime, Duration, Utc};

/// Chunking errors
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    /// Start date is after end date
    #[error("invalid date range: start {start} is after end {end}")]
    StartAfterEnd {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// A bounded date range queried as one unit against the NVD API.
///
/// Produced only by [`chunk_date_range`]; immutable once created.
/// Invariants: `start <= end` and duration is at most `MAX_WINDOW_DAYS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    /// Inclusive window start
    pub start: DateTime<Utc>,
    /// Inclusive window end
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// Window end as a calendar date, used for output batch identity.
    pub fn end_date(&self) -> chrono::NaiveDate {
        self.end.date_naive()
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}..{}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Split `[start, end]` into consecutive windows no longer than
/// [`MAX_WINDOW_DAYS`].
///
/// Windows are emitted in order, each starting where the previous one ended.
/// A degenerate range (`start == end`) yields exactly one zero-length window.
///
/// # Errors
/// Returns [`ChunkError::StartAfterEnd`] if `start > end`; the range is never
/// silently reordered.
pub fn chunk_date_range(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<DateWindow>, ChunkError> {
    chunk_with_span(start, end, Duration::days(MAX_WINDOW_DAYS))
}

/// Split `[start, end]` into consecutive windows no longer than `span`.
fn chunk_with_span(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    span: Duration,
) -> Result<Vec<DateWindow>, ChunkError> {
    if start > end {
        return Err(ChunkError::StartAfterEnd { start, end });
    }

    if start == end {
        return Ok(vec![DateWindow { start, end }]);
    }

    let mut windows = Vec::new();
    let mut current = start;

    while current < end {
        let stop = (current + span).min(end);
        windows.push(DateWindow {
            start: current,
            end: stop,
        });
        current = stop;
    }

    Ok(windows)
}
