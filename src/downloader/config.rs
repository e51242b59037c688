//! Download configuration constants

use std::time::Duration;

/// Maximum publication date span the NVD API accepts per query, in days.
/// Ranges longer than this are rejected, so wider requests must be chunked
/// before submission.
pub const MAX_WINDOW_DAYS: i64 = 120;

/// Maximum results per paginated request.
/// 2000 is the NVD API pagination cap; requesting the maximum minimizes the
/// number of requests counted against the rate budget.
pub const RESULTS_PER_PAGE: u64 = 2000;

/// Number of records written per output file.
/// Small fixed-size batches keep individual files cheap to parse downstream
/// and a failed write loses at most one batch.
pub const RESULTS_PER_FILE: usize = 50;

/// Maximum requests in flight against the NVD API.
/// 5 matches the NVD public (keyless) quota; 50 is allowed with an API key.
pub const MAX_REQUESTS: usize = 5;

/// Rate limit window in seconds.
/// NVD enforces a rolling 30-second window; 32 seconds adds margin so a
/// full-window sleep reliably clears a throttled state.
pub const WINDOW_SECONDS: u64 = 32;

/// Maximum retry attempts after a throttled response before the call is
/// abandoned with an exhausted-retries error.
pub const MAX_RETRIES: u32 = 5;

/// The rate limit window as a [`Duration`].
pub fn rate_window() -> Duration {
    Duration::from_secs(WINDOW_SECONDS)
}

/// Minimum spacing between successive request submissions.
///
/// Spreading `MAX_REQUESTS` submissions evenly across the window keeps the
/// request rate under the quota even when all workers are ready at once.
pub fn min_spacing() -> Duration {
    rate_window() / MAX_REQUESTS as u32
}
