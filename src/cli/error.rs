//! CLI error type

use crate::chunk::ChunkError;
use crate::output::OutputError;

/// CLI command errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Invalid command-line argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested date range could not be chunked
    #[error(transparent)]
    InvalidRange(#[from] ChunkError),

    /// Output directory could not be prepared
    #[error(transparent)]
    Output(#[from] OutputError),

    /// The run finished but some windows failed entirely
    #[error("{failed} of {total} windows failed; see log for details")]
    WindowsFailed { failed: usize, total: usize },
}
