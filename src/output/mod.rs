//! Batched JSON output writing

pub mod batch;

pub use batch::{BatchWriteReport, BatchWriter};

/// Output writer errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
