//! # NVD CVE Downloader Library
//!
//! Downloads CVE records published in a date range from the NVD CVE 2.0 API
//! and persists them as fixed-size JSON batch files.
//!
//! The NVD API constrains every query three ways: a publication date range of
//! at most 120 days, a pagination cap of 2000 results per request, and a
//! strict request-rate quota. This crate handles all three: it chunks the
//! requested range into legal windows, discovers the result count per window,
//! paginates concurrently under a shared rate governor, retries throttled
//! calls after a full-window sleep (bounded), and re-batches results into
//! 50-record output files keyed by window end date and record index.
//!
//! ## Quick Start
//!
//! ```no_run
//! use nvd_cve_downloader::downloader::{FetchOrchestrator, RateGovernor};
//! use nvd_cve_downloader::fetcher::nvd::NvdClient;
//! use nvd_cve_downloader::output::BatchWriter;
//! use chrono::{Duration, Utc};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let end = Utc::now();
//! let start = end - Duration::days(120);
//!
//! let orchestrator = FetchOrchestrator::new(
//!     Arc::new(NvdClient::new()),
//!     Arc::new(RateGovernor::from_config()),
//!     BatchWriter::new("cve_data")?,
//! );
//!
//! let summary = orchestrator.run(start, end).await?;
//! assert!(summary.is_success());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`chunk`] - Date range chunking into API-legal windows
//! - [`fetcher`] - NVD API client and bounded retry policy
//! - [`downloader`] - Fetch orchestration and rate governing
//! - [`output`] - Fixed-size JSON batch writing
//! - [`cli`] - Command-line interface
//! - [`shutdown`] - Graceful shutdown coordination

pub mod chunk;
pub mod cli;
pub mod downloader;
pub mod fetcher;
pub mod output;
pub mod shutdown;

pub use chunk::{chunk_date_range, ChunkError, DateWindow};
pub use downloader::{FetchOrchestrator, RateGovernor, RunSummary};
pub use fetcher::{CatalogApi, CatalogPage, FetcherError, FetcherResult};
pub use output::{BatchWriteReport, BatchWriter, OutputError};
