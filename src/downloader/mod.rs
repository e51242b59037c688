//! Fetch orchestration and rate limiting
//!
//! The downloader drives the whole pipeline: chunk the requested date range,
//! count results per window, paginate, fetch pages through the retry policy,
//! and hand every page to the batch writer. All concurrent page fetches pass
//! through one shared [`rate_limit::RateGovernor`].
//!
//! # Components
//!
//! - [`executor`] - Fetch orchestrator and per-run summary
//! - [`rate_limit`] - Leaky-bucket request admission
//! - [`config`] - NVD quota constants

pub mod config;
pub mod executor;
pub mod rate_limit;

pub use executor::{FetchOrchestrator, RunSummary};
pub use rate_limit::{GovernorError, RateGovernor, RateToken};
