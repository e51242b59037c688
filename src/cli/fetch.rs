//! Fetch command implementation

use crate::downloader::config::{self, MAX_REQUESTS};
use crate::downloader::{FetchOrchestrator, RateGovernor, RunSummary};
use crate::fetcher::nvd::NvdClient;
use crate::fetcher::retry::RetryPolicy;
use crate::output::BatchWriter;
use crate::shutdown::SharedShutdown;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::CliError;

/// Parse and validate a concurrency value.
///
/// Concurrency above the request quota has no effect: the rate governor
/// admits at most [`MAX_REQUESTS`] requests regardless.
fn parse_concurrency(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if value == 0 {
        return Err("concurrency must be at least 1".to_string());
    }
    if value > MAX_REQUESTS {
        return Err(format!(
            "concurrency {value} exceeds the request quota of {MAX_REQUESTS}"
        ));
    }
    Ok(value)
}

/// NVD CVE downloader CLI
#[derive(Parser, Debug)]
#[command(name = "nvd-cve-downloader")]
#[command(about = "Download CVE records from the NVD as fixed-size JSON batches", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Number of concurrent page fetches (default: 5, bounded by the quota)
    #[arg(long, global = true, default_value = "5", value_parser = parse_concurrency)]
    pub concurrency: usize,

    /// Maximum retries after a throttled response (default: 5, range: 1-20)
    #[arg(long, global = true, default_value = "5", value_parser = clap::value_parser!(u32).range(1..=20))]
    pub max_retries: u32,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch CVEs published in a trailing date range
    Fetch(FetchArgs),
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// How many days back from now to fetch
    #[arg(long, default_value = "120", value_parser = clap::value_parser!(i64).range(1..))]
    pub days_back: i64,

    /// Output directory for batch files (created if absent)
    #[arg(long, default_value = "cve_data")]
    pub output_dir: PathBuf,
}

impl FetchArgs {
    /// Run the fetch pipeline for the requested trailing range.
    pub async fn execute(&self, cli: &Cli, shutdown: SharedShutdown) -> Result<RunSummary, CliError> {
        let end = Utc::now();
        let start = end - Duration::days(self.days_back);

        info!(
            days_back = self.days_back,
            output_dir = %self.output_dir.display(),
            "starting CVE fetch"
        );

        let api = Arc::new(NvdClient::new());
        let governor = Arc::new(RateGovernor::from_config());
        let writer = BatchWriter::new(&self.output_dir)?;

        let orchestrator = FetchOrchestrator::new(api, governor, writer)
            .with_retry_policy(RetryPolicy::new(config::rate_window(), cli.max_retries))
            .with_concurrency(cli.concurrency)
            .with_shutdown(shutdown);

        let summary = orchestrator.run(start, end).await?;

        info!(
            records = summary.records_written,
            batches = summary.batches_written,
            empty_windows = summary.windows_empty,
            "fetch finished"
        );

        if !summary.is_success() {
            return Err(CliError::WindowsFailed {
                failed: summary.windows_failed,
                total: summary.windows_total,
            });
        }

        Ok(summary)
    }
}
