//! CLI command implementations

pub mod error;
pub mod fetch;

pub use error::CliError;
pub use fetch::{Cli, Commands, FetchArgs};
