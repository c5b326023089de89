//! Subcommands of the `moroxel` runner and the error they report.
//!
//! Library errors are flattened into a message at this boundary; `main`
//! prints it and exits with a failure status.

pub(crate) mod replay;
pub(crate) mod run;
pub(crate) mod watch;

mod output;

use clap::ValueEnum;
use std::error::Error;
use std::fmt;

/// Output format for the `run` and `replay` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable summary.
    Text,
    /// Machine-readable JSON summary.
    Json,
    /// Summary plus an ASCII dump of the final frame.
    Ascii,
}

/// A failed runner command, reduced to the line printed on stderr.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Wrap a message for the user.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<moroxel::ConsoleError> for CliError {
    fn from(e: moroxel::ConsoleError) -> Self {
        Self::new(format!("cartridge failed to boot: {e}"))
    }
}

impl From<moroxel::replay::ReplayError> for CliError {
    fn from(e: moroxel::replay::ReplayError) -> Self {
        Self::new(format!("recording: {e}"))
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("JSON output failed: {e}"))
    }
}
