//! Error types for figsweep
//!
//! Every failure is fatal to the current sweep and the whole run. Process
//! related variants carry the full argument vector so a failing invocation
//! can be reproduced by hand.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// figsweep error types
#[derive(Error, Debug)]
pub enum Error {
    /// The benchmark process could not be spawned
    #[error("cannot launch the program for parameters: {}\n{source}", .command.join(" "))]
    Launch {
        /// Full argument vector
        command: Vec<String>,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// The benchmark exited with a non-zero status (or was killed by a signal)
    #[error("cannot run the program for parameters: {} (exit code: {code:?})\nlast output: {last_line}", .command.join(" "))]
    NonZeroExit {
        /// Full argument vector
        command: Vec<String>,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
        /// Last diagnostic line observed (empty if none)
        last_line: String,
    },

    /// The benchmark exceeded the per-trial wall-clock limit and was killed
    #[error("program timed out after {timeout:?} for parameters: {}\nlast output: {last_line}", .command.join(" "))]
    Timeout {
        /// Full argument vector
        command: Vec<String>,
        /// Configured limit
        timeout: Duration,
        /// Last diagnostic line observed (empty if none)
        last_line: String,
    },

    /// Waiting on the benchmark or reading its diagnostic stream failed
    #[error("lost contact with the program for parameters: {}\nlast output: {last_line}\n{source}", .command.join(" "))]
    ProcessIo {
        /// Full argument vector
        command: Vec<String>,
        /// Last diagnostic line observed (empty if none)
        last_line: String,
        /// Underlying read error
        #[source]
        source: std::io::Error,
    },

    /// The benchmark never wrote a diagnostic line
    #[error("output is empty for parameters: {}", .command.join(" "))]
    EmptyOutput {
        /// Full argument vector
        command: Vec<String>,
    },

    /// The result line has fewer tokens than the schema declares
    #[error("output is not valid for parameters: {} (expected at least {expected} fields, got {actual})\n\n{line}", .command.join(" "))]
    MalformedOutput {
        /// Full argument vector
        command: Vec<String>,
        /// Schema field count
        expected: usize,
        /// Token count of the last line
        actual: usize,
        /// Raw last line
        line: String,
    },

    /// A token where a number was expected did not parse
    #[error("cannot parse field '{field}' from token '{token}' for parameters: {}\n\n{line}", .command.join(" "))]
    FieldParse {
        /// Schema field name
        field: String,
        /// Offending raw token
        token: String,
        /// Full argument vector
        command: Vec<String>,
        /// Raw result line
        line: String,
    },

    /// Sweep selector does not name an implemented sweep
    #[error("do not have such figure: {selector} (available: {available})")]
    UnknownSweep {
        /// Selector as given on the command line
        selector: String,
        /// Comma-separated list of implemented sweeps
        available: String,
    },

    /// Appending to a series file failed
    #[error("cannot append to series {}: {source}", .path.display())]
    SeriesWrite {
        /// Series file path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Field is not part of the aggregated schema
    #[error("unknown result field: {0}")]
    UnknownField(String),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config or summary (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Argument vector of the failing invocation, if the error came from one.
    #[must_use]
    pub fn command(&self) -> Option<&[String]> {
        match self {
            Self::Launch { command, .. }
            | Self::NonZeroExit { command, .. }
            | Self::Timeout { command, .. }
            | Self::ProcessIo { command, .. }
            | Self::EmptyOutput { command }
            | Self::MalformedOutput { command, .. }
            | Self::FieldParse { command, .. } => Some(command),
            _ => None,
        }
    }
}
