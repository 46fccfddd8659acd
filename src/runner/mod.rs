//! Child-process execution
//!
//! A run launches the benchmark, blocks until it exits, and keeps the last
//! line it wrote to stderr. Earlier lines are progress chatter; they are
//! echoed through `tracing` and dropped.
//!
//! # Example
//!
//! ```rust,no_run
//! use figsweep::runner::{CommandRunner, ProcessRunner};
//!
//! let runner = CommandRunner::new(13);
//! let command: Vec<String> = ["java", "-Xmx4g", "-jar", "roll.jar", "-s", "roll-tree"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//! let tokens = runner.run(&command)?;
//! println!("mode: {}", tokens[0]);
//! # Ok::<(), figsweep::Error>(())
//! ```

mod command;

pub use command::CommandRunner;

use crate::{Error, Result};

/// Executes one benchmark invocation and returns the tokens of its result line.
///
/// Implementations must be shareable across threads so trials can run on a
/// worker pool.
pub trait ProcessRunner: Send + Sync {
    /// Run `command` (executable followed by its arguments) to completion.
    ///
    /// # Errors
    ///
    /// `Launch`, `NonZeroExit`, `Timeout`, `ProcessIo`, `EmptyOutput` or
    /// `MalformedOutput`
    fn run(&self, command: &[String]) -> Result<Vec<String>>;
}

/// Split the authoritative result line into tokens and check its arity.
///
/// Splitting is on single spaces, so consecutive spaces yield empty tokens.
/// Trailing empty tokens are dropped before the arity check.
///
/// # Errors
///
/// `EmptyOutput` if no line was seen, `MalformedOutput` if it is too short
pub fn tokenize_last_line(
    last_line: Option<String>,
    min_tokens: usize,
    command: &[String],
) -> Result<Vec<String>> {
    let line = last_line.ok_or_else(|| Error::EmptyOutput {
        command: command.to_vec(),
    })?;
    let mut tokens: Vec<String> = line.split(' ').map(str::to_string).collect();
    while tokens.last().is_some_and(String::is_empty) {
        tokens.pop();
    }
    if tokens.len() < min_tokens {
        return Err(Error::MalformedOutput {
            command: command.to_vec(),
            expected: min_tokens,
            actual: tokens.len(),
            line,
        });
    }
    Ok(tokens)
}
