//! # figsweep: Benchmark-Sweep Orchestrator
//!
//! figsweep drives an external benchmark program across parameter grids,
//! averages repeated trials, and appends the results to plain-text series
//! files consumed by plotting scripts.
//!
//! ## Pipeline
//!
//! ```text
//! SweepId ──> ParameterPoint ──> TrialAverager ──> ProcessRunner ──> ResultRecord
//!                                     │ (mean per field)
//!                                     └──> derive ──> SeriesWriter (append x\ty)
//! ```
//!
//! ## Design Principles
//!
//! - **Fail fast**: one crashed or malformed trial aborts the whole run. The
//!   error carries the exact command so it can be replayed by hand.
//! - **Append-only output**: series files are never truncated.
//! - **Explicit configuration**: `BenchConfig` is passed down, never global.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use figsweep::config::BenchConfig;
//! use figsweep::orchestrator::Orchestrator;
//! use figsweep::runner::CommandRunner;
//!
//! let config = BenchConfig::builder().memory_limit("8g").trials(10).build()?;
//! let runner = CommandRunner::new(config.schema.len()).with_timeout(config.timeout());
//!
//! let mut orchestrator = Orchestrator::new(&config, &runner);
//! orchestrator.run_selectors(&["-fig2", "-fig5"])?;
//! # Ok::<(), figsweep::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod averager;
pub mod config;
pub mod derive;
pub mod error;
pub mod orchestrator;
pub mod runner;
pub mod schema;
pub mod series;
pub mod sweep;

pub use error::{Error, Result};
