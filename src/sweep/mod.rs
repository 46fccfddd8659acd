//! Sweep definitions and the context they run in
//!
//! A sweep is a statically defined procedure that walks a grid of
//! `ParameterPoint`s, averages each one, derives plotted values and appends
//! them to series. The set of sweeps is closed: `SweepId` names every one and
//! a compile-time table maps ids to procedures.
//!
//! ## Selectors
//!
//! ```rust
//! use figsweep::sweep::SweepId;
//!
//! assert_eq!(SweepId::parse_selector("-fig3")?, SweepId::Fig3);
//! assert_eq!(SweepId::parse_selector("fig7")?, SweepId::Fig7);
//! assert_eq!(SweepId::parse_selector("8")?, SweepId::Fig8);
//! assert!(SweepId::parse_selector("99").is_err());
//! # Ok::<(), figsweep::Error>(())
//! ```

mod figures;

use crate::averager::{AggregateResult, TrialAverager};
use crate::config::BenchConfig;
use crate::runner::ProcessRunner;
use crate::schema::ResultRecord;
use crate::series::SeriesWriter;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Branching factors every figure is plotted for
pub const BRANCHING_FACTORS: [u32; 3] = [2, 10, 20];

/// Sampling modes understood by the benchmark's `-s` flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SamplingMode {
    /// `roll-tree`
    RollTree,
    /// `roll-tree-reduced`
    RollTreeReduced,
    /// `roll-bucket`
    RollBucket,
    /// `roll-bucket-sorted`
    RollBucketSorted,
}

impl SamplingMode {
    /// Flag value passed to the benchmark
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RollTree => "roll-tree",
            Self::RollTreeReduced => "roll-tree-reduced",
            Self::RollBucket => "roll-bucket",
            Self::RollBucketSorted => "roll-bucket-sorted",
        }
    }
}

impl fmt::Display for SamplingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One concrete combination of sweep axis values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterPoint {
    mode: SamplingMode,
    exponent: u32,
    m: u32,
    distribution_file: Option<PathBuf>,
}

impl ParameterPoint {
    /// Point with `10^exponent` nodes and branching factor `m`
    #[must_use]
    pub const fn new(mode: SamplingMode, exponent: u32, m: u32) -> Self {
        Self {
            mode,
            exponent,
            m,
            distribution_file: None,
        }
    }

    /// Ask the benchmark to dump its degree distribution to `path` (`-d`)
    #[must_use]
    pub fn with_distribution_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.distribution_file = Some(path.into());
        self
    }

    /// Sampling mode
    #[must_use]
    pub const fn mode(&self) -> SamplingMode {
        self.mode
    }

    /// Branching factor
    #[must_use]
    pub const fn m(&self) -> u32 {
        self.m
    }

    /// Node count, `10^exponent`
    #[must_use]
    pub const fn node_count(&self) -> u64 {
        10_u64.pow(self.exponent)
    }

    /// Benchmark arguments for this point (without the launcher prefix)
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-s".to_string(),
            self.mode.as_str().to_string(),
            "-n".to_string(),
            self.node_count().to_string(),
            "-m".to_string(),
            self.m.to_string(),
        ];
        if let Some(path) = &self.distribution_file {
            args.push("-d".to_string());
            args.push(path.display().to_string());
        }
        args
    }
}

/// Every implemented sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SweepId {
    /// Bucket reduction ratio of roll-tree
    Fig2,
    /// Comparisons and time of roll-bucket vs sorted buckets
    Fig3,
    /// Tree code word length vs optimal Huffman length
    Fig5,
    /// Bucket insert/remove reduction of roll-tree-reduced
    Fig6,
    /// Comparisons per edge, tree vs bucket
    Fig7,
    /// Degree distribution dump at 10^9 nodes
    Fig8,
}

/// Procedure signature shared by all sweeps
pub type SweepFn = fn(&mut SweepContext<'_>) -> Result<()>;

/// Compile-time dispatch table, indexed by `SweepId::slot`
const REGISTRY: [(SweepId, SweepFn); 6] = [
    (SweepId::Fig2, figures::fig2),
    (SweepId::Fig3, figures::fig3),
    (SweepId::Fig5, figures::fig5),
    (SweepId::Fig6, figures::fig6),
    (SweepId::Fig7, figures::fig7),
    (SweepId::Fig8, figures::fig8),
];

impl SweepId {
    /// All sweeps in figure order
    pub const ALL: [Self; 6] = [
        Self::Fig2,
        Self::Fig3,
        Self::Fig5,
        Self::Fig6,
        Self::Fig7,
        Self::Fig8,
    ];

    /// Figure number
    #[must_use]
    pub const fn number(self) -> u32 {
        match self {
            Self::Fig2 => 2,
            Self::Fig3 => 3,
            Self::Fig5 => 5,
            Self::Fig6 => 6,
            Self::Fig7 => 7,
            Self::Fig8 => 8,
        }
    }

    /// Position of this sweep in `ALL` and the dispatch table
    const fn slot(self) -> usize {
        match self {
            Self::Fig2 => 0,
            Self::Fig3 => 1,
            Self::Fig5 => 2,
            Self::Fig6 => 3,
            Self::Fig7 => 4,
            Self::Fig8 => 5,
        }
    }

    /// Resolve `2`, `fig2` or `-fig2` (prefix case-insensitive) by exact match.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSweep` if the selector names no implemented sweep
    pub fn parse_selector(selector: &str) -> Result<Self> {
        let lowered = selector.to_ascii_lowercase();
        let number = lowered
            .strip_prefix("-fig")
            .or_else(|| lowered.strip_prefix("fig"))
            .unwrap_or(&lowered);

        Self::ALL
            .into_iter()
            .find(|id| id.number().to_string() == number)
            .ok_or_else(|| Error::UnknownSweep {
                selector: selector.to_string(),
                available: Self::ALL
                    .iter()
                    .map(|id| id.number().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Procedure registered for this sweep
    #[must_use]
    pub const fn procedure(self) -> SweepFn {
        REGISTRY[self.slot()].1
    }

    /// Run this sweep to completion
    ///
    /// # Errors
    ///
    /// The first process, parse or series failure
    pub fn run(self, ctx: &mut SweepContext<'_>) -> Result<()> {
        tracing::info!("\n\n    Fig {}    \n===============================", self.number());
        (self.procedure())(ctx)
    }
}

impl fmt::Display for SweepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fig{}", self.number())
    }
}

/// Collaborators a sweep procedure drives, plus progress counters.
pub struct SweepContext<'a> {
    config: &'a BenchConfig,
    runner: &'a dyn ProcessRunner,
    writer: &'a SeriesWriter,
    points: usize,
    appends: usize,
}

impl<'a> SweepContext<'a> {
    /// Context for one sweep
    #[must_use]
    pub fn new(
        config: &'a BenchConfig,
        runner: &'a dyn ProcessRunner,
        writer: &'a SeriesWriter,
    ) -> Self {
        Self {
            config,
            runner,
            writer,
            points: 0,
            appends: 0,
        }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &BenchConfig {
        self.config
    }

    /// Parameter points averaged (or run) so far
    #[must_use]
    pub const fn points(&self) -> usize {
        self.points
    }

    /// Series lines appended so far
    #[must_use]
    pub const fn appends(&self) -> usize {
        self.appends
    }

    /// Average all trials of `point`.
    ///
    /// # Errors
    ///
    /// Propagates the first trial failure
    pub fn average(&mut self, point: &ParameterPoint) -> Result<AggregateResult> {
        let command = self.config.command(&point.args());
        let result = TrialAverager::new(self.runner, &self.config.schema, self.config.trials)
            .parallel(self.config.parallel_trials)
            .average(&command)?;
        self.points += 1;
        Ok(result)
    }

    /// Run `point` exactly once, without averaging.
    ///
    /// # Errors
    ///
    /// Process or parse failure
    pub fn run_once(&mut self, point: &ParameterPoint) -> Result<ResultRecord> {
        let command = self.config.command(&point.args());
        tracing::info!("Params: {}", command.join(" "));
        let tokens = self.runner.run(&command)?;
        let record = self.config.schema.parse(&tokens, &command)?;
        self.points += 1;
        Ok(record)
    }

    /// Append one `(x, y)` pair to `series`.
    ///
    /// # Errors
    ///
    /// Returns `SeriesWrite` on IO failure
    pub fn persist(&mut self, series: &str, x: &str, y: f64) -> Result<()> {
        self.writer.append(series, x, y)?;
        self.appends += 1;
        Ok(())
    }
}
