//! Sweep orchestration and run tracking
//!
//! Selectors are all resolved before the first process is spawned, then the
//! sweeps execute one after another. Each execution is tracked by a
//! `SweepRun` with its lifecycle timestamps and progress counters.

use crate::config::BenchConfig;
use crate::runner::ProcessRunner;
use crate::series::SeriesWriter;
use crate::sweep::{SweepContext, SweepId};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Status of a sweep run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Resolved but not yet started.
    Pending,
    /// Currently executing.
    Running,
    /// Every point completed and was persisted.
    Success,
    /// Aborted by a process, parse or write error.
    Failed,
}

/// Lifecycle record of one sweep execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SweepRun {
    sweep: SweepId,
    status: RunStatus,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    points: usize,
    appends: usize,
    error: Option<String>,
}

impl SweepRun {
    /// Create a run record in Pending status.
    #[must_use]
    pub const fn new(sweep: SweepId) -> Self {
        Self {
            sweep,
            status: RunStatus::Pending,
            started_at: None,
            ended_at: None,
            points: 0,
            appends: 0,
            error: None,
        }
    }

    /// Sweep this run executes
    #[must_use]
    pub const fn sweep(&self) -> SweepId {
        self.sweep
    }

    /// Current status
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Start timestamp, if started
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// End timestamp, if finished
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Parameter points completed
    #[must_use]
    pub const fn points(&self) -> usize {
        self.points
    }

    /// Series lines appended
    #[must_use]
    pub const fn appends(&self) -> usize {
        self.appends
    }

    /// Error message if the run failed
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Transition Pending → Running and stamp `started_at`.
    pub fn start(&mut self) {
        self.status = RunStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Record the final outcome and stamp `ended_at`.
    pub fn complete(&mut self, ctx: &SweepContext<'_>, outcome: &Result<()>) {
        self.points = ctx.points();
        self.appends = ctx.appends();
        match outcome {
            Ok(()) => self.status = RunStatus::Success,
            Err(e) => {
                self.status = RunStatus::Failed;
                self.error = Some(e.to_string());
            }
        }
        self.ended_at = Some(Utc::now());
    }
}

/// Resolve every selector up front.
///
/// # Errors
///
/// Returns `UnknownSweep` for the first selector that matches nothing
pub fn resolve_selectors<S: AsRef<str>>(selectors: &[S]) -> Result<Vec<SweepId>> {
    selectors
        .iter()
        .map(|s| SweepId::parse_selector(s.as_ref()))
        .collect()
}

/// Drives a list of sweeps against one runner and output directory.
pub struct Orchestrator<'a> {
    config: &'a BenchConfig,
    runner: &'a dyn ProcessRunner,
    writer: SeriesWriter,
    runs: Vec<SweepRun>,
}

impl<'a> Orchestrator<'a> {
    /// Orchestrator writing series under `config.output_dir`
    #[must_use]
    pub fn new(config: &'a BenchConfig, runner: &'a dyn ProcessRunner) -> Self {
        Self {
            config,
            runner,
            writer: SeriesWriter::new(&config.output_dir),
            runs: Vec::new(),
        }
    }

    /// Runs recorded so far, in execution order
    #[must_use]
    pub fn runs(&self) -> &[SweepRun] {
        &self.runs
    }

    /// Resolve `selectors` and run them in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// `UnknownSweep` before any work starts, otherwise the failing sweep's error
    pub fn run_selectors<S: AsRef<str>>(&mut self, selectors: &[S]) -> Result<()> {
        let sweeps = resolve_selectors(selectors)?;
        self.run_all(&sweeps)
    }

    /// Run `sweeps` in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// The failing sweep's error
    pub fn run_all(&mut self, sweeps: &[SweepId]) -> Result<()> {
        for &sweep in sweeps {
            self.run_one(sweep)?;
        }
        Ok(())
    }

    /// Run a single sweep and record it.
    ///
    /// The output directory exists before the first child starts, since some
    /// sweeps hand the benchmark paths inside it.
    ///
    /// # Errors
    ///
    /// `SeriesWrite` if the output directory cannot be created, otherwise the
    /// first process, parse or series failure of the sweep
    pub fn run_one(&mut self, sweep: SweepId) -> Result<()> {
        let dir = self.writer.dir();
        std::fs::create_dir_all(dir).map_err(|source| Error::SeriesWrite {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut run = SweepRun::new(sweep);
        let mut ctx = SweepContext::new(self.config, self.runner, &self.writer);

        run.start();
        let outcome = sweep.run(&mut ctx);
        run.complete(&ctx, &outcome);

        match &outcome {
            Ok(()) => tracing::info!(
                sweep = %sweep,
                points = run.points(),
                appends = run.appends(),
                "sweep complete"
            ),
            Err(e) => tracing::error!(sweep = %sweep, "sweep failed: {e}"),
        }

        self.runs.push(run);
        outcome
    }

    /// Write the recorded runs as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the write fails
    pub fn write_summary<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.runs)?;
        std::fs::write(path.as_ref(), json).map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_default() {
        let run = SweepRun::new(SweepId::Fig2);
        assert_eq!(run.status(), RunStatus::Pending);
        assert!(run.started_at().is_none());
    }

    #[test]
    fn test_resolve_rejects_any_unknown() {
        let err = resolve_selectors(&["2", "-fig3", "99"]).unwrap_err();
        assert!(matches!(err, Error::UnknownSweep { ref selector, .. } if selector == "99"));
    }

    #[test]
    fn test_resolve_keeps_order() {
        let ids = resolve_selectors(&["-fig8", "2"]).unwrap();
        assert_eq!(ids, vec![SweepId::Fig8, SweepId::Fig2]);
    }
}
