//! Multi-trial averaging
//!
//! A parameter point is run `trials` times and each numeric field is reduced
//! to its arithmetic mean. Any failed trial fails the point; there is no
//! averaging over the survivors.

use crate::runner::ProcessRunner;
use crate::schema::{ResultRecord, ResultSchema};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Per-field means for one parameter point.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    trials: usize,
    means: BTreeMap<String, f64>,
}

impl AggregateResult {
    /// Mean of `field` across all trials.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` if the schema has no such numeric field
    pub fn mean(&self, field: &str) -> Result<f64> {
        self.means
            .get(field)
            .copied()
            .ok_or_else(|| Error::UnknownField(field.to_string()))
    }

    /// Number of trials that went into each mean
    #[must_use]
    pub const fn trials(&self) -> usize {
        self.trials
    }

    /// All means in field-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.means.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Runs a command repeatedly through a `ProcessRunner` and averages the records.
pub struct TrialAverager<'a> {
    runner: &'a dyn ProcessRunner,
    schema: &'a ResultSchema,
    trials: usize,
    parallel: bool,
}

impl<'a> TrialAverager<'a> {
    /// Sequential averager over `trials` runs
    #[must_use]
    pub fn new(runner: &'a dyn ProcessRunner, schema: &'a ResultSchema, trials: usize) -> Self {
        Self {
            runner,
            schema,
            trials,
            parallel: false,
        }
    }

    /// Run trials concurrently on the rayon pool.
    ///
    /// Without the `parallel` feature this is accepted and ignored.
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run every trial of `command` and return the per-field means.
    ///
    /// # Errors
    ///
    /// The first trial failure, a `FieldParse` error, or `InvalidConfig`
    /// when the trial count is zero
    pub fn average(&self, command: &[String]) -> Result<AggregateResult> {
        if self.trials == 0 {
            return Err(Error::InvalidConfig("trials must be at least 1".to_string()));
        }
        tracing::info!(trials = self.trials, "Params: {}", command.join(" "));

        let records = if self.parallel {
            self.run_parallel(command)?
        } else {
            self.run_sequential(command)?
        };

        Ok(self.reduce(&records))
    }

    fn run_trial(&self, command: &[String]) -> Result<ResultRecord> {
        let tokens = self.runner.run(command)?;
        self.schema.parse(&tokens, command)
    }

    fn run_sequential(&self, command: &[String]) -> Result<Vec<ResultRecord>> {
        (0..self.trials).map(|_| self.run_trial(command)).collect()
    }

    #[cfg(feature = "parallel")]
    fn run_parallel(&self, command: &[String]) -> Result<Vec<ResultRecord>> {
        use rayon::prelude::*;

        (0..self.trials)
            .into_par_iter()
            .map(|_| self.run_trial(command))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn run_parallel(&self, command: &[String]) -> Result<Vec<ResultRecord>> {
        tracing::warn!("built without the `parallel` feature; running trials sequentially");
        self.run_sequential(command)
    }

    #[allow(clippy::cast_precision_loss)]
    fn reduce(&self, records: &[ResultRecord]) -> AggregateResult {
        let mut sums: BTreeMap<String, f64> = self
            .schema
            .numeric_fields()
            .map(|field| (field.to_string(), 0.0))
            .collect();

        for record in records {
            for (field, value) in record.values() {
                if let Some(sum) = sums.get_mut(field) {
                    *sum += value;
                }
            }
        }

        let n = self.trials as f64;
        for sum in sums.values_mut() {
            *sum /= n;
        }

        AggregateResult {
            trials: self.trials,
            means: sums,
        }
    }
}
