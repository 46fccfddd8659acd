//! figsweep CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;
use figsweep::config::{BenchConfig, BenchConfigBuilder};
use figsweep::orchestrator::{resolve_selectors, Orchestrator};
use figsweep::runner::CommandRunner;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "figsweep")]
#[command(about = "Run benchmark sweeps and append averaged results to plot series")]
#[command(version)]
struct Cli {
    /// Sweeps to run, in order: `2`, `fig2` or `-fig2`. A `-Xmx<size>` token
    /// overrides the benchmark heap limit.
    #[arg(required = true, allow_hyphen_values = true)]
    selectors: Vec<String>,

    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Benchmark heap limit (e.g. 8g)
    #[arg(long)]
    memory: Option<String>,

    /// Executable hosting the benchmark
    #[arg(long)]
    launcher: Option<String>,

    /// Benchmark jar
    #[arg(long)]
    jar: Option<PathBuf>,

    /// Trials averaged per parameter point
    #[arg(long)]
    trials: Option<usize>,

    /// Kill a trial after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Directory receiving the series files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Run the trials of each point concurrently
    #[arg(long)]
    parallel_trials: bool,

    /// Write a JSON summary of the sweep runs here
    #[arg(long)]
    summary: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<(BenchConfig, Vec<String>, Option<PathBuf>)> {
        let base = match &self.config {
            Some(path) => BenchConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => BenchConfig::default(),
        };

        let (mut builder, selectors) =
            BenchConfigBuilder::from_config(base).heap_overrides(self.selectors, self.memory);
        if let Some(launcher) = self.launcher {
            builder = builder.launcher(launcher);
        }
        if let Some(jar) = self.jar {
            builder = builder.jar(jar);
        }
        if let Some(trials) = self.trials {
            builder = builder.trials(trials);
        }
        if self.timeout_secs.is_some() {
            builder = builder.timeout_secs(self.timeout_secs);
        }
        if let Some(dir) = self.output_dir {
            builder = builder.output_dir(dir);
        }
        if self.parallel_trials {
            builder = builder.parallel_trials(true);
        }

        Ok((builder.build()?, selectors, self.summary))
    }
}

/// `RUST_LOG` directives when given and valid, `info` otherwise
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() -> Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(log_filter(directives.as_deref()))
        .init();

    let (config, selectors, summary) = Cli::parse().into_config()?;

    // Unknown figures are fatal before any benchmark process starts.
    let sweeps = resolve_selectors(selectors.as_slice())?;
    if sweeps.is_empty() {
        anyhow::bail!("no sweep selected (available: 2, 3, 5, 6, 7, 8)");
    }

    tracing::info!(
        heap = %config.memory_limit,
        trials = config.trials,
        output_dir = %config.output_dir.display(),
        "figsweep starting"
    );

    let runner = CommandRunner::new(config.schema.len()).with_timeout(config.timeout());
    let mut orchestrator = Orchestrator::new(&config, &runner);
    let outcome = orchestrator.run_all(&sweeps);

    if let Some(path) = summary {
        orchestrator
            .write_summary(&path)
            .with_context(|| format!("writing summary {}", path.display()))?;
    }

    outcome.context("sweep run aborted")
}
