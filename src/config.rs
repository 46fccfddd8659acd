//! Orchestrator configuration
//!
//! `BenchConfig` is an explicit value handed to whatever builds argument
//! vectors. Nothing here is global or mutated after construction.

use crate::schema::ResultSchema;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default number of trials averaged per parameter point
pub const DEFAULT_TRIALS: usize = 10;

/// Default JVM heap limit for the benchmark
pub const DEFAULT_MEMORY_LIMIT: &str = "4g";

/// Default benchmark jar
pub const DEFAULT_JAR: &str = "target/ROLL-0.3-SNAPSHOT-jar-with-dependencies.jar";

const XMX_PREFIX: &str = "-Xmx";

/// Configuration for one orchestrator invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Executable that hosts the benchmark (`java`)
    pub launcher: String,
    /// Heap limit passed as `-Xmx<memory_limit>`
    pub memory_limit: String,
    /// Benchmark jar passed after `-jar`
    pub jar: PathBuf,
    /// Trials averaged per parameter point
    pub trials: usize,
    /// Per-trial wall-clock limit; `None` waits forever
    pub timeout_secs: Option<u64>,
    /// Directory that receives series files
    pub output_dir: PathBuf,
    /// Run the trials of a point concurrently
    pub parallel_trials: bool,
    /// Layout of the benchmark's result line
    pub schema: ResultSchema,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            launcher: "java".to_string(),
            memory_limit: DEFAULT_MEMORY_LIMIT.to_string(),
            jar: PathBuf::from(DEFAULT_JAR),
            trials: DEFAULT_TRIALS,
            timeout_secs: None,
            output_dir: PathBuf::from("."),
            parallel_trials: false,
            schema: ResultSchema::roll(),
        }
    }
}

impl BenchConfig {
    /// Create a builder starting from the defaults
    #[must_use]
    pub fn builder() -> BenchConfigBuilder {
        BenchConfigBuilder::default()
    }

    /// Load a config from a JSON file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed, or fails validation
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let mut config: Self = serde_json::from_str(&raw)?;
        config.memory_limit = parse_memory_limit(&config.memory_limit)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the runner relies on.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a zero trial count, a zero timeout, an
    /// empty launcher or schema, or a malformed memory limit
    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(Error::InvalidConfig("trials must be at least 1".to_string()));
        }
        if self.timeout_secs == Some(0) {
            return Err(Error::InvalidConfig(
                "timeout must be positive (omit it to wait forever)".to_string(),
            ));
        }
        if self.launcher.trim().is_empty() {
            return Err(Error::InvalidConfig("launcher must not be empty".to_string()));
        }
        if self.schema.is_empty() {
            return Err(Error::InvalidConfig(
                "result schema needs at least the sampling mode field".to_string(),
            ));
        }
        parse_memory_limit(&self.memory_limit)?;
        Ok(())
    }

    /// Per-trial timeout as a `Duration`
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Fixed prefix of every child command: launcher, heap flag, jar.
    #[must_use]
    pub fn base_command(&self) -> Vec<String> {
        vec![
            self.launcher.clone(),
            format!("{XMX_PREFIX}{}", self.memory_limit),
            "-jar".to_string(),
            self.jar.display().to_string(),
        ]
    }

    /// Full child command: the base prefix followed by `args`.
    #[must_use]
    pub fn command(&self, args: &[String]) -> Vec<String> {
        let mut command = self.base_command();
        command.extend(args.iter().cloned());
        command
    }
}

/// Normalize a heap limit given as `8g` or `-Xmx8g` to `8g`.
///
/// # Errors
///
/// Returns `InvalidConfig` unless the value is digits with an optional
/// `k`/`m`/`g`/`t` unit
pub fn parse_memory_limit(raw: &str) -> Result<String> {
    let value = raw.strip_prefix(XMX_PREFIX).unwrap_or(raw);
    let digits =
        value.trim_end_matches(|c: char| matches!(c.to_ascii_lowercase(), 'k' | 'm' | 'g' | 't'));
    let unit_len = value.len() - digits.len();
    if digits.is_empty() || unit_len > 1 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidConfig(format!("cannot parse memory limit: {raw}")));
    }
    Ok(value.to_string())
}

/// Whether a command-line token is a heap override such as `-Xmx8g`
#[must_use]
pub fn is_memory_token(token: &str) -> bool {
    token.starts_with(XMX_PREFIX)
}

/// Separate `-Xmx` heap tokens from sweep selectors.
///
/// Returns the heap override to apply, if any, and the remaining selectors in
/// the order given. An explicit `memory_flag` beats any token; among
/// tokens the last one wins. The override is not validated here; the builder
/// rejects a malformed value.
#[must_use]
pub fn split_heap_tokens(
    tokens: Vec<String>,
    memory_flag: Option<String>,
) -> (Option<String>, Vec<String>) {
    let (heap, selectors): (Vec<String>, Vec<String>) =
        tokens.into_iter().partition(|token| is_memory_token(token));
    (memory_flag.or_else(|| heap.into_iter().last()), selectors)
}

/// Builder for `BenchConfig`.
#[derive(Debug, Default)]
pub struct BenchConfigBuilder {
    config: BenchConfig,
}

impl BenchConfigBuilder {
    /// Start from an existing config (e.g. one loaded from disk)
    #[must_use]
    pub const fn from_config(config: BenchConfig) -> Self {
        Self { config }
    }

    /// Set the launcher executable
    #[must_use]
    pub fn launcher(mut self, launcher: impl Into<String>) -> Self {
        self.config.launcher = launcher.into();
        self
    }

    /// Set the heap limit (`8g` or `-Xmx8g`)
    #[must_use]
    pub fn memory_limit(mut self, limit: impl Into<String>) -> Self {
        self.config.memory_limit = limit.into();
        self
    }

    /// Apply command-line heap overrides and return the sweep selectors.
    ///
    /// See [`split_heap_tokens`] for precedence.
    #[must_use]
    pub fn heap_overrides(
        self,
        tokens: Vec<String>,
        memory_flag: Option<String>,
    ) -> (Self, Vec<String>) {
        match split_heap_tokens(tokens, memory_flag) {
            (Some(limit), selectors) => (self.memory_limit(limit), selectors),
            (None, selectors) => (self, selectors),
        }
    }

    /// Set the benchmark jar
    #[must_use]
    pub fn jar(mut self, jar: impl Into<PathBuf>) -> Self {
        self.config.jar = jar.into();
        self
    }

    /// Set trials per point
    #[must_use]
    pub const fn trials(mut self, trials: usize) -> Self {
        self.config.trials = trials;
        self
    }

    /// Set the per-trial timeout in seconds
    #[must_use]
    pub const fn timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// Set the series output directory
    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Enable concurrent trials
    #[must_use]
    pub const fn parallel_trials(mut self, parallel: bool) -> Self {
        self.config.parallel_trials = parallel;
        self
    }

    /// Set the result line schema
    #[must_use]
    pub fn schema(mut self, schema: ResultSchema) -> Self {
        self.config.schema = schema;
        self
    }

    /// Validate and build the config.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if validation fails
    pub fn build(mut self) -> Result<BenchConfig> {
        self.config.memory_limit = parse_memory_limit(&self.config.memory_limit)?;
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_command() {
        let config = BenchConfig::default();
        assert_eq!(
            config.base_command(),
            vec!["java", "-Xmx4g", "-jar", DEFAULT_JAR]
        );
    }

    #[test]
    fn test_memory_override_threads_into_command() {
        let config = BenchConfig::builder().memory_limit("-Xmx16g").build().unwrap();
        assert_eq!(config.memory_limit, "16g");
        let command = config.command(&["-s".to_string(), "roll-tree".to_string()]);
        assert_eq!(command[1], "-Xmx16g");
        assert_eq!(&command[4..], &["-s", "roll-tree"]);
    }

    #[test]
    fn test_parse_memory_limit() {
        assert_eq!(parse_memory_limit("512m").unwrap(), "512m");
        assert_eq!(parse_memory_limit("-Xmx2G").unwrap(), "2G");
        assert_eq!(parse_memory_limit("1024").unwrap(), "1024");
        assert!(parse_memory_limit("-Xmx").is_err());
        assert!(parse_memory_limit("lots").is_err());
        assert!(parse_memory_limit("4gg").is_err());
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_heap_tokens_partitioned_from_selectors() {
        let (limit, selectors) =
            split_heap_tokens(strings(&["-fig2", "-Xmx8g", "3", "fig5"]), None);
        assert_eq!(limit.as_deref(), Some("-Xmx8g"));
        assert_eq!(selectors, strings(&["-fig2", "3", "fig5"]));
    }

    #[test]
    fn test_last_heap_token_wins() {
        let (builder, selectors) = BenchConfig::builder()
            .heap_overrides(strings(&["-Xmx2g", "2", "-Xmx16g"]), None);
        assert_eq!(selectors, strings(&["2"]));
        assert_eq!(builder.build().unwrap().memory_limit, "16g");
    }

    #[test]
    fn test_memory_flag_beats_heap_token() {
        let (builder, _) = BenchConfig::builder()
            .heap_overrides(strings(&["-Xmx2g", "2"]), Some("32g".to_string()));
        assert_eq!(builder.build().unwrap().base_command()[1], "-Xmx32g");
    }

    #[test]
    fn test_no_heap_override_keeps_base() {
        let base = BenchConfig::builder().memory_limit("6g").build().unwrap();
        let (builder, selectors) =
            BenchConfigBuilder::from_config(base).heap_overrides(strings(&["7"]), None);
        assert_eq!(selectors, strings(&["7"]));
        assert_eq!(builder.build().unwrap().memory_limit, "6g");
    }

    #[test]
    fn test_malformed_heap_token_rejected() {
        let (builder, _) = BenchConfig::builder().heap_overrides(strings(&["-Xmxlots", "2"]), None);
        let err = builder.build().unwrap_err();
        assert!(err.to_string().contains("-Xmxlots"));
    }

    #[test]
    fn test_zero_trials_rejected() {
        let err = BenchConfig::builder().trials(0).build().unwrap_err();
        assert!(err.to_string().contains("trials"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(BenchConfig::builder().timeout_secs(Some(0)).build().is_err());
        let config = BenchConfig::builder().timeout_secs(Some(30)).build().unwrap();
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let config: BenchConfig = serde_json::from_str(r#"{"trials": 3}"#).unwrap();
        assert_eq!(config.trials, 3);
        assert_eq!(config.launcher, "java");
        assert_eq!(config.schema.len(), 13);
    }

    #[test]
    fn test_json_file_rejects_empty_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.json");
        std::fs::write(&path, r#"{"schema": {"fields": []}}"#).unwrap();

        let err = BenchConfig::from_json_file(&path).unwrap_err();
        assert!(err.to_string().contains("sampling mode"));
    }

    #[test]
    fn test_json_file_normalizes_heap_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.json");
        std::fs::write(&path, r#"{"memory_limit": "-Xmx8g", "timeout_secs": 600}"#).unwrap();

        let config = BenchConfig::from_json_file(&path).unwrap();
        assert_eq!(config.base_command()[1], "-Xmx8g");
        assert_eq!(config.timeout(), Some(Duration::from_secs(600)));
    }
}
