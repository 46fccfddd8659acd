//! Shared test doubles for the benchmark process

#![allow(dead_code)]

use figsweep::runner::ProcessRunner;
use figsweep::{Error, Result};
use std::sync::Mutex;

/// Value following `flag` in a child command
pub fn flag_value<'a>(command: &'a [String], flag: &str) -> Option<&'a str> {
    command
        .iter()
        .position(|arg| arg == flag)
        .and_then(|i| command.get(i + 1))
        .map(String::as_str)
}

/// Fake ROLL benchmark: emits a deterministic 13-column line per mode.
///
/// | mode               | NumEdges | NumComparisons | TotalTime | NumBuckets | ins | rem |
/// |--------------------|----------|----------------|-----------|------------|-----|-----|
/// | roll-tree          | 2n       | 4n             | 2e9       | n/4        | 100 | 100 |
/// | roll-tree-reduced  | 2n       | 4n             | 2e9       | n/4        | 30  | 20  |
/// | roll-bucket        | 2n       | 6n             | 3e9       | n/2        | 0   | 0   |
/// | roll-bucket-sorted | 2n       | 5n             | 1e9       | n/2        | 0   | 0   |
///
/// Code word lengths are 3.5 (tree) and 3.0 (Huffman). Like the real
/// benchmark, a `-d <path>` run writes the degree distribution to `path` and
/// fails if it cannot.
#[derive(Default)]
pub struct FakeRoll {
    commands: Mutex<Vec<Vec<String>>>,
    fail_on_call: Option<usize>,
}

impl FakeRoll {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exit non-zero on the given 1-based call
    pub fn failing_on(call: usize) -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            fail_on_call: Some(call),
        }
    }

    pub fn calls(&self) -> usize {
        self.commands.lock().unwrap().len()
    }

    pub fn commands(&self) -> Vec<Vec<String>> {
        self.commands.lock().unwrap().clone()
    }

    pub fn line(mode: &str, n: f64, m: f64) -> String {
        let (comparisons, time, buckets, ins, rem) = match mode {
            "roll-tree" => (4.0 * n, 2e9, n / 4.0, 100.0, 100.0),
            "roll-tree-reduced" => (4.0 * n, 2e9, n / 4.0, 30.0, 20.0),
            "roll-bucket" => (6.0 * n, 3e9, n / 2.0, 0.0, 0.0),
            _ => (5.0 * n, 1e9, n / 2.0, 0.0, 0.0),
        };
        format!(
            "{mode} {n} {m} {} {comparisons} {time} 0 0 {buckets} 3.5 3.0 {ins} {rem}",
            2.0 * n
        )
    }
}

impl ProcessRunner for FakeRoll {
    fn run(&self, command: &[String]) -> Result<Vec<String>> {
        let call = {
            let mut commands = self.commands.lock().unwrap();
            commands.push(command.to_vec());
            commands.len()
        };
        if self.fail_on_call == Some(call) {
            return Err(Error::NonZeroExit {
                command: command.to_vec(),
                code: Some(1),
                last_line: "Exception in thread \"main\"".to_string(),
            });
        }

        if let Some(path) = flag_value(command, "-d") {
            if std::fs::write(path, "1\t1\n").is_err() {
                return Err(Error::NonZeroExit {
                    command: command.to_vec(),
                    code: Some(1),
                    last_line: format!("java.io.FileNotFoundException: {path}"),
                });
            }
        }

        let mode = flag_value(command, "-s").unwrap_or("roll-tree");
        let n: f64 = flag_value(command, "-n").unwrap_or("0").parse().unwrap();
        let m: f64 = flag_value(command, "-m").unwrap_or("0").parse().unwrap();
        Ok(Self::line(mode, n, m).split(' ').map(str::to_string).collect())
    }
}

/// Returns the same token list for every call.
pub struct FixedRunner(pub Vec<String>);

impl FixedRunner {
    pub fn line(line: &str) -> Self {
        Self(line.split(' ').map(str::to_string).collect())
    }
}

impl ProcessRunner for FixedRunner {
    fn run(&self, _command: &[String]) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}
