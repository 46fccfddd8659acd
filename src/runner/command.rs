//! `std::process` backed runner

use super::{tokenize_last_line, ProcessRunner};
use crate::{Error, Result};
use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStderr, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Poll interval while waiting on a child under a deadline
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs the benchmark as a real child process.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    min_tokens: usize,
    timeout: Option<Duration>,
}

impl CommandRunner {
    /// Runner that requires at least `min_tokens` tokens on the result line
    /// and waits indefinitely.
    #[must_use]
    pub const fn new(min_tokens: usize) -> Self {
        Self {
            min_tokens,
            timeout: None,
        }
    }

    /// Kill the child and fail with `Timeout` once `timeout` elapses.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured per-run timeout
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn spawn(command: &[String]) -> Result<Child> {
        let (program, args) = command.split_first().ok_or_else(|| {
            Error::InvalidConfig("cannot run an empty command".to_string())
        })?;
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::Launch {
                command: command.to_vec(),
                source,
            })
    }

    /// Wait for exit, or kill once the deadline passes. `Ok(None)` means killed.
    fn wait(child: &mut Child, timeout: Option<Duration>) -> std::io::Result<Option<ExitStatus>> {
        let Some(timeout) = timeout else {
            return child.wait().map(Some);
        };
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                // Already-exited races are harmless; kill then reap.
                let _ = child.kill();
                child.wait()?;
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Latest stderr line, shared with the reader thread
type LastLine = Arc<Mutex<Option<String>>>;

/// Drain stderr on its own thread so the child never blocks on a full pipe.
///
/// Lines are decoded lossily: a stray non-UTF-8 byte in progress chatter
/// must not cost the run.
fn drain_stderr(stderr: ChildStderr, last: LastLine) -> JoinHandle<std::io::Result<()>> {
    thread::spawn(move || {
        let mut reader = BufReader::new(stderr);
        let mut raw = Vec::new();
        loop {
            raw.clear();
            if reader.read_until(b'\n', &mut raw)? == 0 {
                return Ok(());
            }
            let line = decode_line(&raw);
            tracing::info!("\t-Output: {line}");
            if let Ok(mut slot) = last.lock() {
                *slot = Some(line);
            }
        }
    })
}

/// Decode one raw line without its `\n` or `\r\n` terminator
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

fn snapshot(last: &LastLine) -> Option<String> {
    last.lock().ok().and_then(|slot| slot.clone())
}

impl ProcessRunner for CommandRunner {
    fn run(&self, command: &[String]) -> Result<Vec<String>> {
        tracing::debug!(command = %command.join(" "), "spawning benchmark");
        let mut child = Self::spawn(command)?;
        let last: LastLine = Arc::default();
        let reader = child
            .stderr
            .take()
            .map(|stderr| drain_stderr(stderr, Arc::clone(&last)));

        let lost = |source: std::io::Error, last: &LastLine| Error::ProcessIo {
            command: command.to_vec(),
            last_line: snapshot(last).unwrap_or_default(),
            source,
        };

        let waited = Self::wait(&mut child, self.timeout).map_err(|e| lost(e, &last))?;
        let Some(status) = waited else {
            // A grandchild may still hold the pipe open; don't join the reader.
            return Err(Error::Timeout {
                command: command.to_vec(),
                timeout: self.timeout.unwrap_or_default(),
                last_line: snapshot(&last).unwrap_or_default(),
            });
        };

        if let Some(handle) = reader {
            handle
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stderr reader panicked")))
                .map_err(|e| lost(e, &last))?;
        }
        let last_line = snapshot(&last);

        if !status.success() {
            return Err(Error::NonZeroExit {
                command: command.to_vec(),
                code: status.code(),
                last_line: last_line.unwrap_or_default(),
            });
        }

        tokenize_last_line(last_line, self.min_tokens, command)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_keeps_only_last_stderr_line() {
        let runner = CommandRunner::new(3);
        let tokens = runner
            .run(&sh("echo starting >&2; echo 'roll-tree 1000 2' >&2; echo ignored"))
            .unwrap();
        assert_eq!(tokens, vec!["roll-tree", "1000", "2"]);
    }

    #[test]
    fn test_non_zero_exit_carries_command_and_output() {
        let runner = CommandRunner::new(1);
        let err = runner.run(&sh("echo 'boom happened' >&2; exit 1")).unwrap_err();
        match err {
            Error::NonZeroExit {
                code,
                last_line,
                command,
            } => {
                assert_eq!(code, Some(1));
                assert_eq!(last_line, "boom happened");
                assert_eq!(command[0], "sh");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_silent_child_is_empty_output() {
        let runner = CommandRunner::new(1);
        let err = runner.run(&sh("exit 0")).unwrap_err();
        assert!(matches!(err, Error::EmptyOutput { .. }));
    }

    #[test]
    fn test_short_line_is_malformed() {
        let runner = CommandRunner::new(13);
        let err = runner.run(&sh("echo 'roll-tree 1000' >&2")).unwrap_err();
        assert!(matches!(err, Error::MalformedOutput { expected: 13, actual: 2, .. }));
    }

    #[test]
    fn test_missing_executable_is_launch_error() {
        let runner = CommandRunner::new(1);
        let err = runner
            .run(&["/nonexistent/figsweep-bench".to_string()])
            .unwrap_err();
        assert!(matches!(err, Error::Launch { .. }));
    }

    #[test]
    fn test_hung_child_times_out() {
        let runner = CommandRunner::new(1).with_timeout(Some(Duration::from_millis(200)));
        let started = Instant::now();
        let err = runner.run(&sh("exec sleep 10")).unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_timeout_reports_progress_seen_so_far() {
        let runner = CommandRunner::new(1).with_timeout(Some(Duration::from_millis(500)));
        let err = runner.run(&sh("echo 'warming up' >&2; exec sleep 10")).unwrap_err();
        match err {
            Error::Timeout { last_line, .. } => assert_eq!(last_line, "warming up"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_utf8_progress_line_is_tolerated() {
        let runner = CommandRunner::new(2);
        let tokens = runner
            .run(&sh("printf 'progress \\377\\n' >&2; echo 'roll-tree 7' >&2; exit 0"))
            .unwrap();
        assert_eq!(tokens, vec!["roll-tree", "7"]);
    }

    #[test]
    fn test_invalid_utf8_before_failure_keeps_command() {
        let runner = CommandRunner::new(2);
        let err = runner
            .run(&sh("echo 'roll-tree 7' >&2; printf 'bad \\377 byte\\n' >&2; exit 3"))
            .unwrap_err();
        assert!(err.command().is_some());
        match err {
            Error::NonZeroExit {
                code, last_line, ..
            } => {
                assert_eq!(code, Some(3));
                assert!(last_line.starts_with("bad "));
                assert!(last_line.ends_with(" byte"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_line_strips_terminators() {
        assert_eq!(decode_line(b"roll-tree 7\r\n"), "roll-tree 7");
        assert_eq!(decode_line(b"no newline"), "no newline");
        assert_eq!(decode_line(b"a \xff b\n"), "a \u{fffd} b");
    }

    #[test]
    fn test_fast_child_beats_timeout() {
        let runner = CommandRunner::new(2).with_timeout(Some(Duration::from_secs(10)));
        let tokens = runner.run(&sh("echo 'roll-tree 7' >&2")).unwrap();
        assert_eq!(tokens[1], "7");
    }
}
