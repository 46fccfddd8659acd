//! Append-only series files
//!
//! Each series is a plain-text file of `x\ty` lines consumed by the plotting
//! scripts. Files are opened, appended, flushed and closed per point; no handle
//! outlives a call, and existing content is never truncated.
//!
//! Appends to *different* series never interfere. Appends to the same series
//! must be serialized by the caller.

use crate::{Error, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Decimal places written for the dependent value
pub const VALUE_PRECISION: usize = 7;

/// Writes `(x, y)` pairs to named series files under one directory.
#[derive(Debug, Clone)]
pub struct SeriesWriter {
    dir: PathBuf,
}

impl SeriesWriter {
    /// Writer rooted at `dir`. The directory is created on first append.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory that holds the series files
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing the series `name`
    #[must_use]
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Render one series line (without the newline)
    #[must_use]
    pub fn format_line(x: &str, y: f64) -> String {
        format!("{x}\t{}", Self::format_value(y))
    }

    /// Render a dependent value at the fixed precision
    #[must_use]
    pub fn format_value(y: f64) -> String {
        format!("{y:.prec$}", prec = VALUE_PRECISION)
    }

    /// Append `x\ty` to the series `name`, creating the file if needed.
    ///
    /// # Errors
    ///
    /// Returns `SeriesWrite` if the file cannot be opened or written
    pub fn append(&self, name: &str, x: &str, y: f64) -> Result<()> {
        let path = self.path(name);
        let value = Self::format_value(y);
        let line = format!("{x}\t{value}");

        let write = || -> std::io::Result<()> {
            std::fs::create_dir_all(&self.dir)?;
            let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
            writeln!(file, "{line}")?;
            file.flush()
        };
        write().map_err(|source| Error::SeriesWrite {
            path: path.clone(),
            source,
        })?;

        tracing::info!("\t +Persisted: ({x},{value}) ==> {}", path.display());
        Ok(())
    }

    /// Read a series back as `(x, y)` pairs in file order.
    ///
    /// A missing file is an empty series. Lines that are not `x\ty` with a
    /// numeric `y` are skipped.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file exists but cannot be read
    pub fn read(&self, name: &str) -> Result<Vec<(String, f64)>> {
        let path = self.path(name);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(raw
            .lines()
            .filter_map(|line| {
                let (x, y) = line.split_once('\t')?;
                Some((x.to_string(), y.trim().parse().ok()?))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_fixed_precision() {
        assert_eq!(SeriesWriter::format_line("1000", 6.0), "1000\t6.0000000");
        assert_eq!(SeriesWriter::format_line("10", 0.5), "10\t0.5000000");
        assert_eq!(SeriesWriter::format_line("10", 1.0 / 3.0), "10\t0.3333333");
    }

    #[test]
    fn test_append_never_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SeriesWriter::new(dir.path());
        std::fs::write(writer.path("s.txt"), "1\t1.0000000\n").unwrap();

        writer.append("s.txt", "10", 2.0).unwrap();
        writer.append("s.txt", "100", 3.0).unwrap();

        let content = std::fs::read_to_string(writer.path("s.txt")).unwrap();
        assert_eq!(content, "1\t1.0000000\n10\t2.0000000\n100\t3.0000000\n");
    }

    #[test]
    fn test_read_missing_series_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SeriesWriter::new(dir.path());
        assert!(writer.read("absent.txt").unwrap().is_empty());
    }

    #[test]
    fn test_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SeriesWriter::new(dir.path().join("nested/out"));
        writer.append("s.txt", "1", 1.0).unwrap();
        assert_eq!(writer.read("s.txt").unwrap(), vec![("1".to_string(), 1.0)]);
    }

    #[test]
    fn test_unwritable_target_is_series_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SeriesWriter::new(dir.path());
        std::fs::create_dir(writer.path("taken")).unwrap();
        let err = writer.append("taken", "1", 1.0).unwrap_err();
        assert!(matches!(err, Error::SeriesWrite { .. }));
    }
}
