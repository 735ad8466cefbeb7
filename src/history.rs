//! The persistent command history.
//!
//! Each record is one line: `[YYYY-MM-DD HH:MM:SS] [<cwd>] <raw line>`.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. The file is opened and closed for every call.
    pub fn append(&self, at: DateTime<Local>, cwd: &Path, line: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("history: can't open {}", self.path.display()))?;
        writeln!(file, "{}", format_record(at, cwd, line))
            .with_context(|| format!("history: can't write {}", self.path.display()))?;
        Ok(())
    }

    /// All records in append order, or `None` when no history file exists yet.
    pub fn read_all(&self) -> Result<Option<Vec<String>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(
                String::from_utf8_lossy(&bytes)
                    .lines()
                    .map(str::to_owned)
                    .collect(),
            )),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("history: can't read {}", self.path.display()))
            }
        }
    }

    /// Delete the history file.
    pub fn clear(&self) -> Result<()> {
        fs::remove_file(&self.path)
            .with_context(|| format!("Error clearing history {}", self.path.display()))
    }
}

pub fn format_record(at: DateTime<Local>, cwd: &Path, line: &str) -> String {
    format!("[{}] [{}] {}", at.format(TIMESTAMP_FORMAT), cwd.display(), line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 10, h, m, s).unwrap()
    }

    #[test]
    fn record_format() {
        let record = format_record(at(14, 30, 0), Path::new("/home/ada"), "ls -la");
        assert_eq!(record, "[2025-01-10 14:30:00] [/home/ada] ls -la");
    }

    #[test]
    fn appended_lines_come_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.txt"));

        log.append(at(9, 0, 0), Path::new("/a"), "first command").unwrap();
        log.append(at(9, 0, 1), Path::new("/b"), "second command").unwrap();

        let records = log.read_all().unwrap().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records
                .iter()
                .filter(|r| r.contains("first command"))
                .count(),
            1
        );
        assert!(records[0].ends_with("] first command"));
        assert!(records[1].ends_with("[/b] second command"));
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("nothing-here"));
        assert!(log.read_all().unwrap().is_none());
    }

    #[test]
    fn clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.txt"));
        log.append(at(1, 2, 3), Path::new("/"), "pwd").unwrap();
        log.clear().unwrap();
        assert!(!log.path().exists());
        assert!(log.clear().is_err());
    }

    #[test]
    fn unwritable_location_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("missing-dir").join("history.txt"));
        assert!(log.append(at(1, 2, 3), Path::new("/"), "pwd").is_err());
    }
}
