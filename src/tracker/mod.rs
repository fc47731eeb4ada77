//! Append-only cost log backed by a JSON Lines file
//!
//! Every successful enhancement produces one [`LogRecord`]. Records are only
//! ever appended; the file is read back in full to compute statistics and is
//! emptied only by an explicit [`CostLog::clear`].
//!
//! # Example
//!
//! ```no_run
//! use prompt_enhancer::tracker::{compute_stats, CostLog};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let log = CostLog::new("/tmp/enhancement-log.jsonl");
//! let stats = compute_stats(&log.load_all()?);
//! println!("{} enhancements, ${} total", stats.total_enhancements, stats.total_cost);
//! # Ok(())
//! # }
//! ```

mod stats;

pub use stats::{compute_stats, Statistics, TechniqueCount};

use crate::enhance::EnhancementResult;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Failed to write cost log {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A line of the log is not a valid record; `line` is 1-based
    #[error("Cost log is corrupt at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },

    #[error("Failed to read cost log {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One line of the cost log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    /// ISO-8601 UTC timestamp
    pub timestamp: String,
    pub original: String,
    #[serde(default)]
    pub confidence: u8,
    #[serde(default)]
    pub techniques: Vec<String>,
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    /// Total cost in USD
    #[serde(default)]
    pub cost: f64,
}

impl LogRecord {
    /// Builds the record for a finished enhancement, stamped with the current time
    ///
    /// Clarification answers have no confidence or techniques and are logged
    /// with `0` and `[]`.
    pub fn from_result(result: &EnhancementResult) -> Self {
        let (confidence, techniques) = result
            .enhanced()
            .map(|enhanced| (enhanced.confidence, enhanced.techniques.clone()))
            .unwrap_or_default();

        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            original: result.original.clone(),
            confidence,
            techniques,
            input_tokens: result.usage.input_tokens,
            output_tokens: result.usage.output_tokens,
            cost: result.usage.cost.total.as_dollars(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostLog {
    path: PathBuf,
}

impl CostLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record as a single newline-terminated write
    ///
    /// Creates the file and its parent directory when absent.
    pub fn try_append(&self, record: &LogRecord) -> Result<(), TrackerError> {
        let write_failed = |source: io::Error| TrackerError::WriteFailed {
            path: self.path.clone(),
            source,
        };

        let mut line = serde_json::to_string(record).map_err(|e| write_failed(e.into()))?;
        line.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_failed)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_failed)?;
        file.write_all(line.as_bytes()).map_err(write_failed)?;

        debug!("Appended cost record to {}", self.path.display());
        Ok(())
    }

    /// Appends a record, reporting a failure as a warning only
    pub fn append(&self, record: &LogRecord) {
        if let Err(e) = self.try_append(record) {
            warn!("Failed to log enhancement: {}", e);
        }
    }

    /// Reads every record in file order
    ///
    /// A missing file is an empty log. Blank lines are skipped; any other line
    /// that does not parse fails the whole load.
    pub fn load_all(&self) -> Result<Vec<LogRecord>, TrackerError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(TrackerError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str(line).map_err(|e| TrackerError::Corrupt {
                    line: index + 1,
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    /// Truncates the log; a missing file is left missing
    pub fn clear(&self) -> Result<(), TrackerError> {
        if !self.path.exists() {
            return Ok(());
        }
        fs::write(&self.path, "").map_err(|source| TrackerError::WriteFailed {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(original: &str, cost: f64) -> LogRecord {
        LogRecord {
            timestamp: "2025-01-01T00:00:00.000Z".to_string(),
            original: original.to_string(),
            confidence: 7,
            techniques: vec!["role-assignment".to_string()],
            input_tokens: 10,
            output_tokens: 20,
            cost,
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let log = CostLog::new(dir.path().join("missing.jsonl"));
        assert!(log.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_append_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("log.jsonl");
        let log = CostLog::new(&path);

        log.try_append(&record("first", 0.001)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.ends_with('\n'));
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_record_uses_camel_case_keys() {
        let line = serde_json::to_value(record("x", 0.00105)).unwrap();
        assert_eq!(line["inputTokens"], 10);
        assert_eq!(line["outputTokens"], 20);
        assert_eq!(line["cost"], 0.00105);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let parsed: LogRecord =
            serde_json::from_str(r#"{"timestamp":"t","original":"o"}"#).unwrap();
        assert_eq!(parsed.confidence, 0);
        assert!(parsed.techniques.is_empty());
        assert_eq!(parsed.cost, 0.0);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.jsonl");
        let line = serde_json::to_string(&record("a", 0.0)).unwrap();
        fs::write(&path, format!("\n{}\n   \n{}\n", line, line)).unwrap();

        assert_eq!(CostLog::new(&path).load_all().unwrap().len(), 2);
    }

    #[test]
    fn test_corrupt_line_fails_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.jsonl");
        let line = serde_json::to_string(&record("a", 0.0)).unwrap();
        fs::write(&path, format!("{}\n{{oops\n", line)).unwrap();

        match CostLog::new(&path).load_all() {
            Err(TrackerError::Corrupt { line, .. }) => assert_eq!(line, 2),
            other => panic!("Expected Corrupt, got {:?}", other),
        }
    }

    #[test]
    fn test_clear_missing_file_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("never.jsonl");
        CostLog::new(&path).clear().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_append_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be opened for appending
        let log = CostLog::new(dir.path());

        assert!(matches!(
            log.try_append(&record("x", 0.0)),
            Err(TrackerError::WriteFailed { .. })
        ));
        log.append(&record("x", 0.0));
    }
}
