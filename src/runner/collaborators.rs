//! Row sources, result sinks and notifiers.
//!
//! These are the seams to the outside world: where test rows come from, where
//! per-row results go and who hears about failures. Bundled implementations
//! cover JSON files, JSON-lines result logs, the `log` facade and in-memory
//! capture for tests.

use super::case::Row;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Errors raised while reading rows.
#[derive(Debug)]
pub enum SourceError {
    IoError(io::Error),
    ParseError(serde_json::Error),
    InvalidFormat(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::IoError(e) => write!(f, "Failed to read test rows: {}", e),
            SourceError::ParseError(e) => write!(f, "Failed to parse test rows: {}", e),
            SourceError::InvalidFormat(msg) => write!(f, "Invalid test rows: {}", msg),
        }
    }
}

impl std::error::Error for SourceError {}

impl From<io::Error> for SourceError {
    fn from(err: io::Error) -> Self {
        SourceError::IoError(err)
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::ParseError(err)
    }
}

/// Supplies test-case rows.
pub trait RowSource: Send + Sync {
    fn rows(&self) -> Result<Vec<Row>, SourceError>;
}

/// Receives the final body and status label of each reported row.
pub trait ResultSink: Send + Sync {
    fn write_result(&self, row_id: i64, body: &str, status_label: &str) -> io::Result<()>;
}

/// Receives plain-text failure summaries.
pub trait Notifier: Send + Sync {
    fn notify(&self, summary: &str);
}

/// Rows from a JSON array of objects.
///
/// Scalar values are converted to text; `null` entries are dropped. Rows
/// without an explicit `rowIndex` are numbered from 1 in file order.
#[derive(Debug, Clone)]
pub struct JsonRowSource {
    value: Value,
}

impl JsonRowSource {
    pub fn from_value(value: Value) -> Self {
        Self { value }
    }

    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_value(serde_json::from_str(&content)?))
    }
}

impl RowSource for JsonRowSource {
    fn rows(&self) -> Result<Vec<Row>, SourceError> {
        let items = self.value.as_array().ok_or_else(|| {
            SourceError::InvalidFormat("expected a JSON array of row objects".to_string())
        })?;

        items
            .iter()
            .enumerate()
            .map(|(position, item)| {
                let object = item.as_object().ok_or_else(|| {
                    SourceError::InvalidFormat(format!("row {} is not an object", position + 1))
                })?;

                let mut row = Row::new();
                for (key, value) in object {
                    let text = match value {
                        Value::Null => continue,
                        Value::String(s) => s.clone(),
                        Value::Number(n) => n.to_string(),
                        Value::Bool(b) => b.to_string(),
                        Value::Array(_) | Value::Object(_) => value.to_string(),
                    };
                    row.insert(key.clone(), text);
                }
                row.entry("rowIndex".to_string())
                    .or_insert_with(|| (position + 1).to_string());
                Ok(row)
            })
            .collect()
    }
}

/// One captured result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub row_id: i64,
    pub body: String,
    pub status_label: String,
}

/// Keeps results in memory.
#[derive(Debug, Default)]
pub struct MemoryResultSink {
    records: Mutex<Vec<ResultRecord>>,
}

impl MemoryResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ResultRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl ResultSink for MemoryResultSink {
    fn write_result(&self, row_id: i64, body: &str, status_label: &str) -> io::Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "result sink poisoned"))?;
        records.push(ResultRecord {
            row_id,
            body: body.to_string(),
            status_label: status_label.to_string(),
        });
        Ok(())
    }
}

/// Appends one JSON object per result to a file, stamped with the write time.
#[derive(Debug)]
pub struct JsonLinesResultSink {
    path: PathBuf,
    file: Mutex<File>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TimestampedRecord<'a> {
    row_id: i64,
    status_label: &'a str,
    body: &'a str,
    written_at: String,
}

impl JsonLinesResultSink {
    /// Opens `path` for appending, creating it if needed.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for JsonLinesResultSink {
    fn write_result(&self, row_id: i64, body: &str, status_label: &str) -> io::Result<()> {
        let record = TimestampedRecord {
            row_id,
            status_label,
            body,
            written_at: Utc::now().to_rfc3339(),
        };
        let line = serde_json::to_string(&record)?;

        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "result file poisoned"))?;
        writeln!(file, "{}", line)?;
        file.flush()
    }
}

/// Writes summaries to the log at `warn` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, summary: &str) {
        log::warn!("[notify] {}", summary);
    }
}

/// Keeps summaries in memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    messages: Mutex<Vec<String>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, summary: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(summary.to_string());
        }
    }
}
