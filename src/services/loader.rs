// src/services/loader.rs
//! Log loader: one JSON object per line, file order preserved.
//!
//! Lines that are blank, not JSON, or JSON but not an object are dropped and
//! only counted. No partial-record recovery.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One parsed log line. `line` is 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub line: usize,
    pub fields: Map<String, Value>,
}

impl EventRecord {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}

#[derive(Debug, Default)]
pub struct LoadedLog {
    pub records: Vec<EventRecord>,
    pub skipped: usize,
}

pub fn load_events(path: &Path) -> Result<LoadedLog> {
    let file = File::open(path).with_context(|| format!("open log file {}", path.display()))?;
    read_events(BufReader::new(file)).with_context(|| format!("read log file {}", path.display()))
}

pub fn read_events<R: BufRead>(reader: R) -> Result<LoadedLog> {
    let mut out = LoadedLog::default();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        match serde_json::from_str::<Value>(&line) {
            Ok(Value::Object(fields)) => out.records.push(EventRecord { line: line_no, fields }),
            Ok(_) => {
                tracing::debug!(line = line_no, "skipping non-object log line");
                out.skipped += 1;
            }
            Err(e) => {
                tracing::debug!(line = line_no, error = %e, "skipping malformed log line");
                out.skipped += 1;
            }
        }
    }
    tracing::debug!(
        records = out.records.len(),
        skipped = out.skipped,
        "log loaded"
    );
    Ok(out)
}
