// src/services/posts.rs
//! Post filter + enrichment.
//!
//! Keeps only post-generating records and derives `word_count` and
//! `sentiment`. Once a record is classified as a post its timestamp must
//! parse; a bad one aborts the run (malformed *lines* are forgiven earlier,
//! in the loader).

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;
use thiserror::Error;

use crate::config::LogFormatConfig;
use crate::services::loader::EventRecord;
use crate::services::sentiment::SentimentScorer;

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S,%3f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("post event on line {line} has an unparseable timestamp: {value:?}")]
    BadTimestamp { line: usize, value: String },
    #[error("post event on line {line} is missing string field `{field}`")]
    MissingField { line: usize, field: String },
}

#[derive(Debug, Clone)]
pub struct EnrichedPost {
    pub timestamp: NaiveDateTime,
    pub bot_name: String,
    pub content: String,
    pub model: Option<String>,
    pub word_count: usize,
    pub sentiment: f64,
    pub record: EventRecord,
}

/// Whitespace-token count; empty or blank content is 0.
pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.naive_utc())
}

pub fn is_post(record: &EventRecord, fields: &LogFormatConfig) -> bool {
    record.get_str(&fields.event_field) == Some(fields.post_event.as_str())
}

/// Filter post events and enrich them, preserving arrival order.
pub fn enrich_posts(
    records: &[EventRecord],
    fields: &LogFormatConfig,
    scorer: &dyn SentimentScorer,
) -> Result<Vec<EnrichedPost>, EnrichError> {
    records
        .iter()
        .filter(|r| is_post(r, fields))
        .map(|r| enrich_one(r, fields, scorer))
        .collect()
}

fn enrich_one(
    record: &EventRecord,
    fields: &LogFormatConfig,
    scorer: &dyn SentimentScorer,
) -> Result<EnrichedPost, EnrichError> {
    let raw_ts = record.get(&fields.timestamp_field);
    let timestamp = raw_ts
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
        .ok_or_else(|| EnrichError::BadTimestamp {
            line: record.line,
            value: raw_ts.map(|v| v.to_string()).unwrap_or_else(|| "<missing>".into()),
        })?;

    let bot_name = record
        .get_str(&fields.bot_field)
        .ok_or_else(|| EnrichError::MissingField {
            line: record.line,
            field: fields.bot_field.clone(),
        })?
        .to_string();

    let content = match record.get(&fields.content_field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    Ok(EnrichedPost {
        timestamp,
        word_count: word_count(&content),
        sentiment: scorer.polarity(&content).clamp(-1.0, 1.0),
        model: record.get_str(&fields.model_field).map(str::to_string),
        bot_name,
        content,
        record: record.clone(),
    })
}
