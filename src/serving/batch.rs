//! Batch input readers and output writers.

use super::api::ScoreResponse;
use crate::schema::RawRecord;
use serde_json::Value;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatchIoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("batch input must be a JSON array of customer records")]
    NotAnArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    /// A single JSON array.
    Json,
    /// One JSON object per line.
    Ndjson,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => InputFormat::Csv,
            Some("ndjson") | Some("jsonl") => InputFormat::Ndjson,
            _ => InputFormat::Json,
        }
    }
}

pub fn read_records<R: Read>(reader: R, format: InputFormat) -> Result<Vec<RawRecord>, BatchIoError> {
    match format {
        InputFormat::Csv => read_csv(reader),
        InputFormat::Json => read_json(reader),
        InputFormat::Ndjson => read_ndjson(reader),
    }
}

/// CSV with a header row. Column names may use any accepted field alias.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawRecord>, BatchIoError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut records = Vec::new();
    for row in rdr.records() {
        records.push(RawRecord::from_csv_row(&headers, &row?));
    }
    Ok(records)
}

pub fn read_json<R: Read>(reader: R) -> Result<Vec<RawRecord>, BatchIoError> {
    let value: Value = serde_json::from_reader(reader)?;
    match value {
        Value::Array(items) => Ok(items.into_iter().map(RawRecord).collect()),
        _ => Err(BatchIoError::NotAnArray),
    }
}

/// Blank lines are skipped; every other line is one record.
pub fn read_ndjson<R: Read>(mut reader: R) -> Result<Vec<RawRecord>, BatchIoError> {
    let mut data = String::new();
    reader.read_to_string(&mut data)?;
    data.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| -> Result<RawRecord, BatchIoError> { Ok(RawRecord(serde_json::from_str(l)?)) })
        .collect()
}

pub fn write_json<W: Write>(writer: W, responses: &[ScoreResponse]) -> Result<(), BatchIoError> {
    serde_json::to_writer_pretty(writer, responses)?;
    Ok(())
}

pub fn write_ndjson<W: Write>(mut writer: W, responses: &[ScoreResponse]) -> Result<(), BatchIoError> {
    for r in responses {
        serde_json::to_writer(&mut writer, r)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
