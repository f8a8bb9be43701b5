use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

use review_core::{AnalysisResult, Review};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Jsonl,
    Json,
    Csv,
}

impl FromStr for InputFormat {
    type Err = IngestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "jsonl" | "ndjson" => Ok(Self::Jsonl),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(IngestError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported input format `{0}` (expected jsonl, json or csv)")]
    UnsupportedFormat(String),
    #[error("failed accessing {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed json on line {line}: {source}")]
    JsonLine {
        line: usize,
        source: serde_json::Error,
    },
    #[error("malformed json document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("json input must be an array of review objects")]
    NotAnArray,
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Loads raw review records. Decoding into `Review` happens per item so one bad
/// record never fails the whole file.
pub fn read_records(path: impl AsRef<Path>, format: InputFormat) -> Result<Vec<Value>, IngestError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| io_error(path, source))?;
    let reader = BufReader::new(file);

    match format {
        InputFormat::Jsonl => parse_jsonl(reader),
        InputFormat::Json => parse_json(reader),
        InputFormat::Csv => parse_csv(reader),
    }
}

pub fn parse_jsonl<R: BufRead>(reader: R) -> Result<Vec<Value>, IngestError> {
    let mut records = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| IngestError::Io {
            path: "<jsonl stream>".to_string(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let value = serde_json::from_str(&line).map_err(|source| IngestError::JsonLine {
            line: idx + 1,
            source,
        })?;
        records.push(value);
    }

    Ok(records)
}

pub fn parse_json<R: Read>(reader: R) -> Result<Vec<Value>, IngestError> {
    match serde_json::from_reader(reader)? {
        Value::Array(items) => Ok(items),
        _ => Err(IngestError::NotAnArray),
    }
}

pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Value>, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in csv_reader.deserialize::<HashMap<String, String>>() {
        let row = row?;
        let mut object = Map::new();
        for (key, value) in row {
            // Review text is kept verbatim; every other column is trimmed.
            if key == "review_text" {
                object.insert(key, Value::String(value));
                continue;
            }
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let value = match key.as_str() {
                "rating" => value
                    .parse::<i64>()
                    .map(Value::from)
                    .unwrap_or_else(|_| Value::from(value)),
                _ => Value::from(value),
            };
            object.insert(key, value);
        }
        records.push(Value::Object(object));
    }

    Ok(records)
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    review_id: Option<&'a str>,
    hotel_id: &'a str,
    rating: i32,
    review_text: &'a str,
    publish_decision: &'static str,
    rejection_reasons: String,
    flags: String,
    tags: String,
    sentiment: &'static str,
    summary: &'a str,
    detected_signals: String,
    analyzed_at: String,
    model_name: &'a str,
    prompt_version: &'a str,
}

impl<'a> ExportRow<'a> {
    fn from_result(result: &'a AnalysisResult) -> Result<Self, serde_json::Error> {
        Ok(Self {
            review_id: result.review_id.as_deref(),
            hotel_id: &result.hotel_id,
            rating: result.rating,
            review_text: &result.review_text,
            publish_decision: result.publish_decision.as_code(),
            rejection_reasons: serde_json::to_string(&result.rejection_reasons)?,
            flags: serde_json::to_string(&result.flags)?,
            tags: serde_json::to_string(&result.tags)?,
            sentiment: result.sentiment.as_code(),
            summary: &result.summary,
            detected_signals: serde_json::to_string(&result.detected_signals)?,
            analyzed_at: result.analyzed_at.to_rfc3339(),
            model_name: &result.model_name,
            prompt_version: &result.prompt_version,
        })
    }
}

const EXPORT_HEADER: [&str; 14] = [
    "review_id",
    "hotel_id",
    "rating",
    "review_text",
    "publish_decision",
    "rejection_reasons",
    "flags",
    "tags",
    "sentiment",
    "summary",
    "detected_signals",
    "analyzed_at",
    "model_name",
    "prompt_version",
];

pub fn write_results_csv(path: impl AsRef<Path>, results: &[AnalysisResult]) -> Result<(), IngestError> {
    let file = create_file(path.as_ref())?;
    write_results_csv_to(BufWriter::new(file), results)
}

pub fn write_results_csv_to<W: Write>(writer: W, results: &[AnalysisResult]) -> Result<(), IngestError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(EXPORT_HEADER)?;
    for result in results {
        csv_writer.serialize(ExportRow::from_result(result)?)?;
    }
    csv_writer.flush().map_err(|source| IngestError::Io {
        path: "<csv export>".to_string(),
        source,
    })?;
    Ok(())
}

pub fn write_reviews_jsonl(path: impl AsRef<Path>, reviews: &[Review]) -> Result<(), IngestError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(create_file(path)?);
    for review in reviews {
        serde_json::to_writer(&mut writer, review)?;
        writer
            .write_all(b"\n")
            .map_err(|source| io_error(path, source))?;
    }
    writer.flush().map_err(|source| io_error(path, source))
}

const REVIEW_HEADER: [&str; 7] = [
    "review_id",
    "hotel_id",
    "rating",
    "review_text",
    "reviewer_name",
    "source",
    "created_at",
];

pub fn write_reviews_csv(path: impl AsRef<Path>, reviews: &[Review]) -> Result<(), IngestError> {
    let file = create_file(path.as_ref())?;
    write_reviews_csv_to(BufWriter::new(file), reviews)
}

/// Header is written up front so an empty corpus still yields a readable file.
pub fn write_reviews_csv_to<W: Write>(writer: W, reviews: &[Review]) -> Result<(), IngestError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(REVIEW_HEADER)?;
    for review in reviews {
        csv_writer.serialize(review)?;
    }
    csv_writer.flush().map_err(|source| IngestError::Io {
        path: "<csv export>".to_string(),
        source,
    })
}

fn create_file(path: &Path) -> Result<File, IngestError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
    }
    File::create(path).map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> IngestError {
    IngestError::Io {
        path: path.display().to_string(),
        source,
    }
}
