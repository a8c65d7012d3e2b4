//! Report sinks persisting [`OutputRecord`]s.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::models::OutputRecord;

pub const HEADER: [&str; 5] = ["distance_m", "timestamp", "ele", "hr", "pace_min_per_km"];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

/// Destination for report rows, written in emission order.
pub trait ReportSink {
    fn write_record(&mut self, record: &OutputRecord) -> Result<(), ReportError>;

    /// Flushes buffered output. Must be called once after the last record.
    fn finish(&mut self) -> Result<(), ReportError>;
}

/// A record with the report's fixed precision applied.
#[derive(Debug, Serialize)]
struct ReportRow {
    distance_m: f64,
    timestamp: String,
    ele: f64,
    hr: u32,
    pace_min_per_km: f64,
}

impl ReportRow {
    fn from_record(record: &OutputRecord) -> Result<Self, ReportError> {
        Ok(Self {
            distance_m: round_to(record.distance_m, 1),
            timestamp: format_timestamp(record.timestamp)?,
            ele: round_to(record.elevation, 1),
            hr: record.heart_rate,
            pace_min_per_km: round_to(record.pace_min_per_km, 2),
        })
    }
}

/// RFC 3339 at whole-second precision, keeping the record's offset.
fn format_timestamp(timestamp: OffsetDateTime) -> Result<String, ReportError> {
    let whole_seconds = timestamp.replace_nanosecond(0).unwrap_or(timestamp);
    Ok(whole_seconds.format(&Rfc3339)?)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Comma-separated output with a header row.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(inner: W) -> Result<Self, ReportError> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(HEADER)?;
        Ok(Self { writer })
    }

    pub fn into_inner(self) -> Result<W, ReportError> {
        self.writer
            .into_inner()
            .map_err(|e| ReportError::Io(e.into_error()))
    }
}

impl<W: Write> ReportSink for CsvSink<W> {
    fn write_record(&mut self, record: &OutputRecord) -> Result<(), ReportError> {
        self.writer.write_record([
            format!("{:.1}", record.distance_m),
            format_timestamp(record.timestamp)?,
            format!("{:.1}", record.elevation),
            record.heart_rate.to_string(),
            format!("{:.2}", record.pace_min_per_km),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ReportError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// A single JSON array of row objects, written on [`ReportSink::finish`].
pub struct JsonSink<W: Write> {
    writer: W,
    rows: Vec<ReportRow>,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            rows: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn write_record(&mut self, record: &OutputRecord) -> Result<(), ReportError> {
        self.rows.push(ReportRow::from_record(record)?);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ReportError> {
        serde_json::to_writer_pretty(&mut self.writer, &self.rows)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Opens a sink writing to `path`, or to stdout when `path` is `-`.
pub fn create_sink(
    path: &Path,
    format: OutputFormat,
) -> Result<Box<dyn ReportSink>, ReportError> {
    let writer: Box<dyn Write> = if path == Path::new("-") {
        Box::new(io::stdout().lock())
    } else {
        let file = File::create(path).map_err(|source| ReportError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        Box::new(BufWriter::new(file))
    };

    Ok(match format {
        OutputFormat::Csv => Box::new(CsvSink::new(writer)?),
        OutputFormat::Json => Box::new(JsonSink::new(writer)),
    })
}
