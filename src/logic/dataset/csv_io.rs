//! CSV Input / Output
//!
//! Batches come in with French column names (`zone`, `tension`, `courant`,
//! optional `puissance` / `timestamp`). The declared schema is taken from
//! the header, so a file without a `tension` column is reported as such
//! by validation instead of looking like an all-missing column.

use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

use super::record::LabeledReading;
use crate::logic::alert::Alert;
use crate::logic::fault::FaultType;
use crate::logic::pipeline::ScoredReading;
use crate::logic::telemetry::{Column, RawBatch, RawReading, Reading};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const LABEL_COLUMNS: [&str; 2] = ["type_panne", "panne_predite"];

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Invalid value '{value}' in column {column} at row {row}")]
    InvalidValue { column: String, row: usize, value: String },
}

// ============================================================================
// PARSING
// ============================================================================

fn parse_number(field: &str, column: Column, row: usize) -> Result<Option<f64>, DatasetError> {
    let field = field.trim();
    if field.is_empty() {
        return Ok(None);
    }
    match field.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        // NaN / inf are missing values
        Ok(_) => Ok(None),
        Err(_) => Err(DatasetError::InvalidValue {
            column: column.name().to_string(),
            row,
            value: field.to_string(),
        }),
    }
}

fn parse_timestamp(field: &str, row: usize) -> Result<Option<DateTime<Utc>>, DatasetError> {
    let field = field.trim();
    if field.is_empty() {
        return Ok(None);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(field) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(field, TIMESTAMP_FORMAT)
        .map(|naive| Some(naive.and_utc()))
        .map_err(|_| DatasetError::InvalidValue {
            column: Column::Timestamp.name().to_string(),
            row,
            value: field.to_string(),
        })
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Read a raw batch; the declared columns are the recognized headers
pub fn read_raw_batch<R: Read>(reader: R) -> Result<RawBatch, DatasetError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let positions: Vec<(usize, Column)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| Column::from_name(h).map(|c| (i, c)))
        .collect();

    let mut readings = Vec::new();
    for (row, result) in csv_reader.records().enumerate() {
        let record = result?;
        let mut reading = RawReading::default();

        for &(i, column) in &positions {
            let field = record.get(i).unwrap_or("");
            match column {
                Column::Zone => {
                    let zone = field.trim();
                    reading.zone = (!zone.is_empty()).then(|| zone.to_string());
                }
                Column::Voltage => reading.voltage = parse_number(field, column, row)?,
                Column::Current => reading.current = parse_number(field, column, row)?,
                Column::Power => reading.power = parse_number(field, column, row)?,
                Column::Timestamp => reading.timestamp = parse_timestamp(field, row)?,
            }
        }
        readings.push(reading);
    }

    log::debug!(
        "Read {} raw readings, columns {:?}",
        readings.len(),
        positions.iter().map(|(_, c)| c.name()).collect::<Vec<_>>()
    );
    Ok(RawBatch::with_columns(positions.into_iter().map(|(_, c)| c), readings))
}

/// Load a raw batch from a CSV file
pub fn load_raw_batch(path: &Path) -> Result<RawBatch, DatasetError> {
    let file = File::open(path)?;
    read_raw_batch(BufReader::new(file))
}

/// Read a labeled training set (`type_panne` column, French or English labels)
///
/// Rows missing voltage or current are skipped; a missing timestamp
/// becomes `now`.
pub fn read_labeled<R: Read>(reader: R, now: DateTime<Utc>) -> Result<Vec<LabeledReading>, DatasetError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let find = |name: &str| headers.iter().position(|h| h.trim() == name);
    let column = |c: Column| find(c.name()).ok_or_else(|| DatasetError::MissingColumn(c.name().to_string()));

    let zone_idx = column(Column::Zone)?;
    let voltage_idx = column(Column::Voltage)?;
    let current_idx = column(Column::Current)?;
    let timestamp_idx = find(Column::Timestamp.name());
    let label_idx = LABEL_COLUMNS
        .iter()
        .find_map(|name| find(name))
        .ok_or_else(|| DatasetError::MissingColumn(LABEL_COLUMNS[0].to_string()))?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (row, result) in csv_reader.records().enumerate() {
        let record = result?;
        let get = |i: usize| record.get(i).unwrap_or("");

        let voltage = parse_number(get(voltage_idx), Column::Voltage, row)?;
        let current = parse_number(get(current_idx), Column::Current, row)?;
        let (Some(voltage), Some(current)) = (voltage, current) else {
            skipped += 1;
            continue;
        };

        let label = get(label_idx);
        let fault: FaultType = label.parse().map_err(|_| DatasetError::InvalidValue {
            column: headers.get(label_idx).unwrap_or("type_panne").to_string(),
            row,
            value: label.to_string(),
        })?;

        let timestamp = match timestamp_idx {
            Some(i) => parse_timestamp(get(i), row)?.unwrap_or(now),
            None => now,
        };

        rows.push(LabeledReading::new(
            Reading::new(get(zone_idx).trim(), voltage, current, timestamp),
            fault,
        ));
    }

    if skipped > 0 {
        log::debug!("Labeled set: skipped {} incomplete rows", skipped);
    }
    Ok(rows)
}

/// Load a labeled training set from a CSV file
pub fn load_labeled(path: &Path) -> Result<Vec<LabeledReading>, DatasetError> {
    let file = File::open(path)?;
    read_labeled(BufReader::new(file), Utc::now())
}

// ============================================================================
// WRITING
// ============================================================================

fn fmt2(value: f64) -> String {
    format!("{:.2}", value)
}

/// Write a labeled set in the field export layout
pub fn write_labeled<W: Write>(writer: W, rows: &[LabeledReading]) -> Result<(), DatasetError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["timestamp", "zone", "tension", "courant", "puissance", "panne", "type_panne"])?;

    for row in rows {
        let r = &row.reading;
        csv_writer.write_record([
            format_timestamp(&r.timestamp),
            r.zone.clone(),
            fmt2(r.voltage),
            fmt2(r.current),
            fmt2(r.power),
            u8::from(row.is_fault()).to_string(),
            row.fault.label_fr().to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the annotated batch: input columns plus both stage outputs
pub fn write_scored<W: Write>(writer: W, scored: &[ScoredReading]) -> Result<(), DatasetError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "timestamp",
        "zone",
        "tension",
        "courant",
        "puissance",
        "anomalie_score",
        "anomalie",
        "panne_predite",
        "confiance",
        "confiance_type",
    ])?;

    for s in scored {
        let r = &s.reading;
        let confidence = s.classification.confidence;
        csv_writer.write_record([
            format_timestamp(&r.timestamp),
            r.zone.clone(),
            fmt2(r.voltage),
            fmt2(r.current),
            format!("{:.4}", r.power),
            format!("{:.4}", s.anomaly_score()),
            u8::from(s.is_anomaly()).to_string(),
            s.fault_type().label_fr().to_string(),
            confidence.map(|c| format!("{:.3}", c.value())).unwrap_or_default(),
            confidence.map(|c| c.kind().to_string()).unwrap_or_default(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the alerts view, already in triage order
pub fn write_alerts<W: Write>(writer: W, alerts: &[Alert]) -> Result<(), DatasetError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["timestamp", "zone", "panne_predite", "criticite"])?;

    for alert in alerts {
        csv_writer.write_record([
            format_timestamp(&alert.timestamp),
            alert.zone.clone(),
            alert.fault_type.label_fr().to_string(),
            alert.criticality.label_fr().to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// `dir/prefix_YYYYmmdd_HHMMSS.csv`
pub fn timestamped_path(dir: &Path, prefix: &str, now: DateTime<Utc>) -> PathBuf {
    dir.join(format!("{}_{}.csv", prefix, now.format("%Y%m%d_%H%M%S")))
}

/// Create the parent directory and open `path` for writing
pub fn create_file(path: &Path) -> Result<File, DatasetError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(File::create(path)?)
}
