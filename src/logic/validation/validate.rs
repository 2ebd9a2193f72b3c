//! Batch Validation
//!
//! Range checks and derived-field completion. Out-of-range values become
//! missing (never clamped), power is recomputed, absent timestamps are
//! synthesized, and rows still missing voltage or current are dropped.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::logic::telemetry::{
    compute_power, current_in_range, voltage_in_range, Column, RawBatch, RawReading,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Empty batch")]
    EmptyBatch,

    #[error("Missing mandatory column: {0}")]
    MissingColumn(Column),
}

/// Validate a raw batch using the current time for absent timestamps
pub fn validate(raw: &RawBatch) -> Result<RawBatch, ValidationError> {
    validate_at(raw, Utc::now())
}

/// Validate a raw batch, `now` stands in for absent timestamps
///
/// Synthesized timestamps lose the true acquisition order.
pub fn validate_at(raw: &RawBatch, now: DateTime<Utc>) -> Result<RawBatch, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::EmptyBatch);
    }

    for column in Column::MANDATORY {
        if !raw.has_column(column) {
            return Err(ValidationError::MissingColumn(column));
        }
    }

    let mut out_of_range = 0usize;
    let mut synthesized = 0usize;

    let readings: Vec<RawReading> = raw
        .iter()
        .filter_map(|reading| {
            let mut cleaned = reading.clone();

            if let Some(v) = cleaned.voltage {
                if !voltage_in_range(v) {
                    cleaned.voltage = None;
                    out_of_range += 1;
                }
            }
            if let Some(c) = cleaned.current {
                if !current_in_range(c) {
                    cleaned.current = None;
                    out_of_range += 1;
                }
            }

            cleaned.power = match (cleaned.voltage, cleaned.current) {
                (Some(v), Some(c)) => Some(compute_power(v, c)),
                _ => None,
            };

            if cleaned.timestamp.is_none() {
                cleaned.timestamp = Some(now);
                synthesized += 1;
            }

            if cleaned.voltage.is_some() && cleaned.current.is_some() {
                Some(cleaned)
            } else {
                None
            }
        })
        .collect();

    let dropped = raw.len() - readings.len();
    if out_of_range > 0 || dropped > 0 {
        log::debug!(
            "Validation: {} out-of-range values, {} rows dropped ({} kept)",
            out_of_range,
            dropped,
            readings.len()
        );
    }
    if synthesized > 0 {
        log::debug!("Validation: synthesized {} timestamps", synthesized);
    }

    let mut validated = RawBatch::with_columns(raw.columns().iter().copied(), readings);
    validated.declare(Column::Power);
    validated.declare(Column::Timestamp);
    Ok(validated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_batch_rejected() {
        let result = validate(&RawBatch::new(vec![]));
        assert_eq!(result, Err(ValidationError::EmptyBatch));
    }

    #[test]
    fn test_missing_mandatory_column() {
        let batch = RawBatch::with_columns(
            [Column::Zone, Column::Voltage],
            vec![RawReading::new("Nord", 230.0, 10.0)],
        );
        assert_eq!(validate(&batch), Err(ValidationError::MissingColumn(Column::Current)));
    }

    #[test]
    fn test_power_recomputed_and_timestamp_synthesized() {
        let batch = RawBatch::new(vec![RawReading::new("Nord", 230.0, 10.0).with_power(99.0)]);
        let validated = validate_at(&batch, fixed_now()).unwrap();
        let r = &validated.readings()[0];
        assert!((r.power.unwrap() - 2.3).abs() < 1e-12);
        assert_eq!(r.timestamp, Some(fixed_now()));
        assert!(validated.has_column(Column::Power));
        assert!(validated.has_column(Column::Timestamp));
    }

    #[test]
    fn test_out_of_range_row_dropped() {
        let batch = RawBatch::new(vec![
            RawReading::new("Nord", 170.0, 15.0),
            RawReading::new("Sud", 230.0, 31.0),
            RawReading::new("Est", 230.0, 10.0),
        ]);
        let validated = validate(&batch).unwrap();
        assert_eq!(validated.len(), 1);
        assert_eq!(validated.readings()[0].zone.as_deref(), Some("Est"));
    }

    #[test]
    fn test_missing_zone_is_kept() {
        let mut raw = RawReading::new("Nord", 230.0, 10.0);
        raw.zone = None;
        let validated = validate(&RawBatch::new(vec![raw])).unwrap();
        assert_eq!(validated.len(), 1);
        assert!(validated.readings()[0].zone.is_none());
    }

    #[test]
    fn test_existing_timestamp_preserved() {
        let ts = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let batch = RawBatch::new(vec![RawReading::new("Nord", 230.0, 10.0).with_timestamp(ts)]);
        let validated = validate_at(&batch, fixed_now()).unwrap();
        assert_eq!(validated.readings()[0].timestamp, Some(ts));
    }
}
