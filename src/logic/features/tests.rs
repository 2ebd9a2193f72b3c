//! Integration tests for validation + preprocessing
//!
//! Properties the models rely on, checked over the whole cleaning chain.

use chrono::{TimeZone, Utc};

use crate::logic::dataset::generator::generate;
use crate::logic::features::preprocess;
use crate::logic::telemetry::{Batch, RawBatch, RawReading};
use crate::logic::validation::validate_at;

fn clean(raw: &RawBatch) -> Batch {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    preprocess(&validate_at(raw, now).unwrap())
}

fn simulated_batch() -> RawBatch {
    let readings = generate(400, 7)
        .into_iter()
        .map(|l| RawReading::from(l.reading))
        .collect();
    RawBatch::new(readings)
}

/// Power invariant holds on every retained row
#[test]
fn test_power_invariant_after_cleaning() {
    let batch = clean(&simulated_batch());
    assert!(!batch.is_empty());
    assert!(batch.iter().all(|r| r.is_power_consistent()));
}

/// No retained reading is outside the physical ranges
#[test]
fn test_range_enforcement() {
    let raw = simulated_batch();
    let batch = clean(&raw);
    assert!(batch.iter().all(|r| r.is_in_range()));
    // simulated faults pull voltage under 180 V, some rows must go
    assert!(batch.len() < raw.len());
}

/// Cleaning already-clean data changes nothing
#[test]
fn test_idempotence() {
    let once = clean(&simulated_batch());
    let twice = clean(&RawBatch::from(&once));
    assert_eq!(once, twice);
}

/// Reference example: 230 V / 10 A gives 2.3 kW, 170 V is dropped
#[test]
fn test_reference_example() {
    let raw = RawBatch::new(vec![
        RawReading::new("Nord", 230.0, 10.0),
        RawReading::new("Sud", 170.0, 15.0),
    ]);
    let batch = clean(&raw);
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.readings()[0].zone, "Nord");
    assert!((batch.readings()[0].power - 2.3).abs() < 1e-12);
}
