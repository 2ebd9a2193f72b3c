//! Feature Preprocessor
//!
//! Strict: any row with a missing field is dropped. Power is recomputed
//! unconditionally so every downstream consumer sees
//! `puissance = tension x courant / 1000`.

use crate::logic::telemetry::{compute_power, Batch, RawBatch, Reading};

pub fn preprocess(raw: &RawBatch) -> Batch {
    let batch: Batch = raw
        .iter()
        .filter_map(|r| r.to_reading())
        .map(|mut reading: Reading| {
            reading.power = compute_power(reading.voltage, reading.current);
            reading
        })
        .collect();

    let dropped = raw.len() - batch.len();
    if dropped > 0 {
        log::debug!("Preprocess: dropped {} incomplete rows", dropped);
    }

    batch
}
