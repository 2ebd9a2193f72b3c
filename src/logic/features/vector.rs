//! Feature Vector - Core data structure for model input
//!
//! Ordered as `FEATURE_LAYOUT`. Batches become an `n x FEATURE_COUNT`
//! matrix for the models.

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use super::layout::{FEATURE_COUNT, FEATURE_LAYOUT, CURRENT_INDEX, POWER_INDEX, VOLTAGE_INDEX};
use crate::logic::telemetry::{compute_power, Batch, Reading};

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Feature values in layout order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Features of a reading, power recomputed from voltage and current
    pub fn from_measurements(voltage: f64, current: f64) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        values[VOLTAGE_INDEX] = voltage;
        values[CURRENT_INDEX] = current;
        values[POWER_INDEX] = compute_power(voltage, current);
        Self { values }
    }

    /// Features of a complete reading (power taken as-is)
    pub fn from_reading(reading: &Reading) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        values[VOLTAGE_INDEX] = reading.voltage;
        values[CURRENT_INDEX] = reading.current;
        values[POWER_INDEX] = reading.power;
        Self { values }
    }

    /// Read a matrix row, `None` if the width does not match the layout
    pub fn from_row(row: ArrayView1<'_, f64>) -> Option<Self> {
        if row.len() != FEATURE_COUNT {
            return None;
        }
        let mut values = [0.0; FEATURE_COUNT];
        for (slot, v) in values.iter_mut().zip(row.iter()) {
            *slot = *v;
        }
        Some(Self { values })
    }

    pub fn voltage(&self) -> f64 {
        self.values[VOLTAGE_INDEX]
    }

    pub fn current(&self) -> f64 {
        self.values[CURRENT_INDEX]
    }

    pub fn power(&self) -> f64 {
        self.values[POWER_INDEX]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// Single-row matrix for model calls
    pub fn to_matrix(&self) -> Array2<f64> {
        feature_matrix(std::slice::from_ref(self))
    }

    /// Named values for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::Value::Object(
            FEATURE_LAYOUT
                .iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), serde_json::json!(value)))
                .collect(),
        )
    }
}

impl From<&Reading> for FeatureVector {
    fn from(reading: &Reading) -> Self {
        Self::from_reading(reading)
    }
}

// ============================================================================
// MATRICES
// ============================================================================

/// Stack feature vectors into an `n x FEATURE_COUNT` matrix
pub fn feature_matrix(vectors: &[FeatureVector]) -> Array2<f64> {
    let mut matrix = Array2::<f64>::zeros((vectors.len(), FEATURE_COUNT));
    for (mut row, vector) in matrix.rows_mut().into_iter().zip(vectors) {
        for (cell, value) in row.iter_mut().zip(vector.values.iter()) {
            *cell = *value;
        }
    }
    matrix
}

/// Feature matrix of a clean batch, rows in batch order
pub fn batch_matrix(batch: &Batch) -> Array2<f64> {
    let vectors: Vec<FeatureVector> = batch.iter().map(FeatureVector::from_reading).collect();
    feature_matrix(&vectors)
}
