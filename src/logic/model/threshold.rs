//! Anomaly Threshold
//!
//! Turns a continuous anomaly score into a verdict.
//! Fixed at -0.5 for the pipeline, configurable for experiments.

use serde::{Deserialize, Serialize};

use crate::constants::ANOMALY_SCORE_THRESHOLD;

/// Score cut-off: strictly below = anomalous
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyThreshold {
    pub value: f64,
}

impl Default for AnomalyThreshold {
    fn default() -> Self {
        Self {
            value: ANOMALY_SCORE_THRESHOLD,
        }
    }
}

impl AnomalyThreshold {
    pub fn new(value: f64) -> Self {
        Self { value }
    }

    pub fn is_anomaly(&self, score: f64) -> bool {
        score < self.value
    }

    pub fn verdict(&self, score: f64) -> AnomalyVerdict {
        AnomalyVerdict {
            anomaly_score: score,
            is_anomaly: self.is_anomaly(score),
        }
    }
}

/// Scorer output for one reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyVerdict {
    /// Lower = more anomalous
    pub anomaly_score: f64,
    pub is_anomaly: bool,
}
