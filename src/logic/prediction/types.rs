use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::fault::{Confidence, FaultClassification, FaultType};
use crate::logic::model::AnomalyVerdict;
use crate::logic::telemetry::RawReading;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Success,
    Error,
}

impl PredictionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionStatus::Success => "success",
            PredictionStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for PredictionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One single-reading prediction, as kept in the rolling history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: Uuid,
    /// Time of the prediction, not of the acquisition
    pub timestamp: DateTime<Utc>,
    /// Input as received, power replaced by the recomputed value
    pub input: RawReading,
    /// Absent when scoring failed
    pub anomaly_score: Option<f64>,
    pub is_anomaly: bool,
    pub fault_type: FaultType,
    pub confidence: Option<Confidence>,
    pub status: PredictionStatus,
    pub error_message: Option<String>,
}

impl PredictionRecord {
    pub fn success(
        input: RawReading,
        timestamp: DateTime<Utc>,
        verdict: AnomalyVerdict,
        classification: FaultClassification,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            input,
            anomaly_score: Some(verdict.anomaly_score),
            is_anomaly: verdict.is_anomaly,
            fault_type: classification.fault_type,
            confidence: classification.confidence,
            status: PredictionStatus::Success,
            error_message: None,
        }
    }

    pub fn failure(
        input: RawReading,
        timestamp: DateTime<Utc>,
        verdict: Option<AnomalyVerdict>,
        classification: FaultClassification,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            input,
            anomaly_score: verdict.map(|v| v.anomaly_score),
            // never scored: flagged like the batch pipeline flags unscored rows
            is_anomaly: verdict.map_or(true, |v| v.is_anomaly),
            fault_type: classification.fault_type,
            confidence: classification.confidence,
            status: PredictionStatus::Error,
            error_message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == PredictionStatus::Success
    }
}
