//! Pipeline Types
//!
//! Annotated readings and batch-level KPIs.

use serde::{Deserialize, Serialize};

use crate::logic::fault::{FaultClassification, FaultType};
use crate::logic::model::AnomalyVerdict;
use crate::logic::telemetry::Reading;

/// A clean reading with both stage outputs attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredReading {
    pub reading: Reading,
    pub verdict: AnomalyVerdict,
    pub classification: FaultClassification,
}

impl ScoredReading {
    pub fn is_anomaly(&self) -> bool {
        self.verdict.is_anomaly
    }

    pub fn anomaly_score(&self) -> f64 {
        self.verdict.anomaly_score
    }

    pub fn fault_type(&self) -> FaultType {
        self.classification.fault_type
    }

    /// Confidence value, absent for non-anomalous readings
    pub fn confidence(&self) -> Option<f64> {
        self.classification.confidence.map(|c| c.value())
    }
}

/// Operator KPIs of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchKpis {
    /// Readings that reached the scorer
    pub analyzed: usize,
    /// Rows removed by validation/preprocessing
    pub dropped: usize,
    pub anomalies: usize,
    /// `anomalies / analyzed`, 0 when nothing was analyzed
    pub anomaly_rate: f64,
    /// Readings labeled with something other than OK
    pub faults: usize,
    /// Mean confidence over readings that carry one
    pub mean_confidence: Option<f64>,
    pub alerts: usize,
    pub critical_alerts: usize,
}

impl std::fmt::Display for BatchKpis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "analyzed={} dropped={} anomalies={} ({:.1}%) faults={} alerts={} (critical {})",
            self.analyzed,
            self.dropped,
            self.anomalies,
            self.anomaly_rate * 100.0,
            self.faults,
            self.alerts,
            self.critical_alerts
        )?;
        if let Some(c) = self.mean_confidence {
            write!(f, " confidence={:.1}%", c * 100.0)?;
        }
        Ok(())
    }
}
