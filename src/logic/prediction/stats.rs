use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::PredictionRecord;
use crate::logic::fault::FaultType;

/// Aggregates over a window of successful predictions
///
/// Zeroed, never an error, when the window is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionStatistics {
    pub total: usize,
    pub anomaly_count: usize,
    pub anomaly_rate: f64,
    pub fault_type_counts: BTreeMap<FaultType, usize>,
    /// Mean over records that carry a confidence
    pub avg_confidence: f64,
    pub avg_score: f64,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

impl PredictionStatistics {
    pub fn from_records(records: &[PredictionRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let total = records.len();
        let anomaly_count = records.iter().filter(|r| r.is_anomaly).count();

        let mut fault_type_counts = BTreeMap::new();
        for record in records {
            *fault_type_counts.entry(record.fault_type).or_insert(0) += 1;
        }

        Self {
            total,
            anomaly_count,
            anomaly_rate: anomaly_count as f64 / total as f64,
            fault_type_counts,
            avg_confidence: mean(records.iter().filter_map(|r| r.confidence.map(|c| c.value()))),
            avg_score: mean(records.iter().filter_map(|r| r.anomaly_score)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::fault::{Confidence, FaultClassification};
    use crate::logic::model::AnomalyThreshold;
    use crate::logic::telemetry::RawReading;
    use chrono::Utc;

    #[test]
    fn test_empty_is_zeroed() {
        let stats = PredictionStatistics::from_records(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.anomaly_rate, 0.0);
        assert_eq!(stats.avg_confidence, 0.0);
        assert!(stats.fault_type_counts.is_empty());
    }

    #[test]
    fn test_aggregates() {
        let threshold = AnomalyThreshold::default();
        let input = RawReading::new("Nord", 230.0, 10.0);
        let records = vec![
            PredictionRecord::success(input.clone(), Utc::now(), threshold.verdict(-0.2), FaultClassification::ok()),
            PredictionRecord::success(
                input.clone(),
                Utc::now(),
                threshold.verdict(-0.8),
                FaultClassification {
                    fault_type: FaultType::Overload,
                    confidence: Some(Confidence::Calibrated(0.9)),
                },
            ),
        ];

        let stats = PredictionStatistics::from_records(&records);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.anomaly_count, 1);
        assert_eq!(stats.anomaly_rate, 0.5);
        assert_eq!(stats.fault_type_counts[&FaultType::Ok], 1);
        assert_eq!(stats.fault_type_counts[&FaultType::Overload], 1);
        assert_eq!(stats.avg_confidence, 0.9);
        assert!((stats.avg_score + 0.5).abs() < 1e-12);
    }
}
