//! Alert Engine
//!
//! Anomalous readings become alerts, most urgent first.
//! Total function: an empty or all-normal batch yields no alerts.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::{Alert, Criticality};
use crate::logic::fault::FaultType;
use crate::logic::pipeline::ScoredReading;

/// Fixed fault -> criticality lookup
pub fn criticality_for(fault: FaultType) -> Criticality {
    match fault {
        FaultType::ShortCircuit => Criticality::Critical,
        FaultType::Overload => Criticality::High,
        _ => Criticality::Moderate,
    }
}

/// Alerts for the anomalous rows, Critical > High > Moderate
///
/// Stable: batch order is kept inside each tier.
pub fn generate_alerts(scored: &[ScoredReading]) -> Vec<Alert> {
    let mut alerts: Vec<Alert> = scored
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_anomaly())
        .map(|(index, s)| Alert {
            zone: s.reading.zone.clone(),
            fault_type: s.fault_type(),
            criticality: criticality_for(s.fault_type()),
            reading_index: index,
            timestamp: s.reading.timestamp,
        })
        .collect();

    alerts.sort_by_key(|a| Reverse(a.criticality.level()));
    alerts
}

/// Alert counts per tier and per zone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub moderate: usize,
    pub by_zone: BTreeMap<String, usize>,
}

impl AlertSummary {
    pub fn from_alerts(alerts: &[Alert]) -> Self {
        let mut summary = Self::default();
        for alert in alerts {
            summary.total += 1;
            match alert.criticality {
                Criticality::Critical => summary.critical += 1,
                Criticality::High => summary.high += 1,
                Criticality::Moderate => summary.moderate += 1,
            }
            *summary.by_zone.entry(alert.zone.clone()).or_insert(0) += 1;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::fault::{Confidence, FaultClassification};
    use crate::logic::model::AnomalyThreshold;
    use crate::logic::telemetry::Reading;
    use chrono::Utc;

    fn scored(zone: &str, score: f64, fault: FaultType) -> ScoredReading {
        let verdict = AnomalyThreshold::default().verdict(score);
        let classification = if verdict.is_anomaly {
            FaultClassification {
                fault_type: fault,
                confidence: Some(Confidence::Fallback(0.7)),
            }
        } else {
            FaultClassification::ok()
        };
        ScoredReading {
            reading: Reading::new(zone, 200.0, 12.0, Utc::now()),
            verdict,
            classification,
        }
    }

    #[test]
    fn test_criticality_mapping() {
        assert_eq!(criticality_for(FaultType::ShortCircuit), Criticality::Critical);
        assert_eq!(criticality_for(FaultType::Overload), Criticality::High);
        assert_eq!(criticality_for(FaultType::LineCut), Criticality::Moderate);
        assert_eq!(criticality_for(FaultType::Unknown), Criticality::Moderate);
    }

    #[test]
    fn test_sorted_by_criticality_stable() {
        let batch = vec![
            scored("Nord", -0.7, FaultType::LineCut),
            scored("Sud", -0.1, FaultType::Ok),
            scored("Est", -0.8, FaultType::Overload),
            scored("Ouest", -0.9, FaultType::ShortCircuit),
            scored("Centre", -0.6, FaultType::Unknown),
            scored("Nord", -0.75, FaultType::ShortCircuit),
        ];

        let alerts = generate_alerts(&batch);
        let order: Vec<(&str, Criticality)> = alerts.iter().map(|a| (a.zone.as_str(), a.criticality)).collect();
        assert_eq!(
            order,
            vec![
                ("Ouest", Criticality::Critical),
                ("Nord", Criticality::Critical),
                ("Est", Criticality::High),
                ("Nord", Criticality::Moderate),
                ("Centre", Criticality::Moderate),
            ]
        );
        assert!(alerts.windows(2).all(|w| w[0].criticality.level() >= w[1].criticality.level()));
        assert_eq!(alerts[0].reading_index, 3);
    }

    #[test]
    fn test_empty_and_normal_batches() {
        assert!(generate_alerts(&[]).is_empty());
        assert!(generate_alerts(&[scored("Nord", -0.2, FaultType::Ok)]).is_empty());
        assert_eq!(AlertSummary::from_alerts(&[]), AlertSummary::default());
    }

    #[test]
    fn test_summary() {
        let batch = vec![
            scored("Nord", -0.9, FaultType::ShortCircuit),
            scored("Nord", -0.7, FaultType::LineCut),
            scored("Sud", -0.8, FaultType::Overload),
        ];
        let summary = AlertSummary::from_alerts(&generate_alerts(&batch));
        assert_eq!(summary.total, 3);
        assert_eq!((summary.critical, summary.high, summary.moderate), (1, 1, 1));
        assert_eq!(summary.by_zone["Nord"], 2);
    }
}
