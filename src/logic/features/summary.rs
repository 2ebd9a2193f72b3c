//! Descriptive statistics per feature column

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::layout::FEATURE_LAYOUT;
use super::vector::FeatureVector;
use crate::logic::telemetry::Batch;
use crate::logic::validation::quality::sample_std;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

impl ColumnStats {
    /// `None` on an empty column; `std` is 0 for a single value
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len();
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        Some(Self {
            mean: sorted.iter().sum::<f64>() / n as f64,
            std: sample_std(&sorted).unwrap_or(0.0),
            min: sorted[0],
            max: sorted[n - 1],
            median,
        })
    }
}

/// Stats keyed by feature name (`tension`, `courant`, `puissance`)
pub fn column_statistics(batch: &Batch) -> BTreeMap<&'static str, ColumnStats> {
    let vectors: Vec<FeatureVector> = batch.iter().map(FeatureVector::from_reading).collect();

    FEATURE_LAYOUT
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| {
            let column: Vec<f64> = vectors.iter().map(|v| v.values[idx]).collect();
            ColumnStats::from_values(&column).map(|stats| (*name, stats))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::telemetry::Reading;
    use chrono::Utc;

    #[test]
    fn test_empty_batch_has_no_stats() {
        assert!(column_statistics(&Batch::default()).is_empty());
    }

    #[test]
    fn test_column_statistics() {
        let now = Utc::now();
        let batch: Batch = [220.0, 230.0, 240.0, 250.0]
            .iter()
            .map(|v| Reading::new("Nord", *v, 10.0, now))
            .collect();

        let stats = column_statistics(&batch);
        let tension = &stats["tension"];
        assert_eq!(tension.min, 220.0);
        assert_eq!(tension.max, 250.0);
        assert_eq!(tension.mean, 235.0);
        assert_eq!(tension.median, 235.0);

        let courant = &stats["courant"];
        assert_eq!(courant.std, 0.0);
        assert_eq!(stats.len(), 3);
    }
}
