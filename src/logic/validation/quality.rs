//! Data Quality Issues
//!
//! Advisory checks for operator visibility. Never gates the pipeline.

use serde::{Deserialize, Serialize};

use crate::constants::LOW_VARIANCE_STD;
use crate::logic::telemetry::{Column, RawBatch, RawReading};

/// What went wrong
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IssueKind {
    /// Batch holds no readings
    NoData,
    /// Values missing in a declared column
    MissingValues { count: usize },
    /// Near-constant column, possible stale sensor
    LowVariance { std: f64 },
}

/// Data quality issue attached to a column (or the whole batch)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub column: Option<Column>,
    pub kind: IssueKind,
}

impl QualityIssue {
    pub fn description(&self) -> String {
        match &self.kind {
            IssueKind::NoData => "no data available".to_string(),
            IssueKind::MissingValues { count } => format!("{} missing values", count),
            IssueKind::LowVariance { std } => format!("variance too low ({:.2})", std),
        }
    }
}

impl std::fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.column {
            Some(column) => write!(f, "{}: {}", column, self.description()),
            None => write!(f, "{}", self.description()),
        }
    }
}

/// Detect missing values and near-zero variance
pub fn detect_quality_issues(batch: &RawBatch) -> Vec<QualityIssue> {
    if batch.is_empty() {
        return vec![QualityIssue { column: None, kind: IssueKind::NoData }];
    }

    let mut issues = Vec::new();

    for column in Column::ALL {
        if !batch.has_column(column) {
            continue;
        }
        let count = batch.iter().filter(|r| is_missing(r, column)).count();
        if count > 0 {
            issues.push(QualityIssue {
                column: Some(column),
                kind: IssueKind::MissingValues { count },
            });
        }
    }

    let numeric: [(Column, fn(&RawReading) -> Option<f64>); 2] = [
        (Column::Voltage, |r| r.voltage),
        (Column::Current, |r| r.current),
    ];
    for (column, value) in numeric {
        let values: Vec<f64> = batch.iter().filter_map(value).collect();
        if let Some(std) = sample_std(&values) {
            if std < LOW_VARIANCE_STD {
                issues.push(QualityIssue {
                    column: Some(column),
                    kind: IssueKind::LowVariance { std },
                });
            }
        }
    }

    issues
}

fn is_missing(reading: &RawReading, column: Column) -> bool {
    match column {
        Column::Zone => reading.zone.is_none(),
        Column::Voltage => reading.voltage.is_none(),
        Column::Current => reading.current.is_none(),
        Column::Power => reading.power.is_none(),
        Column::Timestamp => reading.timestamp.is_none(),
    }
}

/// Sample standard deviation (n - 1), undefined below two values
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}
