//! Pipeline Module - Batch Fault Detection
//!
//! raw batch -> validate -> preprocess -> score -> classify -> alerts
//!
//! Only `ValidationError` and an unusable scorer abort a run. Row-level
//! inference failures are marked on the row and the batch continues.
//!
//! ## Usage
//! ```ignore
//! use crate::logic::pipeline;
//!
//! let output = pipeline::run(&raw_batch, &models.scorer, &models.classifier)?;
//! for alert in &output.alerts {
//!     log::warn!("{} in {}: {}", alert.fault_type, alert.zone, alert.criticality);
//! }
//! ```

pub mod types;

use chrono::{DateTime, Utc};

pub use types::{BatchKpis, ScoredReading};

use crate::logic::alert::{generate_alerts, Alert, Criticality};
use crate::logic::error::PipelineResult;
use crate::logic::fault::{classify_verdict, FaultClassification};
use crate::logic::features::{batch_matrix, preprocess, FeatureVector};
use crate::logic::model::{AnomalyScorer, AnomalyThreshold, AnomalyVerdict, FaultClassifier, ModelError};
use crate::logic::telemetry::{Batch, RawBatch};
use crate::logic::validation::{detect_quality_issues, validate_at, QualityIssue};

/// Everything one run produces
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// Annotated clean readings, batch order
    pub scored: Vec<ScoredReading>,
    /// Sorted Critical > High > Moderate
    pub alerts: Vec<Alert>,
    /// Advisory only
    pub quality_issues: Vec<QualityIssue>,
    /// Rows removed by validation/preprocessing
    pub dropped: usize,
}

impl PipelineOutput {
    pub fn kpis(&self) -> BatchKpis {
        let analyzed = self.scored.len();
        let anomalies = self.scored.iter().filter(|s| s.is_anomaly()).count();
        let confidences: Vec<f64> = self.scored.iter().filter_map(|s| s.confidence()).collect();

        BatchKpis {
            analyzed,
            dropped: self.dropped,
            anomalies,
            anomaly_rate: if analyzed > 0 { anomalies as f64 / analyzed as f64 } else { 0.0 },
            faults: self.scored.iter().filter(|s| s.fault_type().is_fault()).count(),
            mean_confidence: if confidences.is_empty() {
                None
            } else {
                Some(confidences.iter().sum::<f64>() / confidences.len() as f64)
            },
            alerts: self.alerts.len(),
            critical_alerts: self
                .alerts
                .iter()
                .filter(|a| a.criticality == Criticality::Critical)
                .count(),
        }
    }
}

/// Run the full pipeline on a raw batch
pub fn run(
    raw: &RawBatch,
    scorer: &dyn AnomalyScorer,
    classifier: &dyn FaultClassifier,
) -> PipelineResult<PipelineOutput> {
    run_at(raw, scorer, classifier, Utc::now())
}

/// Same as `run`, with the clock used for missing timestamps
pub fn run_at(
    raw: &RawBatch,
    scorer: &dyn AnomalyScorer,
    classifier: &dyn FaultClassifier,
    now: DateTime<Utc>,
) -> PipelineResult<PipelineOutput> {
    let validated = validate_at(raw, now)?;
    let quality_issues = detect_quality_issues(&validated);
    for issue in &quality_issues {
        log::warn!("Data quality: {}", issue);
    }

    let batch = preprocess(&validated);
    let dropped = raw.len() - batch.len();
    if batch.is_empty() {
        log::warn!("No reading left after cleaning ({} dropped)", dropped);
        return Ok(PipelineOutput {
            quality_issues,
            dropped,
            ..PipelineOutput::default()
        });
    }

    let verdicts = score_batch(scorer, &batch)?;
    let scored = annotate(batch, verdicts, classifier);
    let alerts = generate_alerts(&scored);

    let output = PipelineOutput {
        scored,
        alerts,
        quality_issues,
        dropped,
    };
    log::info!("Pipeline run: {}", output.kpis());
    Ok(output)
}

/// Stage 1 over the whole batch
///
/// An unfitted scorer aborts the run. Any other batch failure falls back
/// to row-by-row scoring so one bad row only loses its own verdict.
pub fn score_batch(scorer: &dyn AnomalyScorer, batch: &Batch) -> PipelineResult<Vec<Option<AnomalyVerdict>>> {
    let threshold = AnomalyThreshold::default();

    match scorer.score(batch_matrix(batch).view()) {
        Ok(scores) if scores.len() == batch.len() => {
            Ok(scores.into_iter().map(|s| Some(threshold.verdict(s))).collect())
        }
        Ok(scores) => Err(ModelError::InvalidInput(format!(
            "scorer returned {} scores for {} readings",
            scores.len(),
            batch.len()
        ))
        .into()),
        Err(ModelError::NotFitted) => Err(ModelError::NotFitted.into()),
        Err(e) => {
            log::warn!("Batch scoring failed ({}), scoring row by row", e);
            Ok(batch
                .iter()
                .map(|reading| {
                    let features = FeatureVector::from_reading(reading);
                    match scorer.score(features.to_matrix().view()) {
                        Ok(scores) => scores.first().map(|&s| threshold.verdict(s)),
                        Err(e) => {
                            log::warn!("Scoring failed for {} reading: {}", reading.zone, e);
                            None
                        }
                    }
                })
                .collect())
        }
    }
}

/// Stage 2 on anomalous rows, failed rows marked `Error`
fn annotate(
    batch: Batch,
    verdicts: Vec<Option<AnomalyVerdict>>,
    classifier: &dyn FaultClassifier,
) -> Vec<ScoredReading> {
    batch
        .into_readings()
        .into_iter()
        .zip(verdicts)
        .map(|(reading, verdict)| match verdict {
            Some(verdict) => {
                let features = FeatureVector::from_reading(&reading);
                let classification = classify_verdict(classifier, &verdict, &features);
                ScoredReading {
                    reading,
                    verdict,
                    classification,
                }
            }
            // unscored rows stay visible as flagged errors
            None => ScoredReading {
                reading,
                verdict: AnomalyVerdict {
                    anomaly_score: f64::NAN,
                    is_anomaly: true,
                },
                classification: FaultClassification::error(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests;
