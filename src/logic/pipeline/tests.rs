//! Pipeline tests with stub stages and with trained models

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{TimeZone, Utc};
use ndarray::ArrayView2;

use super::*;
use crate::logic::alert::Criticality;
use crate::logic::dataset::generator::generate;
use crate::logic::error::PipelineError;
use crate::logic::fault::{Confidence, FaultType};
use crate::logic::model::{train_models, ModelResult};
use crate::logic::telemetry::{Column, RawReading};
use crate::logic::validation::ValidationError;

/// Same score for every row
struct FixedScorer {
    score: f64,
}

impl AnomalyScorer for FixedScorer {
    fn fit(&mut self, _data: ArrayView2<'_, f64>) -> ModelResult<()> {
        Ok(())
    }

    fn score(&self, data: ArrayView2<'_, f64>) -> ModelResult<Vec<f64>> {
        Ok(vec![self.score; data.nrows()])
    }

    fn is_fitted(&self) -> bool {
        true
    }
}

/// Fails on batches, and on single rows with voltage under 200 V
struct FlakyScorer;

impl AnomalyScorer for FlakyScorer {
    fn fit(&mut self, _data: ArrayView2<'_, f64>) -> ModelResult<()> {
        Ok(())
    }

    fn score(&self, data: ArrayView2<'_, f64>) -> ModelResult<Vec<f64>> {
        if data.nrows() > 1 || data[[0, 0]] < 200.0 {
            return Err(ModelError::InvalidInput("flaky".to_string()));
        }
        Ok(vec![-0.1])
    }

    fn is_fitted(&self) -> bool {
        true
    }
}

struct UnfittedScorer;

impl AnomalyScorer for UnfittedScorer {
    fn fit(&mut self, _data: ArrayView2<'_, f64>) -> ModelResult<()> {
        Ok(())
    }

    fn score(&self, _data: ArrayView2<'_, f64>) -> ModelResult<Vec<f64>> {
        Err(ModelError::NotFitted)
    }

    fn is_fitted(&self) -> bool {
        false
    }
}

/// Counts calls, always answers ShortCircuit without probabilities
#[derive(Default)]
struct CountingClassifier {
    calls: AtomicUsize,
}

impl FaultClassifier for CountingClassifier {
    fn fit(&mut self, _data: ArrayView2<'_, f64>, _labels: &[FaultType]) -> ModelResult<()> {
        Ok(())
    }

    fn predict(&self, data: ArrayView2<'_, f64>) -> ModelResult<Vec<FaultType>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![FaultType::ShortCircuit; data.nrows()])
    }

    fn classes(&self) -> &[FaultType] {
        &[FaultType::ShortCircuit]
    }

    fn is_fitted(&self) -> bool {
        true
    }
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn reference_batch() -> RawBatch {
    RawBatch::new(vec![RawReading::new("Nord", 230.0, 10.0).with_power(2.3)])
}

#[test]
fn test_anomalous_score_invokes_classifier() {
    let classifier = CountingClassifier::default();
    let output = run_at(&reference_batch(), &FixedScorer { score: -0.6 }, &classifier, now()).unwrap();

    assert_eq!(output.scored.len(), 1);
    let row = &output.scored[0];
    assert!(row.is_anomaly());
    assert_eq!(row.fault_type(), FaultType::ShortCircuit);
    assert_eq!(row.classification.confidence, Some(Confidence::Fallback(0.7)));
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);

    assert_eq!(output.alerts.len(), 1);
    assert_eq!(output.alerts[0].criticality, Criticality::Critical);
}

#[test]
fn test_normal_score_skips_classifier() {
    let classifier = CountingClassifier::default();
    let output = run_at(&reference_batch(), &FixedScorer { score: -0.1 }, &classifier, now()).unwrap();

    let row = &output.scored[0];
    assert!(!row.is_anomaly());
    assert_eq!(row.fault_type(), FaultType::Ok);
    assert!(row.confidence().is_none());
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    assert!(output.alerts.is_empty());
}

#[test]
fn test_out_of_range_dropped_before_scoring() {
    let raw = RawBatch::new(vec![
        RawReading::new("Nord", 230.0, 10.0),
        RawReading::new("Sud", 170.0, 15.0),
    ]);
    let output = run_at(&raw, &FixedScorer { score: -0.1 }, &CountingClassifier::default(), now()).unwrap();

    assert_eq!(output.scored.len(), 1);
    assert_eq!(output.dropped, 1);
    assert_eq!(output.scored[0].reading.zone, "Nord");
    assert!((output.scored[0].reading.power - 2.3).abs() < 1e-12);
    assert_eq!(output.scored[0].reading.timestamp, now());
}

#[test]
fn test_validation_errors_surface() {
    let scorer = FixedScorer { score: -0.1 };
    let classifier = CountingClassifier::default();

    let empty = run_at(&RawBatch::new(Vec::new()), &scorer, &classifier, now());
    assert!(matches!(empty, Err(PipelineError::Validation(ValidationError::EmptyBatch))));

    let no_zone = RawBatch::with_columns(
        [Column::Voltage, Column::Current],
        vec![RawReading::new("Nord", 230.0, 10.0)],
    );
    let missing = run_at(&no_zone, &scorer, &classifier, now());
    assert!(matches!(
        missing,
        Err(PipelineError::Validation(ValidationError::MissingColumn(Column::Zone)))
    ));
}

#[test]
fn test_everything_dropped_is_empty_output() {
    let raw = RawBatch::new(vec![RawReading::new("Sud", 170.0, 15.0)]);
    let output = run_at(&raw, &FixedScorer { score: -0.9 }, &CountingClassifier::default(), now()).unwrap();
    assert!(output.scored.is_empty());
    assert!(output.alerts.is_empty());
    assert_eq!(output.kpis().anomaly_rate, 0.0);
    assert_eq!(output.kpis().dropped, 1);
}

#[test]
fn test_unfitted_scorer_is_model_unavailable() {
    let result = run_at(&reference_batch(), &UnfittedScorer, &CountingClassifier::default(), now());
    assert!(matches!(result, Err(PipelineError::ModelUnavailable(_))));
}

#[test]
fn test_row_scoring_failure_marks_row() {
    let raw = RawBatch::new(vec![
        RawReading::new("Nord", 230.0, 10.0),
        RawReading::new("Est", 190.0, 12.0),
    ]);
    let classifier = CountingClassifier::default();
    let output = run_at(&raw, &FlakyScorer, &classifier, now()).unwrap();

    assert_eq!(output.scored.len(), 2);
    assert_eq!(output.scored[0].fault_type(), FaultType::Ok);
    assert_eq!(output.scored[1].fault_type(), FaultType::Error);
    assert!(output.scored[1].is_anomaly());
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    assert_eq!(output.alerts.len(), 1);
    assert_eq!(output.alerts[0].criticality, Criticality::Moderate);
}

#[test]
fn test_kpis() {
    let raw = RawBatch::new(vec![
        RawReading::new("Nord", 230.0, 10.0),
        RawReading::new("Sud", 225.0, 11.0),
    ]);
    let output = run_at(&raw, &FixedScorer { score: -0.6 }, &CountingClassifier::default(), now()).unwrap();
    let kpis = output.kpis();
    assert_eq!(kpis.analyzed, 2);
    assert_eq!(kpis.anomalies, 2);
    assert_eq!(kpis.anomaly_rate, 1.0);
    assert_eq!(kpis.faults, 2);
    assert_eq!(kpis.critical_alerts, 2);
    assert_eq!(kpis.mean_confidence, Some(0.7));
}

/// With real models no reading carries a fault label without being anomalous
#[test]
fn test_two_stage_consistency_with_trained_models() {
    let models = train_models(&generate(500, 42), 42).unwrap();
    let raw = RawBatch::new(generate(300, 99).into_iter().map(|l| RawReading::from(l.reading)).collect());

    let output = run_at(&raw, &models.scorer, &models.classifier, now()).unwrap();
    assert!(!output.scored.is_empty());
    for row in &output.scored {
        if row.fault_type() != FaultType::Ok {
            assert!(row.is_anomaly());
        }
        if row.is_anomaly() {
            assert!(row.classification.confidence.unwrap().is_calibrated());
        } else {
            assert!(row.classification.confidence.is_none());
        }
    }
    let kpis = output.kpis();
    assert_eq!(kpis.alerts, kpis.anomalies);
}
