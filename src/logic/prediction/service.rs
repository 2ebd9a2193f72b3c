//! Prediction Service
//!
//! Owns both trained stages and the rolling history. `&self` everywhere:
//! the history sits behind a `RwLock`, so appends are serialized and
//! `recent`/`statistics` read one consistent snapshot.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use super::history::PredictionHistory;
use super::stats::PredictionStatistics;
use super::types::{PredictionRecord, PredictionStatus};
use crate::logic::fault::{try_classify, FaultClassification};
use crate::logic::features::FeatureVector;
use crate::logic::model::{AnomalyScorer, AnomalyThreshold, FaultClassifier, ModelError};
use crate::logic::telemetry::RawReading;

pub struct PredictionService {
    scorer: Box<dyn AnomalyScorer>,
    classifier: Box<dyn FaultClassifier>,
    threshold: AnomalyThreshold,
    history: RwLock<PredictionHistory>,
}

impl PredictionService {
    pub fn new(
        scorer: Box<dyn AnomalyScorer>,
        classifier: Box<dyn FaultClassifier>,
        history_capacity: usize,
    ) -> Self {
        Self {
            scorer,
            classifier,
            threshold: AnomalyThreshold::default(),
            history: RwLock::new(PredictionHistory::new(history_capacity)),
        }
    }

    // ========================================================================
    // INFERENCE
    // ========================================================================

    /// Score and classify one reading, record it in the history
    pub fn predict(&self, reading: &RawReading) -> PredictionRecord {
        self.predict_at(reading, Utc::now())
    }

    /// Same as `predict`, stamped with `now`
    pub fn predict_at(&self, reading: &RawReading, now: DateTime<Utc>) -> PredictionRecord {
        let mut input = reading.clone();

        let record = match (reading.voltage, reading.current) {
            (Some(v), Some(c)) if v.is_finite() && c.is_finite() => {
                // caller-supplied power is never trusted
                let features = FeatureVector::from_measurements(v, c);
                input.power = Some(features.power());
                self.infer(&features, input, now)
            }
            _ => {
                input.power = None;
                PredictionRecord::failure(
                    input,
                    now,
                    None,
                    FaultClassification::error(),
                    "voltage and current must be present and finite",
                )
            }
        };

        if let Some(message) = &record.error_message {
            log::warn!("Prediction {} failed: {}", record.id, message);
        }

        self.history.write().push(record.clone());
        record
    }

    fn infer(&self, features: &FeatureVector, input: RawReading, now: DateTime<Utc>) -> PredictionRecord {
        let score = self
            .scorer
            .score(features.to_matrix().view())
            .and_then(|scores| {
                scores
                    .first()
                    .copied()
                    .ok_or_else(|| ModelError::InvalidInput("scorer returned no score".to_string()))
            });

        let verdict = match score {
            Ok(score) => self.threshold.verdict(score),
            Err(e) => {
                return PredictionRecord::failure(input, now, None, FaultClassification::error(), e.to_string())
            }
        };

        if !verdict.is_anomaly {
            return PredictionRecord::success(input, now, verdict, FaultClassification::ok());
        }

        match try_classify(self.classifier.as_ref(), features) {
            Ok(classification) => PredictionRecord::success(input, now, verdict, classification),
            Err(e) => PredictionRecord::failure(
                input,
                now,
                Some(verdict),
                FaultClassification::unknown(),
                e.to_string(),
            ),
        }
    }

    /// Row-wise `predict`, input order kept, failures recorded per row
    pub fn predict_batch(&self, readings: &[RawReading]) -> Vec<PredictionRecord> {
        self.predict_batch_at(readings, Utc::now())
    }

    pub fn predict_batch_at(&self, readings: &[RawReading], now: DateTime<Utc>) -> Vec<PredictionRecord> {
        let records: Vec<PredictionRecord> = readings.iter().map(|r| self.predict_at(r, now)).collect();

        let failed = records
            .iter()
            .filter(|r| r.status == PredictionStatus::Error)
            .count();
        log::debug!("Batch prediction: {} records, {} failed", records.len(), failed);

        records
    }

    // ========================================================================
    // HISTORY
    // ========================================================================

    /// Successful predictions of the trailing `window_minutes`
    pub fn recent(&self, window_minutes: i64) -> Vec<PredictionRecord> {
        self.recent_at(window_minutes, Utc::now())
    }

    pub fn recent_at(&self, window_minutes: i64, now: DateTime<Utc>) -> Vec<PredictionRecord> {
        self.history.read().successful_since(window_start(now, window_minutes))
    }

    /// Aggregates over the trailing `window_hours`
    pub fn statistics(&self, window_hours: i64) -> PredictionStatistics {
        self.statistics_at(window_hours, Utc::now())
    }

    pub fn statistics_at(&self, window_hours: i64, now: DateTime<Utc>) -> PredictionStatistics {
        let window_minutes = window_hours.checked_mul(60).unwrap_or(i64::MAX);
        PredictionStatistics::from_records(&self.recent_at(window_minutes, now))
    }

    pub fn history_len(&self) -> usize {
        self.history.read().len()
    }

    pub fn history_capacity(&self) -> usize {
        self.history.read().capacity()
    }

    pub fn clear_history(&self) {
        self.history.write().clear();
    }
}

/// Start of a trailing window, saturating at the earliest representable instant
fn window_start(now: DateTime<Utc>, window_minutes: i64) -> DateTime<Utc> {
    Duration::try_minutes(window_minutes)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
