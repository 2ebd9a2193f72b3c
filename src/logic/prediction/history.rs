//! Prediction History - bounded ring of recent predictions
//!
//! Oldest record is evicted once the capacity is reached.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use super::types::PredictionRecord;

#[derive(Debug, Clone)]
pub struct PredictionHistory {
    records: VecDeque<PredictionRecord>,
    capacity: usize,
}

impl PredictionHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append, returning the evicted record if the ring was full
    pub fn push(&mut self, record: PredictionRecord) -> Option<PredictionRecord> {
        let evicted = if self.records.len() >= self.capacity {
            self.records.pop_front()
        } else {
            None
        };
        self.records.push_back(record);
        evicted
    }

    /// Successful records strictly newer than `cutoff`, oldest first
    pub fn successful_since(&self, cutoff: DateTime<Utc>) -> Vec<PredictionRecord> {
        self.records
            .iter()
            .filter(|r| r.is_success() && r.timestamp > cutoff)
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PredictionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::fault::FaultClassification;
    use crate::logic::model::AnomalyThreshold;
    use crate::logic::telemetry::RawReading;
    use chrono::{Duration, TimeZone};

    fn record_at(ts: DateTime<Utc>, voltage: f64) -> PredictionRecord {
        PredictionRecord::success(
            RawReading::new("Nord", voltage, 10.0),
            ts,
            AnomalyThreshold::default().verdict(-0.2),
            FaultClassification::ok(),
        )
    }

    #[test]
    fn test_evicts_oldest() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut history = PredictionHistory::new(3);
        for i in 0..5 {
            let evicted = history.push(record_at(t0 + Duration::minutes(i), 200.0 + i as f64));
            assert_eq!(evicted.is_some(), i >= 3);
        }
        assert_eq!(history.len(), 3);
        let voltages: Vec<Option<f64>> = history.iter().map(|r| r.input.voltage).collect();
        assert_eq!(voltages, vec![Some(202.0), Some(203.0), Some(204.0)]);
    }

    #[test]
    fn test_cutoff_is_strict() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut history = PredictionHistory::new(10);
        history.push(record_at(t0, 230.0));
        history.push(record_at(t0 + Duration::minutes(1), 231.0));

        assert_eq!(history.successful_since(t0).len(), 1);
        assert_eq!(history.successful_since(t0 - Duration::seconds(1)).len(), 2);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let history = PredictionHistory::new(0);
        assert_eq!(history.capacity(), 1);
        assert!(history.is_empty());
    }
}
