//! Model Training
//!
//! Stage 1 (isolation forest) learns from every row, stage 2 (random
//! forest) only from fault rows. `TrainedModels` owns both stages and
//! remembers where each came from.

use super::artifact::{load_or_train, Provenance};
use super::{AnomalyScorer, FaultClassifier, IsolationForest, ModelResult, RandomForest};
use crate::logic::config::Config;
use crate::logic::dataset::LabeledReading;
use crate::logic::error::PipelineResult;
use crate::logic::features::{feature_matrix, FeatureVector};
use crate::logic::prediction::PredictionService;

fn features_of<'a>(rows: impl Iterator<Item = &'a LabeledReading>) -> Vec<FeatureVector> {
    rows.map(|l| FeatureVector::from_measurements(l.reading.voltage, l.reading.current))
        .collect()
}

/// Fit the anomaly scorer on all rows
pub fn fit_scorer(rows: &[LabeledReading], seed: u64) -> ModelResult<IsolationForest> {
    let matrix = feature_matrix(&features_of(rows.iter()));
    let mut scorer = IsolationForest::new().with_seed(seed);
    scorer.fit(matrix.view())?;
    Ok(scorer)
}

/// Fit the fault classifier on fault rows only
///
/// Returns the classifier and the number of fault rows it saw.
pub fn fit_classifier(rows: &[LabeledReading], seed: u64) -> ModelResult<(RandomForest, usize)> {
    let faults: Vec<&LabeledReading> = rows.iter().filter(|l| l.fault.is_fault()).collect();
    let matrix = feature_matrix(&features_of(faults.iter().copied()));
    let labels: Vec<_> = faults.iter().map(|l| l.fault).collect();

    let mut classifier = RandomForest::new().with_seed(seed);
    classifier.fit(matrix.view(), &labels)?;
    Ok((classifier, faults.len()))
}

/// Both pipeline stages
#[derive(Debug, Clone)]
pub struct TrainedModels {
    pub scorer: IsolationForest,
    pub classifier: RandomForest,
    pub scorer_provenance: Provenance,
    pub classifier_provenance: Provenance,
}

/// Fit both stages in memory
pub fn train_models(rows: &[LabeledReading], seed: u64) -> ModelResult<TrainedModels> {
    let scorer = fit_scorer(rows, seed)?;
    let (classifier, fault_rows) = fit_classifier(rows, seed)?;

    log::info!(
        "Trained models on {} rows ({} faults)",
        rows.len(),
        fault_rows
    );

    Ok(TrainedModels {
        scorer,
        classifier,
        scorer_provenance: Provenance::Trained,
        classifier_provenance: Provenance::Trained,
    })
}

/// Training set produced on first use only
struct LazyTrainingSet<F> {
    source: Option<F>,
    rows: Vec<LabeledReading>,
}

impl<F: FnOnce() -> Vec<LabeledReading>> LazyTrainingSet<F> {
    fn new(source: F) -> Self {
        Self {
            source: Some(source),
            rows: Vec::new(),
        }
    }

    fn rows(&mut self) -> &[LabeledReading] {
        if let Some(source) = self.source.take() {
            self.rows = source();
            log::debug!("Training set ready: {} rows", self.rows.len());
        }
        &self.rows
    }
}

impl TrainedModels {
    /// Load both artifacts from the configured paths, training what is missing
    ///
    /// `training` is called at most once, and only if some artifact has to
    /// be (re)trained.
    pub fn load_or_train<F>(config: &Config, training: F) -> PipelineResult<Self>
    where
        F: FnOnce() -> Vec<LabeledReading>,
    {
        let seed = config.seed;
        let mut set = LazyTrainingSet::new(training);

        let (scorer, scorer_provenance) = load_or_train(&config.scorer_model_path, || {
            let rows = set.rows();
            Ok((fit_scorer(rows, seed)?, rows.len()))
        })?;

        let (classifier, classifier_provenance) = load_or_train(&config.classifier_model_path, || {
            fit_classifier(set.rows(), seed)
        })?;

        log::info!(
            "Models ready: scorer {}, classifier {}",
            scorer_provenance,
            classifier_provenance
        );

        Ok(Self {
            scorer,
            classifier,
            scorer_provenance,
            classifier_provenance,
        })
    }

    /// Both stages came from verified artifacts
    pub fn is_verified(&self) -> bool {
        self.scorer_provenance == Provenance::Loaded && self.classifier_provenance == Provenance::Loaded
    }

    pub fn is_fitted(&self) -> bool {
        self.scorer.is_fitted() && self.classifier.is_fitted()
    }

    /// Hand both stages to a prediction service
    pub fn into_service(self, history_capacity: usize) -> PredictionService {
        PredictionService::new(Box::new(self.scorer), Box::new(self.classifier), history_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::dataset::generator::generate;
    use crate::logic::fault::FaultType;
    use tempfile::tempdir;

    #[test]
    fn test_train_models() {
        let rows = generate(500, 42);
        let models = train_models(&rows, 42).unwrap();
        assert!(models.is_fitted());
        assert!(!models.is_verified());
        assert!(models
            .classifier
            .classes()
            .iter()
            .all(|c| FaultType::FAULTS.contains(c)));
    }

    #[test]
    fn test_classifier_needs_fault_rows() {
        let rows: Vec<LabeledReading> = generate(200, 1)
            .into_iter()
            .filter(|l| !l.fault.is_fault())
            .collect();
        assert!(fit_classifier(&rows, 42).is_err());
    }

    #[test]
    fn test_load_or_train_then_load() {
        let dir = tempdir().unwrap();
        let config = Config {
            scorer_model_path: dir.path().join("scorer.json"),
            classifier_model_path: dir.path().join("classifier.json"),
            ..Config::default()
        };

        let mut calls = 0;
        let first = TrainedModels::load_or_train(&config, || {
            calls += 1;
            generate(300, 3)
        })
        .unwrap();
        assert_eq!(calls, 1);
        assert!(!first.is_verified());

        let second = TrainedModels::load_or_train(&config, || -> Vec<LabeledReading> {
            panic!("artifacts exist, no training expected")
        })
        .unwrap();
        assert!(second.is_verified());
    }
}
