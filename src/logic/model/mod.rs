//! Model Module - Anomaly Scoring & Fault Classification
//!
//! The pipeline depends only on the `AnomalyScorer` / `FaultClassifier`
//! capabilities, never on a concrete model family. Swapping the algorithm
//! means implementing the trait, nothing else changes.
//!
//! - `isolation`: isolation forest scorer (unsupervised gate)
//! - `tree` / `forest`: CART trees and random forest classifier
//! - `threshold`: anomaly verdict from a score
//! - `artifact`: versioned, checksummed model persistence
//! - `training`: fit both stages, `load_or_train`

pub mod threshold;
pub mod isolation;
pub mod tree;
pub mod forest;
pub mod artifact;
pub mod training;

use ndarray::ArrayView2;
use thiserror::Error;

use crate::logic::fault::FaultType;

pub use threshold::{AnomalyThreshold, AnomalyVerdict};
pub use isolation::IsolationForest;
pub use forest::RandomForest;
pub use artifact::{load_or_train, load_model, save_model, ArtifactError, ModelArtifact, PersistableModel, Provenance};
pub use training::{fit_classifier, fit_scorer, train_models, TrainedModels};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Model not fitted: call fit() before scoring")]
    NotFitted,

    #[error("Insufficient data: required {required}, got {got}")]
    InsufficientData { required: usize, got: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}

pub type ModelResult<T> = Result<T, ModelError>;

/// Reject empty-width, wrong-width or non-finite input
pub(crate) fn check_input(data: ArrayView2<'_, f64>, n_features: usize) -> ModelResult<()> {
    if data.ncols() != n_features {
        return Err(ModelError::InvalidInput(format!(
            "expected {} features, got {}",
            n_features,
            data.ncols()
        )));
    }
    if let Some(pos) = data.iter().position(|v| !v.is_finite()) {
        return Err(ModelError::InvalidInput(format!(
            "non-finite value at row {}",
            pos / n_features.max(1)
        )));
    }
    Ok(())
}

// ============================================================================
// CAPABILITIES
// ============================================================================

/// Unsupervised scorer: lower score = more anomalous, no fixed bound
pub trait AnomalyScorer: Send + Sync {
    /// Fit on a training matrix (`n x FEATURE_COUNT`)
    fn fit(&mut self, data: ArrayView2<'_, f64>) -> ModelResult<()>;

    /// Anomaly score per row
    fn score(&self, data: ArrayView2<'_, f64>) -> ModelResult<Vec<f64>>;

    /// Binary flag per row through the fixed threshold
    fn predict(&self, data: ArrayView2<'_, f64>) -> ModelResult<Vec<bool>> {
        let threshold = AnomalyThreshold::default();
        Ok(self.score(data)?.into_iter().map(|s| threshold.is_anomaly(s)).collect())
    }

    fn is_fitted(&self) -> bool;
}

/// Supervised fault classifier, trained on fault rows only
pub trait FaultClassifier: Send + Sync {
    fn fit(&mut self, data: ArrayView2<'_, f64>, labels: &[FaultType]) -> ModelResult<()>;

    /// Fault label per row
    fn predict(&self, data: ArrayView2<'_, f64>) -> ModelResult<Vec<FaultType>>;

    /// Class-membership probabilities per row, ordered as `classes()`
    ///
    /// Optional capability; the default reports it unsupported.
    fn predict_proba(&self, _data: ArrayView2<'_, f64>) -> ModelResult<Vec<Vec<f64>>> {
        Err(ModelError::Unsupported("predict_proba"))
    }

    /// Known classes, sorted
    fn classes(&self) -> &[FaultType];

    fn is_fitted(&self) -> bool;
}
