//! Error handling
//!
//! Crate-level error taxonomy. Module errors fold into `PipelineError`.

use thiserror::Error;

use crate::logic::dataset::DatasetError;
use crate::logic::model::artifact::ArtifactError;
use crate::logic::model::ModelError;
use crate::logic::source::SourceError;
use crate::logic::validation::ValidationError;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed or empty input, fatal to that batch
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Model artifact missing/corrupt or model not fitted
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Inference failure
    #[error("Prediction error: {0}")]
    Prediction(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

impl From<ArtifactError> for PipelineError {
    fn from(err: ArtifactError) -> Self {
        PipelineError::ModelUnavailable(err.to_string())
    }
}

impl From<ModelError> for PipelineError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::NotFitted => PipelineError::ModelUnavailable(err.to_string()),
            other => PipelineError::Prediction(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::telemetry::Column;

    #[test]
    fn test_not_fitted_maps_to_model_unavailable() {
        let err: PipelineError = ModelError::NotFitted.into();
        assert!(matches!(err, PipelineError::ModelUnavailable(_)));
    }

    #[test]
    fn test_invalid_input_maps_to_prediction() {
        let err: PipelineError = ModelError::InvalidInput("nan".to_string()).into();
        assert!(matches!(err, PipelineError::Prediction(_)));
        assert!(err.to_string().contains("nan"));
    }

    #[test]
    fn test_validation_display_is_transparent() {
        let err: PipelineError = ValidationError::MissingColumn(Column::Voltage).into();
        assert_eq!(err.to_string(), "Missing mandatory column: tension");
    }
}
