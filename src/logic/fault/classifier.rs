//! Fault Classifier Stage
//!
//! Only logic here: gate on the anomaly verdict, call the classifier,
//! tag the confidence. Types live in `types`.

use super::types::{Confidence, FaultClassification};
use crate::constants::FALLBACK_CONFIDENCE;
use crate::logic::features::FeatureVector;
use crate::logic::model::{AnomalyVerdict, FaultClassifier, ModelError, ModelResult};

/// Classify one anomalous reading
///
/// Label from `predict`; confidence is the max class probability when the
/// classifier exposes probabilities, otherwise the fixed fallback value.
pub fn try_classify(
    classifier: &dyn FaultClassifier,
    features: &FeatureVector,
) -> ModelResult<FaultClassification> {
    let matrix = features.to_matrix();

    let fault_type = classifier
        .predict(matrix.view())?
        .into_iter()
        .next()
        .ok_or_else(|| ModelError::InvalidInput("classifier returned no label".to_string()))?;

    let confidence = match classifier.predict_proba(matrix.view()) {
        Ok(proba) => {
            let best = proba
                .first()
                .and_then(|row| row.iter().copied().reduce(f64::max))
                .ok_or_else(|| ModelError::InvalidInput("classifier returned no probabilities".to_string()))?;
            Confidence::Calibrated(best)
        }
        Err(ModelError::Unsupported(_)) => Confidence::Fallback(FALLBACK_CONFIDENCE),
        Err(e) => return Err(e),
    };

    Ok(FaultClassification {
        fault_type,
        confidence: Some(confidence),
    })
}

/// Classify one anomalous reading, failures become `Unknown`
pub fn classify(classifier: &dyn FaultClassifier, features: &FeatureVector) -> FaultClassification {
    match try_classify(classifier, features) {
        Ok(result) => result,
        Err(e) => {
            log::warn!("Fault classification failed, marking Unknown: {}", e);
            FaultClassification::unknown()
        }
    }
}

/// Second stage of the cascade: non-anomalous readings are OK and the
/// classifier is never called for them
pub fn classify_verdict(
    classifier: &dyn FaultClassifier,
    verdict: &AnomalyVerdict,
    features: &FeatureVector,
) -> FaultClassification {
    if !verdict.is_anomaly {
        return FaultClassification::ok();
    }
    classify(classifier, features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::fault::FaultType;
    use crate::logic::model::AnomalyThreshold;
    use ndarray::ArrayView2;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Always answers `label`, optionally with probabilities
    struct FixedClassifier {
        label: FaultType,
        proba: Option<Vec<f64>>,
        calls: AtomicUsize,
    }

    impl FixedClassifier {
        fn new(label: FaultType, proba: Option<Vec<f64>>) -> Self {
            Self {
                label,
                proba,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl FaultClassifier for FixedClassifier {
        fn fit(&mut self, _data: ArrayView2<'_, f64>, _labels: &[FaultType]) -> ModelResult<()> {
            Ok(())
        }

        fn predict(&self, data: ArrayView2<'_, f64>) -> ModelResult<Vec<FaultType>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![self.label; data.nrows()])
        }

        fn predict_proba(&self, data: ArrayView2<'_, f64>) -> ModelResult<Vec<Vec<f64>>> {
            match &self.proba {
                Some(p) => Ok(vec![p.clone(); data.nrows()]),
                None => Err(ModelError::Unsupported("predict_proba")),
            }
        }

        fn classes(&self) -> &[FaultType] {
            &FaultType::FAULTS
        }

        fn is_fitted(&self) -> bool {
            true
        }
    }

    struct BrokenClassifier;

    impl FaultClassifier for BrokenClassifier {
        fn fit(&mut self, _data: ArrayView2<'_, f64>, _labels: &[FaultType]) -> ModelResult<()> {
            Ok(())
        }

        fn predict(&self, _data: ArrayView2<'_, f64>) -> ModelResult<Vec<FaultType>> {
            Err(ModelError::NotFitted)
        }

        fn classes(&self) -> &[FaultType] {
            &[]
        }

        fn is_fitted(&self) -> bool {
            false
        }
    }

    fn fault_features() -> FeatureVector {
        FeatureVector::from_measurements(190.0, 16.0)
    }

    #[test]
    fn test_calibrated_confidence() {
        let classifier = FixedClassifier::new(FaultType::ShortCircuit, Some(vec![0.8, 0.15, 0.05]));
        let result = try_classify(&classifier, &fault_features()).unwrap();
        assert_eq!(result.fault_type, FaultType::ShortCircuit);
        assert_eq!(result.confidence, Some(Confidence::Calibrated(0.8)));
    }

    #[test]
    fn test_fallback_confidence_without_probabilities() {
        let classifier = FixedClassifier::new(FaultType::Overload, None);
        let result = try_classify(&classifier, &fault_features()).unwrap();
        assert_eq!(result.fault_type, FaultType::Overload);
        assert_eq!(result.confidence, Some(Confidence::Fallback(FALLBACK_CONFIDENCE)));
    }

    #[test]
    fn test_failure_becomes_unknown() {
        let result = classify(&BrokenClassifier, &fault_features());
        assert_eq!(result.fault_type, FaultType::Unknown);
        assert!(!result.confidence.unwrap().is_calibrated());
    }

    #[test]
    fn test_gate_skips_classifier_for_normal_readings() {
        let classifier = FixedClassifier::new(FaultType::LineCut, None);
        let threshold = AnomalyThreshold::default();

        let normal = classify_verdict(&classifier, &threshold.verdict(-0.1), &fault_features());
        assert_eq!(normal, FaultClassification::ok());
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);

        let anomalous = classify_verdict(&classifier, &threshold.verdict(-0.6), &fault_features());
        assert_eq!(anomalous.fault_type, FaultType::LineCut);
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
    }
}
