//! Direction classification from window features.
//!
//! Maps `(altitude_rate, pressure_rate)` to a [`Direction`] using an
//! externally supplied model. The model handle is fetched lazily from
//! the provider on first use and cached for the life of the classifier.
//! Classification never raises to callers: every internal failure is
//! logged and collapses to [`Direction::Idle`].

pub mod centroid;
pub mod model;

// Re-export commonly used types
pub use centroid::{CentroidClass, CentroidModel};
pub use model::{ClassifierModel, FileModelProvider, ModelError, ModelProvider, StaticModelProvider};

use crate::core::features::FeatureVector;
use crate::event::Direction;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Internal classification failures; all collapse to `Idle` at the
/// public boundary.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("model '{0}' unavailable from provider")]
    ModelUnavailable(String),
    #[error("feature vector contains non-finite values")]
    NonFiniteFeatures,
    #[error("model returned unknown class index {0}")]
    UnknownClass(usize),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Stateless-per-call direction classifier with a cached model handle.
pub struct DirectionClassifier {
    provider: Box<dyn ModelProvider>,
    model_name: String,
    model: Option<Arc<dyn ClassifierModel>>,
}

impl DirectionClassifier {
    pub fn new(provider: Box<dyn ModelProvider>, model_name: impl Into<String>) -> Self {
        Self {
            provider,
            model_name: model_name.into(),
            model: None,
        }
    }

    /// Classify a feature vector. Total over its inputs: any internal
    /// failure is logged and the default `Idle` is returned instead.
    pub fn classify(&mut self, features: FeatureVector) -> Direction {
        match self.try_classify(features) {
            Ok(direction) => direction,
            Err(e) => {
                warn!(error = %e, "classification failed, defaulting to idle");
                Direction::Idle
            }
        }
    }

    fn try_classify(&mut self, features: FeatureVector) -> Result<Direction, ClassifyError> {
        if !features.is_finite() {
            return Err(ClassifyError::NonFiniteFeatures);
        }
        let model = self.model()?;
        let index = model.classify(&features.as_array())?;
        let direction = Direction::from_index(index).ok_or(ClassifyError::UnknownClass(index))?;
        debug!(
            altitude_rate = features.altitude_rate,
            pressure_rate = features.pressure_rate,
            direction = %direction,
            "classified window"
        );
        Ok(direction)
    }

    /// The cached model handle, fetching it from the provider on first
    /// use. After one successful fetch the provider is never consulted
    /// again for the life of this classifier.
    fn model(&mut self) -> Result<Arc<dyn ClassifierModel>, ClassifyError> {
        if let Some(model) = &self.model {
            return Ok(model.clone());
        }
        let model = self
            .provider
            .get_model(&self.model_name)
            .ok_or_else(|| ClassifyError::ModelUnavailable(self.model_name.clone()))?;
        self.model = Some(model.clone());
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::features::CLASS_LABELS;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider that counts fetches, optionally refusing them all.
    struct CountingProvider {
        calls: Arc<AtomicUsize>,
        available: bool,
    }

    impl ModelProvider for CountingProvider {
        fn get_model(&self, _name: &str) -> Option<Arc<dyn ClassifierModel>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.available {
                Some(Arc::new(CentroidModel::builtin()))
            } else {
                None
            }
        }
    }

    #[test]
    fn test_direction_ordinals_match_class_labels() {
        for (index, label) in CLASS_LABELS.iter().enumerate() {
            let direction = Direction::from_index(index).unwrap();
            assert_eq!(direction.as_str(), *label);
            assert_eq!(direction.index(), index);
        }
    }

    #[test]
    fn test_classify_is_pure_for_fixed_model() {
        let mut classifier =
            DirectionClassifier::new(Box::new(StaticModelProvider::builtin()), "indoor-direction");
        let features = FeatureVector::new(0.4, -0.04);
        let first = classifier.classify(features);
        let second = classifier.classify(features);
        assert_eq!(first, second);
        assert_eq!(first, Direction::Up);
    }

    #[test]
    fn test_missing_model_defaults_to_idle() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut classifier = DirectionClassifier::new(
            Box::new(CountingProvider {
                calls: calls.clone(),
                available: false,
            }),
            "indoor-direction",
        );
        assert_eq!(classifier.classify(FeatureVector::new(1.0, -0.1)), Direction::Idle);
        // An unavailable model is retried on the next trigger.
        assert_eq!(classifier.classify(FeatureVector::new(1.0, -0.1)), Direction::Idle);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_provider_consulted_once_after_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut classifier = DirectionClassifier::new(
            Box::new(CountingProvider {
                calls: calls.clone(),
                available: true,
            }),
            "indoor-direction",
        );
        classifier.classify(FeatureVector::new(0.0, 0.0));
        classifier.classify(FeatureVector::new(0.3, -0.03));
        classifier.classify(FeatureVector::new(-0.3, 0.03));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_non_finite_features_default_to_idle() {
        let mut classifier =
            DirectionClassifier::new(Box::new(StaticModelProvider::builtin()), "indoor-direction");
        assert_eq!(
            classifier.classify(FeatureVector::new(f64::NAN, 0.0)),
            Direction::Idle
        );
    }

    #[test]
    fn test_unknown_class_index_defaults_to_idle() {
        struct OutOfRangeModel;
        impl ClassifierModel for OutOfRangeModel {
            fn classify(&self, _features: &[f64; 2]) -> Result<usize, ModelError> {
                Ok(7)
            }
        }
        let mut classifier = DirectionClassifier::new(
            Box::new(StaticModelProvider::new(Arc::new(OutOfRangeModel))),
            "indoor-direction",
        );
        assert_eq!(classifier.classify(FeatureVector::new(0.0, 0.0)), Direction::Idle);
    }
}
