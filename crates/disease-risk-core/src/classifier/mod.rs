use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{error::RiskError, features::FeatureVector};

pub mod file_classifier;
pub mod logistic;

/// Externally trained binary classifier over the positional feature vector.
///
/// Implementations only need the two queries a persisted model exposes; thresholding is the
/// model's own business.
pub trait Classifier: Send + Sync {
    /// Estimated probability of the positive ("high risk") class.
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, RiskError>;

    /// Thresholded class decision, `0` or `1`.
    fn predict(&self, features: &FeatureVector) -> Result<u8, RiskError>;

    /// Identifies the backing model in errors and logs.
    fn describe(&self) -> String {
        "classifier".to_string()
    }
}

/// Classifier output after contract checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub label: u8,
    pub probability: f64,
}

impl Score {
    pub fn is_positive(&self) -> bool {
        self.label == 1
    }
}

/// Stable scoring interface over an arbitrary [`Classifier`].
pub struct ClassifierAdapter<C: ?Sized> {
    inner: Arc<C>,
}

impl<C: ?Sized> Clone for ClassifierAdapter<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Classifier + ?Sized> ClassifierAdapter<C> {
    pub fn new(inner: Arc<C>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Arc<C> {
        &self.inner
    }

    /// Query the wrapped model for its label and positive-class probability.
    ///
    /// The label is taken as-is; it is never re-derived from the probability.
    pub fn score(&self, features: &FeatureVector) -> Result<Score, RiskError> {
        let probability = self.inner.predict_proba(features)?;
        let label = self.inner.predict(features)?;

        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(RiskError::model_unavailable(
                self.inner.describe(),
                format!("model returned probability {probability} outside 0.0..=1.0"),
            ));
        }
        if label > 1 {
            return Err(RiskError::model_unavailable(
                self.inner.describe(),
                format!("model returned label {label}, expected 0 or 1"),
            ));
        }
        trace!(label, probability, "classifier scored input");
        Ok(Score { label, probability })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        label: u8,
        probability: f64,
    }

    impl Classifier for Fixed {
        fn predict_proba(&self, _features: &FeatureVector) -> Result<f64, RiskError> {
            Ok(self.probability)
        }

        fn predict(&self, _features: &FeatureVector) -> Result<u8, RiskError> {
            Ok(self.label)
        }
    }

    fn sample() -> FeatureVector {
        FeatureVector::from_slice(&[1.0, 90.0, 72.0, 20.0, 85.0, 22.0, 0.5, 25.0]).unwrap()
    }

    #[test]
    fn label_is_not_rederived_from_probability() {
        let adapter = ClassifierAdapter::new(Arc::new(Fixed {
            label: 1,
            probability: 0.3,
        }));
        let score = adapter.score(&sample()).unwrap();
        assert_eq!(score.label, 1);
        assert!((score.probability - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_probability_out_of_range() {
        let adapter = ClassifierAdapter::new(Arc::new(Fixed {
            label: 0,
            probability: 1.2,
        }));
        let err = adapter.score(&sample()).unwrap_err();
        assert!(matches!(err, RiskError::ModelUnavailable { .. }));
    }

    #[test]
    fn rejects_non_binary_label() {
        let adapter = ClassifierAdapter::new(Arc::new(Fixed {
            label: 2,
            probability: 0.5,
        }));
        let err = adapter.score(&sample()).unwrap_err();
        assert!(err.to_string().contains("label 2"));
    }

    #[test]
    fn works_through_trait_objects() {
        let inner: Arc<dyn Classifier> = Arc::new(Fixed {
            label: 0,
            probability: 0.1,
        });
        let adapter = ClassifierAdapter::new(inner);
        assert!(!adapter.score(&sample()).unwrap().is_positive());
    }
}
