use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Classifier;
use crate::{
    error::{InputError, RiskError},
    features::{FeatureVector, Field, FEATURE_COUNT},
};

/// Artifact format revision understood by this crate.
pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

fn default_threshold() -> f64 {
    0.5
}

/// Per-feature standardization applied before the linear term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Persisted binary logistic-regression classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub format_version: u32,
    #[serde(default)]
    pub model_version: Option<String>,
    /// Must list the feature keys in positional order.
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    /// Probabilities strictly above this value are labelled positive.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl LogisticModel {
    /// Validate artifact invariants before the model is used for scoring.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(ModelValidationError::UnsupportedFormat {
                found: self.format_version,
                supported: SUPPORTED_FORMAT_VERSION,
            });
        }
        if self.feature_names.len() != FEATURE_COUNT
            || self
                .feature_names
                .iter()
                .zip(Field::ALL)
                .any(|(name, field)| name.as_str() != field.key())
        {
            return Err(ModelValidationError::FeatureMismatch {
                found: self.feature_names.clone(),
            });
        }
        check_len("coefficients", self.coefficients.len())?;
        check_finite("coefficients", &self.coefficients)?;
        if !self.intercept.is_finite() {
            return Err(ModelValidationError::NonFinite { name: "intercept" });
        }
        if let Some(scaler) = &self.scaler {
            check_len("scaler.mean", scaler.mean.len())?;
            check_len("scaler.scale", scaler.scale.len())?;
            check_finite("scaler.mean", &scaler.mean)?;
            check_finite("scaler.scale", &scaler.scale)?;
            if let Some(idx) = scaler.scale.iter().position(|scale| *scale == 0.0) {
                return Err(ModelValidationError::ZeroScale {
                    feature: Field::ALL[idx].key().to_string(),
                });
            }
        }
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(ModelValidationError::InvalidThreshold {
                threshold: self.threshold,
            });
        }
        Ok(())
    }

    /// Linear decision value before the logistic link.
    pub fn decision_value(&self, features: &FeatureVector) -> f64 {
        let values = features.as_array();
        let mut z = self.intercept;
        for (idx, coefficient) in self.coefficients.iter().enumerate() {
            let x = match &self.scaler {
                Some(scaler) => (values[idx] - scaler.mean[idx]) / scaler.scale[idx],
                None => values[idx],
            };
            z += coefficient * x;
        }
        z
    }

    /// Decision value, rejecting inputs whose opposing terms overflow to NaN.
    pub fn checked_decision_value(&self, features: &FeatureVector) -> Result<f64, InputError> {
        let z = self.decision_value(features);
        if z.is_nan() {
            return Err(InputError::Unscorable {
                model: self.describe(),
            });
        }
        Ok(z)
    }

    pub fn probability(&self, features: &FeatureVector) -> f64 {
        sigmoid(self.decision_value(features))
    }

    pub fn label(&self, features: &FeatureVector) -> u8 {
        u8::from(self.probability(features) > self.threshold)
    }
}

impl Classifier for LogisticModel {
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, RiskError> {
        Ok(sigmoid(self.checked_decision_value(features)?))
    }

    fn predict(&self, features: &FeatureVector) -> Result<u8, RiskError> {
        let probability = sigmoid(self.checked_decision_value(features)?);
        Ok(u8::from(probability > self.threshold))
    }

    fn describe(&self) -> String {
        match &self.model_version {
            Some(version) => format!("logistic model {version}"),
            None => "logistic model".to_string(),
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn check_len(name: &'static str, len: usize) -> Result<(), ModelValidationError> {
    if len != FEATURE_COUNT {
        return Err(ModelValidationError::WrongLength {
            name,
            expected: FEATURE_COUNT,
            actual: len,
        });
    }
    Ok(())
}

fn check_finite(name: &'static str, values: &[f64]) -> Result<(), ModelValidationError> {
    if values.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(ModelValidationError::NonFinite { name })
    }
}

/// Reasons a persisted model artifact is rejected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelValidationError {
    #[error("unsupported artifact format version {found} (supported: {supported})")]
    UnsupportedFormat { found: u32, supported: u32 },
    #[error("feature names {found:?} do not match the expected positional fields")]
    FeatureMismatch { found: Vec<String> },
    #[error("`{name}` must have {expected} entries (got {actual})")]
    WrongLength {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("`{name}` contains non-finite values")]
    NonFinite { name: &'static str },
    #[error("scaler scale for `{feature}` is zero")]
    ZeroScale { feature: String },
    #[error("threshold must be within (0.0, 1.0) (got {threshold})")]
    InvalidThreshold { threshold: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        Field::ALL.iter().map(|field| field.key().to_string()).collect()
    }

    fn glucose_only(intercept: f64) -> LogisticModel {
        LogisticModel {
            format_version: 1,
            model_version: Some("test".into()),
            feature_names: names(),
            coefficients: vec![0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            intercept,
            scaler: Some(StandardScaler {
                mean: vec![0.0, 120.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                scale: vec![1.0, 30.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
            }),
            threshold: 0.5,
        }
    }

    fn vector(glucose: f64) -> FeatureVector {
        FeatureVector::from_slice(&[1.0, glucose, 70.0, 20.0, 80.0, 30.0, 0.4, 30.0]).unwrap()
    }

    #[test]
    fn probability_is_half_at_mean() {
        let model = glucose_only(0.0);
        assert!((model.probability(&vector(120.0)) - 0.5).abs() < 1e-12);
        assert_eq!(model.label(&vector(120.0)), 0, "threshold comparison is strict");
    }

    #[test]
    fn probability_increases_with_glucose() {
        let model = glucose_only(0.0);
        let low = model.probability(&vector(90.0));
        let high = model.probability(&vector(180.0));
        assert!(low < 0.5 && high > 0.5);
        assert_eq!(model.label(&vector(180.0)), 1);
        // (180 - 120) / 30 = 2
        assert!((high - 1.0 / (1.0 + (-2.0f64).exp())).abs() < 1e-12);
    }

    #[test]
    fn sigmoid_is_stable_for_large_magnitudes() {
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert_eq!(sigmoid(1000.0), 1.0);
    }

    #[test]
    fn opposing_overflow_is_reported_as_invalid_input() {
        let mut model = glucose_only(0.0);
        model.coefficients = vec![0.0, 2.0, -2.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        model.scaler = None;
        let extreme =
            FeatureVector::from_slice(&[1.0, f64::MAX, f64::MAX, 0.0, 0.0, 0.0, 0.0, 0.0])
                .unwrap();
        assert!(model.decision_value(&extreme).is_nan());

        let err = model.predict_proba(&extreme).unwrap_err();
        assert!(matches!(
            err,
            RiskError::InvalidInput(InputError::Unscorable { .. })
        ));
        assert!(err.to_string().contains("logistic model test"));
        assert!(model.predict(&extreme).is_err());

        // a single saturated term still scores
        let saturated =
            FeatureVector::from_slice(&[1.0, f64::MAX, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        assert_eq!(model.predict_proba(&saturated).unwrap(), 1.0);
        assert_eq!(model.predict(&saturated).unwrap(), 1);
    }

    #[test]
    fn rejects_reordered_feature_names() {
        let mut model = glucose_only(0.0);
        model.feature_names.swap(0, 1);
        assert!(matches!(
            model.validate(),
            Err(ModelValidationError::FeatureMismatch { .. })
        ));
    }

    #[test]
    fn rejects_zero_scale_and_bad_threshold() {
        let mut model = glucose_only(0.0);
        if let Some(scaler) = model.scaler.as_mut() {
            scaler.scale[5] = 0.0;
        }
        assert_eq!(
            model.validate(),
            Err(ModelValidationError::ZeroScale {
                feature: "bmi".into()
            })
        );

        let mut model = glucose_only(0.0);
        model.threshold = 1.0;
        assert!(matches!(
            model.validate(),
            Err(ModelValidationError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn rejects_short_coefficients() {
        let mut model = glucose_only(0.0);
        model.coefficients.pop();
        assert!(matches!(
            model.validate(),
            Err(ModelValidationError::WrongLength {
                name: "coefficients",
                actual: 7,
                ..
            })
        ));
    }

    #[test]
    fn threshold_defaults_when_absent() {
        let raw = serde_json::json!({
            "format_version": 1,
            "feature_names": names(),
            "coefficients": [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            "intercept": 0.0
        });
        let model: LogisticModel = serde_json::from_value(raw).unwrap();
        assert!((model.threshold - 0.5).abs() < f64::EPSILON);
        assert!(model.scaler.is_none());
        model.validate().unwrap();
    }
}
