use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the assessment pipeline.
///
/// A report is never produced alongside one of these; callers must treat them as distinct from a
/// low-risk result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RiskError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
    #[error("classifier model unavailable ({location}): {reason}")]
    ModelUnavailable { location: String, reason: String },
}

impl RiskError {
    pub fn model_unavailable(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

/// Shape and value problems with a caller-supplied feature vector.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputError {
    #[error("expected exactly {expected} values, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("value `{raw}` for `{field}` is not numeric")]
    NotNumeric { field: String, raw: String },
    #[error("value for `{field}` must be finite (got {value})")]
    NotFinite { field: String, value: f64 },
    #[error("malformed input: {reason}")]
    Malformed { reason: String },
    #[error("values are too extreme to score: {model} decision value is undefined")]
    Unscorable { model: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_convert_into_invalid_input() {
        let err: RiskError = InputError::WrongLength {
            expected: 8,
            actual: 3,
        }
        .into();
        assert!(matches!(err, RiskError::InvalidInput(_)));
        assert_eq!(
            err.to_string(),
            "invalid input: expected exactly 8 values, got 3"
        );
    }

    #[test]
    fn model_unavailable_mentions_location() {
        let err = RiskError::model_unavailable("models/missing.json", "file not found");
        assert!(err.to_string().contains("models/missing.json"));
        assert!(err.to_string().contains("file not found"));
    }
}
