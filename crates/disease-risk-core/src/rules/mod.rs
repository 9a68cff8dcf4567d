use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::Field;

pub mod table;

/// Which side of the healthy range a value falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Below,
    Within,
    Above,
}

impl Band {
    fn lead(self) -> &'static str {
        match self {
            Band::Below => "is low.",
            Band::Within => "is in a healthy range.",
            Band::Above => "is high.",
        }
    }
}

/// Closed healthy band `[low, high]`. Infinite bounds express a one-sided band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct HealthyRange {
    pub low: f64,
    pub high: f64,
}

impl HealthyRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Strict comparisons: both bounds belong to the healthy band.
    pub fn classify(&self, value: f64) -> Band {
        if value < self.low {
            Band::Below
        } else if value > self.high {
            Band::Above
        } else {
            Band::Within
        }
    }
}

impl From<(f64, f64)> for HealthyRange {
    fn from((low, high): (f64, f64)) -> Self {
        Self { low, high }
    }
}

impl From<HealthyRange> for (f64, f64) {
    fn from(range: HealthyRange) -> Self {
        (range.low, range.high)
    }
}

/// Guidance text for each band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandMessages {
    pub below: String,
    pub above: String,
    pub within: String,
}

impl BandMessages {
    pub fn new(
        below: impl Into<String>,
        above: impl Into<String>,
        within: impl Into<String>,
    ) -> Self {
        Self {
            below: below.into(),
            above: above.into(),
            within: within.into(),
        }
    }

    pub fn for_band(&self, band: Band) -> &str {
        match band {
            Band::Below => &self.below,
            Band::Within => &self.within,
            Band::Above => &self.above,
        }
    }
}

/// Healthy-range rule for one monitored field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub field: Field,
    /// Label used in finding text.
    pub name: String,
    pub range: HealthyRange,
    pub messages: BandMessages,
}

impl RuleSpec {
    /// Construct a rule, validating invariants before returning.
    pub fn new(
        field: Field,
        name: impl Into<String>,
        range: HealthyRange,
        messages: BandMessages,
    ) -> Result<Self, RuleValidationError> {
        let rule = Self {
            field,
            name: name.into(),
            range,
            messages,
        };
        rule.validate()?;
        Ok(rule)
    }

    pub fn validate(&self) -> Result<(), RuleValidationError> {
        let parameter = self.field.key().to_string();
        if !self.field.is_monitored() {
            return Err(RuleValidationError::UnmonitoredParameter { parameter });
        }
        if self.name.trim().is_empty() {
            return Err(RuleValidationError::EmptyName { parameter });
        }
        let HealthyRange { low, high } = self.range;
        if low.is_nan() || high.is_nan() || low > high {
            return Err(RuleValidationError::InvalidRange {
                parameter,
                low,
                high,
            });
        }
        for band in [Band::Below, Band::Within, Band::Above] {
            if self.messages.for_band(band).trim().is_empty() {
                return Err(RuleValidationError::EmptyMessage { parameter, band });
            }
        }
        Ok(())
    }

    pub fn evaluate(&self, value: f64) -> Finding {
        evaluate(&self.name, value, self.range, &self.messages)
    }
}

/// Classify `value` against `range` and attach the matching guidance.
///
/// Total over every value: anything not strictly below `low` or strictly above `high` is within.
pub fn evaluate(name: &str, value: f64, range: HealthyRange, messages: &BandMessages) -> Finding {
    let band = range.classify(value);
    Finding {
        parameter: name.to_string(),
        band,
        message: format!("{name} {} {}", band.lead(), messages.for_band(band)),
    }
}

/// Evaluated rule for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub parameter: String,
    pub band: Band,
    pub message: String,
}

/// Errors emitted while validating rule definitions.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleValidationError {
    #[error("unknown parameter `{key}`")]
    UnknownParameter { key: String },
    #[error("parameter `{parameter}` is not rule-evaluated")]
    UnmonitoredParameter { parameter: String },
    #[error("parameter `{parameter}` is defined more than once")]
    DuplicateParameter { parameter: String },
    #[error("rule `{parameter}` name must not be blank")]
    EmptyName { parameter: String },
    #[error("rule `{parameter}` range must satisfy low <= high (got [{low}, {high}])")]
    InvalidRange {
        parameter: String,
        low: f64,
        high: f64,
    },
    #[error("rule `{parameter}` {band:?} message must not be blank")]
    EmptyMessage { parameter: String, band: Band },
}
