use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::InputError;

/// Number of positional fields expected by the classifier.
pub const FEATURE_COUNT: usize = 8;

/// Positional fields of the feature vector. Declaration order is the classifier's input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Pregnancies,
    Glucose,
    BloodPressure,
    SkinThickness,
    Insulin,
    Bmi,
    DiabetesPedigreeFunction,
    Age,
}

impl Field {
    /// All fields in positional order.
    pub const ALL: [Field; FEATURE_COUNT] = [
        Field::Pregnancies,
        Field::Glucose,
        Field::BloodPressure,
        Field::SkinThickness,
        Field::Insulin,
        Field::Bmi,
        Field::DiabetesPedigreeFunction,
        Field::Age,
    ];

    /// Rule-evaluated fields in canonical evaluation order (not positional order).
    pub const MONITORED: [Field; 5] = [
        Field::Glucose,
        Field::BloodPressure,
        Field::Bmi,
        Field::Insulin,
        Field::Age,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn key(self) -> &'static str {
        match self {
            Field::Pregnancies => "pregnancies",
            Field::Glucose => "glucose",
            Field::BloodPressure => "blood_pressure",
            Field::SkinThickness => "skin_thickness",
            Field::Insulin => "insulin",
            Field::Bmi => "bmi",
            Field::DiabetesPedigreeFunction => "diabetes_pedigree_function",
            Field::Age => "age",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Field::Pregnancies => "Pregnancies",
            Field::Glucose => "Glucose",
            Field::BloodPressure => "Blood Pressure",
            Field::SkinThickness => "Skin Thickness",
            Field::Insulin => "Insulin",
            Field::Bmi => "BMI",
            Field::DiabetesPedigreeFunction => "Diabetes Pedigree Function",
            Field::Age => "Age",
        }
    }

    /// Position within [`Field::MONITORED`], or `None` for fields that are only fed to the model.
    pub fn evaluation_rank(self) -> Option<usize> {
        Self::MONITORED.iter().position(|field| *field == self)
    }

    pub fn is_monitored(self) -> bool {
        self.evaluation_rank().is_some()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown feature field `{0}`")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Field::ALL
            .into_iter()
            .find(|field| field.key() == needle)
            .ok_or_else(|| UnknownField(needle.to_string()))
    }
}

/// Validated, fixed-length input to the classifier and the rule evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Build a vector from positional values, rejecting wrong lengths and non-finite numbers.
    pub fn from_slice(values: &[f64]) -> Result<Self, InputError> {
        if values.len() != FEATURE_COUNT {
            return Err(InputError::WrongLength {
                expected: FEATURE_COUNT,
                actual: values.len(),
            });
        }
        let mut out = [0.0; FEATURE_COUNT];
        for (field, (slot, value)) in Field::ALL.iter().zip(out.iter_mut().zip(values)) {
            if !value.is_finite() {
                return Err(InputError::NotFinite {
                    field: field.key().to_string(),
                    value: *value,
                });
            }
            *slot = *value;
        }
        Ok(Self(out))
    }

    /// Parse textual values (CLI arguments, form fields) in positional order.
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> Result<Self, InputError> {
        if raw.len() != FEATURE_COUNT {
            return Err(InputError::WrongLength {
                expected: FEATURE_COUNT,
                actual: raw.len(),
            });
        }
        let mut values = Vec::with_capacity(FEATURE_COUNT);
        for (field, text) in Field::ALL.iter().zip(raw) {
            let text = text.as_ref().trim();
            let value: f64 = text.parse().map_err(|_| InputError::NotNumeric {
                field: field.key().to_string(),
                raw: text.to_string(),
            })?;
            values.push(value);
        }
        Self::from_slice(&values)
    }

    pub fn get(&self, field: Field) -> f64 {
        self.0[field.index()]
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }
}

impl TryFrom<&[f64]> for FeatureVector {
    type Error = InputError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        Self::from_slice(values)
    }
}

/// Named form of the feature vector, as submitted by forms or JSON callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientRecord {
    pub pregnancies: f64,
    pub glucose: f64,
    pub blood_pressure: f64,
    pub skin_thickness: f64,
    pub insulin: f64,
    pub bmi: f64,
    pub diabetes_pedigree_function: f64,
    pub age: f64,
}

impl PatientRecord {
    pub fn to_values(&self) -> [f64; FEATURE_COUNT] {
        [
            self.pregnancies,
            self.glucose,
            self.blood_pressure,
            self.skin_thickness,
            self.insulin,
            self.bmi,
            self.diabetes_pedigree_function,
            self.age,
        ]
    }
}

/// Either accepted serialized shape of caller input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureInput {
    Positional(Vec<f64>),
    Named(PatientRecord),
}

impl FeatureInput {
    pub fn from_json(raw: &str) -> Result<Self, InputError> {
        serde_json::from_str(raw).map_err(|err| InputError::Malformed {
            reason: format!(
                "expected an array of {FEATURE_COUNT} numbers or an object with every feature field ({err})"
            ),
        })
    }

    pub fn into_vector(self) -> Result<FeatureVector, InputError> {
        match self {
            FeatureInput::Positional(values) => FeatureVector::from_slice(&values),
            FeatureInput::Named(record) => FeatureVector::from_slice(&record.to_values()),
        }
    }
}
