pub mod assessor;
pub mod classifier;
pub mod error;
pub mod features;
pub mod report;
pub mod rules;

pub use assessor::RiskAssessor;
pub use classifier::{
    file_classifier::FileClassifier, logistic::LogisticModel, Classifier, ClassifierAdapter, Score,
};
pub use error::{InputError, RiskError};
pub use features::{FeatureInput, FeatureVector, Field, PatientRecord, FEATURE_COUNT};
pub use report::{RiskLabel, RiskReport};
pub use rules::{
    evaluate, table::RuleTable, Band, BandMessages, Finding, HealthyRange, RuleSpec,
    RuleValidationError,
};
