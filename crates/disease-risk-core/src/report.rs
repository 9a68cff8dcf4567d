use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{classifier::Score, rules::Finding};

pub const HIGH_RISK_SUMMARY: &str = "Your health parameters show elevated risk factors.";
pub const LOW_RISK_SUMMARY: &str = "Your overall health indicators are within safe range.";

/// Final binary classification surfaced to the caller. Decided by the classifier alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLabel {
    Low,
    High,
}

impl RiskLabel {
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            Self::High
        } else {
            Self::Low
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Self::High => HIGH_RISK_SUMMARY,
            Self::Low => LOW_RISK_SUMMARY,
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => f.write_str("High Risk"),
            Self::Low => f.write_str("Low Risk"),
        }
    }
}

/// Structured result of one assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub risk_label: RiskLabel,
    pub probability_percent: f64,
    pub findings: Vec<Finding>,
    pub summary: String,
}

impl RiskReport {
    /// Assemble a report. Label and summary come from `score`; findings never override them.
    pub fn from_parts(score: Score, findings: Vec<Finding>) -> Self {
        let risk_label = RiskLabel::from_label(score.label);
        Self {
            risk_label,
            probability_percent: probability_percent(score.probability),
            findings,
            summary: risk_label.summary().to_string(),
        }
    }
}

/// Probability as a percentage rounded to two decimals, halves away from zero.
pub fn probability_percent(probability: f64) -> f64 {
    let percent = (probability * 100.0).clamp(0.0, 100.0);
    (percent * 100.0).round() / 100.0
}
