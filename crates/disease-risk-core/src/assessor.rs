use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    classifier::{Classifier, ClassifierAdapter},
    error::RiskError,
    features::FeatureVector,
    report::RiskReport,
    rules::table::RuleTable,
};

/// Fuses classifier output and rule findings into a [`RiskReport`].
///
/// Holds no per-call state; the classifier is shared read-only.
pub struct RiskAssessor<C: Classifier + ?Sized> {
    classifier: ClassifierAdapter<C>,
    rules: RuleTable,
}

impl<C: Classifier + ?Sized> RiskAssessor<C> {
    pub fn new(classifier: Arc<C>) -> Self {
        Self::with_rules(classifier, RuleTable::default())
    }

    pub fn with_rules(classifier: Arc<C>, rules: RuleTable) -> Self {
        Self {
            classifier: ClassifierAdapter::new(classifier),
            rules,
        }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Validate raw positional values and build a report from them.
    pub fn build_report(&self, values: &[f64]) -> Result<RiskReport, RiskError> {
        let features = FeatureVector::from_slice(values)?;
        self.build_report_for(&features)
    }

    /// Score first, then evaluate rules: a classifier failure aborts before any finding exists.
    #[instrument(name = "build_report", skip_all)]
    pub fn build_report_for(&self, features: &FeatureVector) -> Result<RiskReport, RiskError> {
        let score = self.classifier.score(features)?;
        let findings = self.rules.evaluate_all(features);
        let report = RiskReport::from_parts(score, findings);
        debug!(
            risk_label = ?report.risk_label,
            probability_percent = report.probability_percent,
            findings = report.findings.len(),
            "report assembled"
        );
        Ok(report)
    }
}
