use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::Path,
};

use anyhow::{bail, Context, Result};
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use tracing::{debug, trace};

use super::{BandMessages, Finding, HealthyRange, RuleSpec, RuleValidationError};
use crate::features::{FeatureVector, Field};

/// Ordered set of healthy-range rules, at most one per monitored field.
///
/// Rules are kept in canonical evaluation order regardless of how they were supplied.
/// Serializes to the same keyed form [`RuleTable::from_path`] reads.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable {
    rules: Vec<RuleSpec>,
}

impl RuleTable {
    pub fn new(rules: Vec<RuleSpec>) -> Result<Self, RuleValidationError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            rule.validate()?;
            if !seen.insert(rule.field) {
                return Err(RuleValidationError::DuplicateParameter {
                    parameter: rule.field.key().to_string(),
                });
            }
        }
        let mut rules = rules;
        rules.sort_by_key(|rule| rule.field.evaluation_rank());
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[RuleSpec] {
        &self.rules
    }

    pub fn get(&self, field: Field) -> Option<&RuleSpec> {
        self.rules.iter().find(|rule| rule.field == field)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every rule against the vector, in canonical order.
    pub fn evaluate_all(&self, features: &FeatureVector) -> Vec<Finding> {
        self.rules
            .iter()
            .map(|rule| {
                let finding = rule.evaluate(features.get(rule.field));
                trace!(parameter = %rule.field, band = ?finding.band, "rule evaluated");
                finding
            })
            .collect()
    }

    /// Build a table from its configuration form: parameter key to rule entry.
    pub fn from_entries(
        entries: BTreeMap<String, RuleEntry>,
    ) -> Result<Self, RuleValidationError> {
        let mut rules = Vec::with_capacity(entries.len());
        for (key, entry) in entries {
            let field: Field = key
                .parse()
                .map_err(|_| RuleValidationError::UnknownParameter { key: key.clone() })?;
            let name = entry
                .name
                .unwrap_or_else(|| field.display_name().to_string());
            rules.push(RuleSpec::new(field, name, entry.range, entry.messages)?);
        }
        Self::new(rules)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let entries: BTreeMap<String, RuleEntry> =
            serde_yaml::from_str(raw).context("invalid YAML structure in rule table")?;
        Ok(Self::from_entries(entries)?)
    }

    /// Parse a JSON or JSON5 rule table.
    pub fn from_json5_str(raw: &str) -> Result<Self> {
        let entries: BTreeMap<String, RuleEntry> =
            json5::from_str(raw).context("invalid JSON structure in rule table")?;
        Ok(Self::from_entries(entries)?)
    }

    /// Load a rule table, choosing the parser from the file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read rule table at {}", path.display()))?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let table = match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&raw),
            "json" | "json5" => Self::from_json5_str(&raw),
            other => bail!(
                "unsupported rule table extension `{other}` for {} (expected yaml, yml, json or json5)",
                path.display()
            ),
        }
        .with_context(|| format!("failed to load rule table from {}", path.display()))?;
        debug!(path = %path.display(), rules = table.len(), "loaded rule table");
        Ok(table)
    }
}

impl Serialize for RuleTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rules.len()))?;
        for rule in &self.rules {
            map.serialize_entry(rule.field.key(), &RuleEntry::from(rule))?;
        }
        map.end()
    }
}

impl Default for RuleTable {
    /// The five built-in rules for glucose, blood pressure, BMI, insulin and age.
    fn default() -> Self {
        let rules = vec![
            RuleSpec {
                field: Field::Glucose,
                name: "Glucose".into(),
                range: HealthyRange::new(70.0, 140.0),
                messages: BandMessages::new(
                    "You may experience weakness. Increase slow carbs.",
                    "High glucose indicates risk. Avoid sugar-heavy foods.",
                    "Good glucose control.",
                ),
            },
            RuleSpec {
                field: Field::BloodPressure,
                name: "Blood Pressure".into(),
                range: HealthyRange::new(60.0, 80.0),
                messages: BandMessages::new(
                    "May cause dizziness. Increase hydration.",
                    "High BP increases heart and diabetes risk. Reduce salt.",
                    "Blood pressure is stable.",
                ),
            },
            RuleSpec {
                field: Field::Bmi,
                name: "BMI".into(),
                range: HealthyRange::new(18.5, 24.9),
                messages: BandMessages::new(
                    "Underweight. Improve protein intake.",
                    "High BMI indicates overweight. Exercise recommended.",
                    "BMI is ideal.",
                ),
            },
            RuleSpec {
                field: Field::Insulin,
                name: "Insulin".into(),
                range: HealthyRange::new(15.0, 160.0),
                messages: BandMessages::new(
                    "Low insulin levels detected.",
                    "High insulin indicates resistance. Avoid sweets.",
                    "Insulin level is balanced.",
                ),
            },
            RuleSpec {
                field: Field::Age,
                name: "Age".into(),
                range: HealthyRange::new(18.0, 45.0),
                messages: BandMessages::new(
                    "Teenage or young adult. Lower health risks.",
                    "Higher age increases diabetes probability.",
                    "Age in moderate risk zone.",
                ),
            },
        ];
        Self { rules }
    }
}

/// Configuration form of a single rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleEntry {
    /// Defaults to the field's display name.
    #[serde(default)]
    pub name: Option<String>,
    pub range: HealthyRange,
    pub messages: BandMessages,
}

impl From<&RuleSpec> for RuleEntry {
    fn from(rule: &RuleSpec) -> Self {
        Self {
            name: Some(rule.name.clone()),
            range: rule.range,
            messages: rule.messages.clone(),
        }
    }
}
