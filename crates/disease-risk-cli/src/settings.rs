use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

pub const DEFAULT_MODEL_PATH: &str = "./models/pima-logreg.json";
const ENV_PREFIX: &str = "DISEASE_RISK";

/// Runtime settings, layered as defaults < config file < `DISEASE_RISK_*` environment.
///
/// * `DISEASE_RISK_MODEL_PATH` — classifier artifact (default: `./models/pima-logreg.json`).
/// * `DISEASE_RISK_RULES_PATH` — optional rule table; the built-in table is used when unset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub model_path: PathBuf,
    #[serde(default)]
    pub rules_path: Option<PathBuf>,
}

impl Settings {
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("model_path", DEFAULT_MODEL_PATH)
            .context("failed to set default model path")?;
        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }
        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| match config_file {
                Some(path) => format!("failed to read configuration from {}", path.display()),
                None => "failed to read configuration".to_string(),
            })?;
        config
            .try_deserialize()
            .context("invalid configuration values")
    }

    /// Explicit command-line flags win over every other layer.
    pub fn with_overrides(mut self, model: Option<PathBuf>, rules: Option<PathBuf>) -> Self {
        if let Some(model) = model {
            self.model_path = model;
        }
        if let Some(rules) = rules {
            self.rules_path = Some(rules);
        }
        self
    }
}
