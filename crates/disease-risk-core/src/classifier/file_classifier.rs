use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use tracing::info;

use super::{logistic::LogisticModel, Classifier};
use crate::{error::RiskError, features::FeatureVector};

/// Classifier backed by a JSON model artifact on disk, loaded once on first use.
pub struct FileClassifier {
    path: PathBuf,
    cache: OnceCell<LogisticModel>,
}

impl FileClassifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the cached model, loading it if this is the first successful call.
    ///
    /// Concurrent first callers block on a single load. Failed loads are not cached.
    pub fn model(&self) -> Result<&LogisticModel, RiskError> {
        self.cache
            .get_or_try_init(|| self.load())
            .map_err(|err| {
                RiskError::model_unavailable(self.path.display().to_string(), format!("{err:#}"))
            })
    }

    fn load(&self) -> Result<LogisticModel> {
        let raw = fs::read_to_string(&self.path).with_context(|| {
            format!("failed to read model artifact at {}", self.path.display())
        })?;
        let model: LogisticModel = serde_json::from_str(&raw).with_context(|| {
            format!("invalid JSON structure in model artifact at {}", self.path.display())
        })?;
        model.validate().with_context(|| {
            format!("model artifact at {} failed validation", self.path.display())
        })?;
        info!(
            path = %self.path.display(),
            version = model.model_version.as_deref().unwrap_or("unversioned"),
            "loaded classifier artifact"
        );
        Ok(model)
    }
}

impl Classifier for FileClassifier {
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, RiskError> {
        self.model()?.predict_proba(features)
    }

    fn predict(&self, features: &FeatureVector) -> Result<u8, RiskError> {
        self.model()?.predict(features)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
