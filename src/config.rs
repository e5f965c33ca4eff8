//! Top-level configuration.
//!
//! Every section has defaults, so a JSON file only needs the keys it
//! changes:
//!
//! ```json
//! {
//!   "embedding": { "path": "./data/models/180.zip" },
//!   "classifier": { "neighbors": 10 },
//!   "fitting": { "folds": 5, "grid_size": 20 }
//! }
//! ```

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::classifier::RuleClassifierConfig;
use crate::corpus::dataset::DatasetPaths;
use crate::embedding::EmbeddingConfig;
use crate::error::{RemarkaError, Result};
use crate::ml::ModelFittingConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemarkaConfig {
    pub embedding: EmbeddingConfig,
    pub classifier: RuleClassifierConfig,
    pub dataset: DatasetPaths,
    pub fitting: ModelFittingConfig,
}

impl RemarkaConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RemarkaError::not_found(format!("config file {}: {e}", path.display()))
        })?;
        let config = Self::from_json_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
