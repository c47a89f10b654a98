//! CLI configuration file

use edm_core::EdmConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

/// Settings read from `--config`; absent keys keep the registry defaults
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,
    pub max_inheritance_depth: Option<usize>,
    pub bulk_load_containers: Option<bool>,
}

impl CliConfig {
    /// Read a YAML or JSON config, chosen by extension
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let invalid = |message: String| ConfigError::Invalid {
            path: path.to_path_buf(),
            message,
        };

        let mut config: Self = if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?
        } else {
            serde_yaml::from_str(&content).map_err(|e| invalid(e.to_string()))?
        };
        if config.max_inheritance_depth == Some(0) {
            return Err(invalid("max_inheritance_depth must be positive".to_string()));
        }

        // Relative search paths are relative to the config file
        if let Some(dir) = path.parent() {
            for search_path in &mut config.search_paths {
                if search_path.is_relative() {
                    *search_path = dir.join(&*search_path);
                }
            }
        }
        Ok(config)
    }

    pub fn edm_config(&self) -> EdmConfig {
        let mut config = EdmConfig::default();
        if let Some(depth) = self.max_inheritance_depth {
            config = config.with_max_inheritance_depth(depth);
        }
        if let Some(bulk) = self.bulk_load_containers {
            config = config.with_bulk_load_containers(bulk);
        }
        config
    }
}
