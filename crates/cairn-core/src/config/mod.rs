//! Configuration system for cairn.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CairnError, CairnResult};

/// Default fuzzy-match acceptance threshold.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Default number of entities rendered into an extraction context block.
pub const DEFAULT_CONTEXT_LIMIT: usize = 50;

/// Main cairn configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CairnConfig {
    /// Minimum similarity for a mention to link to an existing entity.
    pub similarity_threshold: f64,
    /// Also compare mentions against entity aliases, not only canonical text.
    pub match_aliases: bool,
    /// Where the registry is persisted.
    pub registry_path: PathBuf,
    /// Maximum entities rendered by the context renderer.
    pub context_limit: usize,
}

impl Default for CairnConfig {
    fn default() -> Self {
        let cairn_dir = dirs::home_dir()
            .map(|h| h.join(".cairn"))
            .unwrap_or_else(|| PathBuf::from(".cairn"));

        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            match_aliases: false,
            registry_path: cairn_dir.join("registry.json"),
            context_limit: DEFAULT_CONTEXT_LIMIT,
        }
    }
}

impl CairnConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> CairnResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        let config: Self = match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| CairnError::Configuration(e.to_string()))?
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| CairnError::Configuration(e.to_string()))?,
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| CairnError::Configuration(e.to_string()))?,
            _ => {
                return Err(CairnError::Configuration(
                    "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables over the defaults.
    pub fn from_env() -> CairnResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from `CAIRN_*` environment variables.
    pub fn apply_env(&mut self) -> CairnResult<()> {
        if let Ok(value) = std::env::var("CAIRN_SIMILARITY_THRESHOLD") {
            self.similarity_threshold = value.parse().map_err(|_| {
                CairnError::Configuration(format!(
                    "CAIRN_SIMILARITY_THRESHOLD is not a number: {}",
                    value
                ))
            })?;
        }
        if let Ok(value) = std::env::var("CAIRN_MATCH_ALIASES") {
            self.match_aliases = matches!(value.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Ok(value) = std::env::var("CAIRN_REGISTRY") {
            self.registry_path = PathBuf::from(value);
        }
        if let Ok(value) = std::env::var("CAIRN_CONTEXT_LIMIT") {
            self.context_limit = value.parse().map_err(|_| {
                CairnError::Configuration(format!("CAIRN_CONTEXT_LIMIT is not a count: {}", value))
            })?;
        }
        self.validate()
    }

    /// Set the similarity threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Set the registry path.
    pub fn with_registry_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.registry_path = path.into();
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> CairnResult<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(CairnError::Configuration(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}
