//! Registry persistence.
//!
//! The registry is stored as a single pretty-printed JSON document holding
//! metadata, summary statistics and the ordered entity list. Writes go to a
//! sibling temp file first and are renamed into place.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CairnError, CairnResult};
use crate::linker::LinkStats;
use crate::registry::EntityRegistry;
use crate::types::{Entity, EntityId};

/// Document-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryMetadata {
    pub total_entities: usize,
    pub next_id: EntityId,
    pub saved_at: DateTime<Utc>,
}

/// Summary statistics written alongside the entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryStatistics {
    pub total_entities: usize,
    pub total_occurrences: usize,
    pub entities_by_type: BTreeMap<String, usize>,
    /// Cumulative linking totals across every run that saved this file.
    #[serde(default)]
    pub linking: LinkStats,
    /// Linked share of accepted mentions, in percent.
    #[serde(default)]
    pub link_rate: f64,
}

impl RegistryStatistics {
    /// Compute statistics for a registry.
    pub fn compute(registry: &EntityRegistry, linking: LinkStats) -> Self {
        Self {
            total_entities: registry.len(),
            total_occurrences: registry.iter().map(Entity::count).sum(),
            entities_by_type: registry
                .type_distribution()
                .into_iter()
                .map(|(t, n)| (t.as_str().to_string(), n))
                .collect(),
            linking,
            link_rate: linking.link_rate(),
        }
    }
}

/// The persisted registry file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryDocument {
    pub metadata: RegistryMetadata,
    #[serde(default)]
    pub statistics: RegistryStatistics,
    pub entities: Vec<Entity>,
}

impl RegistryDocument {
    /// Snapshot a registry.
    pub fn from_registry(registry: &EntityRegistry, linking: LinkStats) -> Self {
        Self {
            metadata: RegistryMetadata {
                total_entities: registry.len(),
                next_id: registry.next_id(),
                saved_at: Utc::now(),
            },
            statistics: RegistryStatistics::compute(registry, linking),
            entities: registry.iter().cloned().collect(),
        }
    }

    /// Rebuild the registry, validating its invariants.
    pub fn into_registry(self) -> CairnResult<(EntityRegistry, LinkStats)> {
        let linking = self.statistics.linking;
        let registry = EntityRegistry::from_entities(self.entities, self.metadata.next_id)?;
        Ok((registry, linking))
    }
}

/// File-backed registry store.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    /// Create a store for the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the registry file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the registry file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the registry and its cumulative linking totals.
    pub fn load(&self) -> CairnResult<(EntityRegistry, LinkStats)> {
        let content = std::fs::read_to_string(&self.path)?;
        let document: RegistryDocument = serde_json::from_str(&content).map_err(|e| {
            CairnError::corrupt(format!("{}: {}", self.path.display(), e))
        })?;
        let (registry, linking) = document.into_registry()?;

        tracing::info!(
            path = %self.path.display(),
            entities = registry.len(),
            "Loaded entity registry"
        );
        Ok((registry, linking))
    }

    /// Load the registry, or start empty if the file does not exist yet.
    pub fn load_or_default(&self) -> CairnResult<(EntityRegistry, LinkStats)> {
        if !self.exists() {
            tracing::info!(path = %self.path.display(), "No registry file, starting empty");
            return Ok((EntityRegistry::new(), LinkStats::default()));
        }
        self.load()
    }

    /// Persist the registry.
    pub fn save(&self, registry: &EntityRegistry, linking: LinkStats) -> CairnResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let document = RegistryDocument::from_registry(registry, linking);
        let json = serde_json::to_string_pretty(&document)?;

        let tmp = self.temp_path();
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        tracing::info!(
            path = %self.path.display(),
            entities = registry.len(),
            "Saved entity registry"
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
