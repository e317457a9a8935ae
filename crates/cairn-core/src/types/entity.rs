//! Canonical entity records held by the registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityType, Span};

/// Registry-assigned entity identifier. Sequential, starting at 1.
pub type EntityId = u64;

/// A single occurrence of an entity in a source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Identifier of the text the mention came from.
    pub source: String,
    /// The mention text exactly as extracted.
    pub matched_text: String,
    /// Character offsets of the mention within the source text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// When the occurrence was linked.
    pub seen_at: DateTime<Utc>,
}

impl Occurrence {
    /// Create an occurrence stamped with the current time.
    pub fn new(source: impl Into<String>, matched_text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            matched_text: matched_text.into(),
            span: None,
            seen_at: Utc::now(),
        }
    }

    /// Attach the mention span.
    pub fn with_span(mut self, span: Option<Span>) -> Self {
        self.span = span;
        self
    }
}

/// Canonical, deduplicated record for one real-world concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier.
    pub id: EntityId,
    /// Normalized form of the mention that created this entity.
    pub canonical_text: String,
    /// Entity type.
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Distinct surface forms linked to this entity, in first-seen order.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Source of the mention that created this entity.
    pub first_seen_source: String,
    /// Every mention linked to this entity.
    #[serde(default)]
    pub occurrences: Vec<Occurrence>,
}

impl Entity {
    /// Create a new entity with a single alias.
    pub fn new(
        id: EntityId,
        canonical_text: impl Into<String>,
        entity_type: EntityType,
        alias: impl Into<String>,
        first_seen_source: impl Into<String>,
    ) -> Self {
        Self {
            id,
            canonical_text: canonical_text.into(),
            entity_type,
            aliases: vec![alias.into()],
            first_seen_source: first_seen_source.into(),
            occurrences: Vec::new(),
        }
    }

    /// Number of recorded occurrences.
    pub fn count(&self) -> usize {
        self.occurrences.len()
    }

    /// Add an alias. Returns false if the exact text is already present.
    pub fn add_alias(&mut self, alias: impl Into<String>) -> bool {
        let alias = alias.into();
        if self.aliases.iter().any(|a| a == &alias) {
            return false;
        }
        self.aliases.push(alias);
        true
    }

    /// Record an occurrence and track its text as an alias.
    pub fn record(&mut self, occurrence: Occurrence) {
        self.add_alias(occurrence.matched_text.clone());
        self.occurrences.push(occurrence);
    }
}
