//! Mention linking.
//!
//! Each mention moves through a fixed sequence: it is normalized, matched
//! against same-type registry entities, and then either linked to the best
//! match (score at or above the threshold) or inserted as a new entity.
//! Malformed mentions are rejected individually; a batch never fails as a
//! whole because of one bad record.

use serde::{Deserialize, Serialize};

use crate::config::CairnConfig;
use crate::error::{CairnError, CairnResult};
use crate::matcher::FuzzyMatcher;
use crate::normalize::normalize;
use crate::registry::EntityRegistry;
use crate::types::{EntityId, EntityType, Mention, MentionRecord, Occurrence};

/// How a mention was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkOutcome {
    /// Linked to an existing entity.
    Linked,
    /// Inserted as a new entity.
    Inserted,
}

/// Resolution of one accepted mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Position of the mention in the input batch.
    pub index: usize,
    /// Mention text as extracted.
    pub text: String,
    /// Mention type.
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Entity the mention resolved to.
    pub entity_id: EntityId,
    /// Canonical text of that entity.
    pub canonical: String,
    /// Best fuzzy score seen, if any same-type candidate existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub outcome: LinkOutcome,
}

impl Resolution {
    pub fn is_new(&self) -> bool {
        self.outcome == LinkOutcome::Inserted
    }
}

/// A mention that could not be linked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub index: usize,
    pub text: String,
    pub label: String,
    /// Structured error code, e.g. `VAL_001`.
    pub code: String,
    pub message: String,
}

/// Outcome of linking one batch of mentions from a single source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkReport {
    pub source: String,
    pub resolutions: Vec<Resolution>,
    pub rejections: Vec<Rejection>,
    pub new_count: usize,
    pub linked_count: usize,
}

impl LinkReport {
    /// Entity id for the mention at `index`, if it was accepted.
    pub fn entity_for(&self, index: usize) -> Option<EntityId> {
        self.resolutions
            .iter()
            .find(|r| r.index == index)
            .map(|r| r.entity_id)
    }

    /// Number of input records processed.
    pub fn total(&self) -> usize {
        self.resolutions.len() + self.rejections.len()
    }
}

/// Running totals across every mention a linker has processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkStats {
    pub total_extractions: u64,
    pub new_entities: u64,
    pub linked_entities: u64,
    pub rejected: u64,
}

impl LinkStats {
    /// Share of accepted mentions that linked to an existing entity, in percent.
    pub fn link_rate(&self) -> f64 {
        let accepted = self.new_entities + self.linked_entities;
        if accepted == 0 {
            return 0.0;
        }
        self.linked_entities as f64 / accepted as f64 * 100.0
    }

    /// Merge another set of totals into this one.
    pub fn absorb(&mut self, other: &LinkStats) {
        self.total_extractions += other.total_extractions;
        self.new_entities += other.new_entities;
        self.linked_entities += other.linked_entities;
        self.rejected += other.rejected;
    }
}

/// Links mentions into an [`EntityRegistry`].
#[derive(Debug, Clone)]
pub struct Linker {
    matcher: FuzzyMatcher,
    stats: LinkStats,
}

impl Default for Linker {
    fn default() -> Self {
        Self::new(&CairnConfig::default())
    }
}

impl Linker {
    /// Create a linker from configuration.
    pub fn new(config: &CairnConfig) -> Self {
        Self::with_matcher(FuzzyMatcher::new(config))
    }

    /// Create a linker around an explicit matcher.
    pub fn with_matcher(matcher: FuzzyMatcher) -> Self {
        Self {
            matcher,
            stats: LinkStats::default(),
        }
    }

    /// Totals so far.
    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    /// Link one typed mention.
    pub fn link(
        &mut self,
        registry: &mut EntityRegistry,
        mention: &Mention,
        source: &str,
    ) -> CairnResult<Resolution> {
        self.stats.total_extractions += 1;
        let result = self.resolve(registry, mention, source, 0);
        if let Err(err) = &result {
            self.reject(source, 0, &mention.text, err);
        }
        result
    }

    /// Link a batch of untyped records from one source.
    ///
    /// Records are processed in order, so a mention can link to an entity
    /// inserted earlier in the same batch.
    pub fn link_batch<I>(
        &mut self,
        registry: &mut EntityRegistry,
        records: I,
        source: &str,
    ) -> LinkReport
    where
        I: IntoIterator<Item = MentionRecord>,
    {
        let mut report = LinkReport {
            source: source.to_string(),
            ..Default::default()
        };

        for (index, record) in records.into_iter().enumerate() {
            self.stats.total_extractions += 1;

            let resolved = record
                .to_mention()
                .and_then(|mention| self.resolve(registry, &mention, source, index));

            match resolved {
                Ok(resolution) => {
                    if resolution.is_new() {
                        report.new_count += 1;
                    } else {
                        report.linked_count += 1;
                    }
                    report.resolutions.push(resolution);
                }
                Err(err) => {
                    self.reject(source, index, &record.text, &err);
                    report.rejections.push(Rejection {
                        index,
                        text: record.text,
                        label: record.label,
                        code: err.code().as_str().to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            source,
            new = report.new_count,
            linked = report.linked_count,
            rejected = report.rejections.len(),
            registry_size = registry.len(),
            "Linked batch"
        );
        report
    }

    /// Count and log a mention that could not be linked.
    fn reject(&mut self, source: &str, index: usize, text: &str, err: &CairnError) {
        self.stats.rejected += 1;
        if err.is_mention_level() {
            tracing::warn!(
                source,
                index,
                text,
                code = %err.code(),
                "Rejected mention: {}",
                err
            );
        } else {
            tracing::error!(source, index, "Linking failed: {}", err);
        }
    }

    fn resolve(
        &mut self,
        registry: &mut EntityRegistry,
        mention: &Mention,
        source: &str,
        index: usize,
    ) -> CairnResult<Resolution> {
        let normalized = normalize(&mention.text, mention.entity_type);
        if normalized.is_empty() {
            return Err(CairnError::invalid_mention(format!(
                "'{}' is empty after normalization",
                mention.text
            )));
        }

        let result = self
            .matcher
            .find_match(&normalized, mention.entity_type, registry);
        let occurrence = Occurrence::new(source, mention.text.clone()).with_span(mention.span);

        let (entity_id, outcome) = match result.entity_id() {
            Some(id) => {
                registry.entity_mut(id)?.record(occurrence);
                self.stats.linked_entities += 1;
                (id, LinkOutcome::Linked)
            }
            None => {
                let id = registry.insert(
                    normalized.clone(),
                    mention.entity_type,
                    mention.text.clone(),
                    source,
                )?;
                registry.entity_mut(id)?.record(occurrence);
                self.stats.new_entities += 1;
                (id, LinkOutcome::Inserted)
            }
        };

        let canonical = registry
            .get(entity_id)
            .map(|e| e.canonical_text.clone())
            .unwrap_or(normalized);

        tracing::debug!(
            source,
            text = %mention.text,
            entity_id,
            outcome = ?outcome,
            "Resolved mention"
        );

        Ok(Resolution {
            index,
            text: mention.text.clone(),
            entity_type: mention.entity_type,
            entity_id,
            canonical,
            score: result.score(),
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Span;

    fn records(items: &[(&str, &str)]) -> Vec<MentionRecord> {
        items
            .iter()
            .map(|(text, label)| MentionRecord::new(*text, *label))
            .collect()
    }

    #[test]
    fn test_servo_motor_example() {
        let mut registry = EntityRegistry::new();
        registry.insert("servo motor", EntityType::Component, "servo motor", "seed").unwrap();
        let mut linker = Linker::default();

        let linked = linker
            .link(&mut registry, &Mention::new("Servo Motor", EntityType::Component), "s1")
            .unwrap();
        assert_eq!(linked.entity_id, 1);
        assert_eq!(linked.outcome, LinkOutcome::Linked);
        assert_eq!(linked.score, Some(1.0));

        let inserted = linker
            .link(&mut registry, &Mention::new("gripper assembly", EntityType::Component), "s1")
            .unwrap();
        assert_eq!(inserted.entity_id, 2);
        assert!(inserted.is_new());
        assert_eq!(registry.get(2).unwrap().canonical_text, "gripper assembly");
    }

    #[test]
    fn test_link_records_alias_and_occurrence() {
        let mut registry = EntityRegistry::new();
        let mut linker = Linker::default();

        linker.link_batch(&mut registry, records(&[("control box", "COMPONENT")]), "s1");
        linker.link_batch(&mut registry, records(&[("Control-Box", "COMPONENT")]), "s2");

        let entity = registry.get(1).unwrap();
        assert_eq!(entity.aliases, vec!["control box", "Control-Box"]);
        assert_eq!(entity.count(), 2);
        assert_eq!(entity.first_seen_source, "s1");
        assert_eq!(entity.occurrences[1].source, "s2");
    }

    #[test]
    fn test_insert_uses_normalized_canonical_and_original_alias() {
        let mut registry = EntityRegistry::new();
        let mut linker = Linker::default();

        let mention = Mention::new("  Torque_Wrench ", EntityType::Tool).with_span(Span::new(3, 18));
        let resolution = linker.link(&mut registry, &mention, "s7").unwrap();

        let entity = registry.get(resolution.entity_id).unwrap();
        assert_eq!(entity.canonical_text, "torque wrench");
        assert_eq!(entity.aliases, vec!["  Torque_Wrench "]);
        assert_eq!(entity.first_seen_source, "s7");
        assert_eq!(entity.occurrences[0].span, Some(Span::new(3, 18)));
        assert_eq!(resolution.score, None);
    }

    #[test]
    fn test_types_never_cross_link() {
        let mut registry = EntityRegistry::new();
        let mut linker = Linker::default();

        let report = linker.link_batch(
            &mut registry,
            records(&[("mount", "ACTION"), ("mount", "COMPONENT")]),
            "s1",
        );
        assert_eq!(report.new_count, 2);
        assert_ne!(report.entity_for(0), report.entity_for(1));
    }

    #[test]
    fn test_batch_links_within_itself() {
        let mut registry = EntityRegistry::new();
        let mut linker = Linker::default();

        let report = linker.link_batch(
            &mut registry,
            records(&[("robot arm", "COMPONENT"), ("Robot Arm", "COMPONENT"), ("robot arms", "COMPONENT")]),
            "s1",
        );

        assert_eq!(report.new_count, 1);
        assert_eq!(report.linked_count, 2);
        assert_eq!(registry.len(), 1);
        assert!(report.resolutions.iter().all(|r| r.entity_id == 1));
    }

    #[test]
    fn test_rejections_do_not_stop_batch() {
        let mut registry = EntityRegistry::new();
        let mut linker = Linker::default();

        let report = linker.link_batch(
            &mut registry,
            records(&[("", "COMPONENT"), ("bolt", "WIDGET"), ("...", "ACTION"), ("hex nut", "COMPONENT")]),
            "s1",
        );

        assert_eq!(report.rejections.len(), 3);
        assert_eq!(report.rejections[0].code, "VAL_001");
        assert_eq!(report.rejections[1].code, "VAL_002");
        assert_eq!(report.rejections[2].code, "VAL_001");
        assert_eq!(report.resolutions.len(), 1);
        assert_eq!(report.resolutions[0].index, 3);
        assert_eq!(report.entity_for(3), Some(1));
        assert_eq!(report.total(), 4);

        let stats = linker.stats();
        assert_eq!(stats.total_extractions, 4);
        assert_eq!(stats.rejected, 3);
        assert_eq!(stats.new_entities, 1);
    }

    #[test]
    fn test_ids_strictly_increase() {
        let mut registry = EntityRegistry::new();
        let mut linker = Linker::default();

        let report = linker.link_batch(
            &mut registry,
            records(&[
                ("base plate", "COMPONENT"),
                ("allen key", "TOOL"),
                ("fasten", "ACTION"),
                ("aluminium", "MATERIAL"),
                ("10 Nm", "PARAMETER"),
                ("front panel", "LOCATION"),
            ]),
            "s1",
        );

        let ids: Vec<_> = report.resolutions.iter().map(|r| r.entity_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(registry.next_id(), 7);
    }

    #[test]
    fn test_stricter_threshold_inserts() {
        let mut registry = EntityRegistry::new();
        let mut linker = Linker::with_matcher(FuzzyMatcher::with_threshold(1.0));

        let report = linker.link_batch(
            &mut registry,
            records(&[("servo motor", "COMPONENT"), ("servo motors", "COMPONENT")]),
            "s1",
        );
        assert_eq!(report.new_count, 2);
    }

    #[test]
    fn test_link_rejects_typed_mention() {
        let mut registry = EntityRegistry::new();
        let mut linker = Linker::default();

        let err = linker
            .link(&mut registry, &Mention::new("?!", EntityType::Tool), "s1")
            .unwrap_err();
        assert_eq!(err.code().as_str(), "VAL_001");
        assert!(registry.is_empty());

        let stats = linker.stats();
        assert_eq!(stats.total_extractions, 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.new_entities, 0);
    }

    #[test]
    fn test_link_rate() {
        let stats = LinkStats {
            total_extractions: 5,
            new_entities: 1,
            linked_entities: 3,
            rejected: 1,
        };
        assert_eq!(stats.link_rate(), 75.0);
        assert_eq!(LinkStats::default().link_rate(), 0.0);
    }
}
