//! Fuzzy matching of mentions against registry entities.
//!
//! Similarity is the normalized Levenshtein ratio (`1 - distance / max_len`)
//! over normalized strings, so scores lie in `[0, 1]` and identical strings
//! score exactly 1.0. Only entities of the mention's type are candidates.

use serde::{Deserialize, Serialize};

use crate::config::CairnConfig;
use crate::normalize::normalize;
use crate::registry::EntityRegistry;
use crate::types::{EntityId, EntityType};

/// The best-scoring candidate for a mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// Entity the candidate string belongs to.
    pub entity_id: EntityId,
    /// The candidate string that produced the score.
    pub text: String,
    /// Similarity score in `[0, 1]`.
    pub score: f64,
}

/// Result of a match attempt against the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Whether the best candidate reached the threshold.
    pub matched: bool,
    /// Best candidate, if any candidate of the right type exists.
    pub best: Option<MatchCandidate>,
}

impl MatchResult {
    /// Create a result indicating no candidates.
    pub fn no_match() -> Self {
        Self {
            matched: false,
            best: None,
        }
    }

    /// The matched entity id, if the match succeeded.
    pub fn entity_id(&self) -> Option<EntityId> {
        if self.matched {
            self.best.as_ref().map(|c| c.entity_id)
        } else {
            None
        }
    }

    /// Score of the best candidate, matched or not.
    pub fn score(&self) -> Option<f64> {
        self.best.as_ref().map(|c| c.score)
    }
}

/// Fuzzy matcher with a configurable acceptance threshold.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    threshold: f64,
    match_aliases: bool,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(&CairnConfig::default())
    }
}

impl FuzzyMatcher {
    /// Create a matcher from configuration.
    pub fn new(config: &CairnConfig) -> Self {
        Self {
            threshold: config.similarity_threshold,
            match_aliases: config.match_aliases,
        }
    }

    /// Create a matcher with a custom threshold.
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            match_aliases: false,
        }
    }

    /// Also compare against each entity's normalized aliases.
    pub fn match_aliases(mut self, enabled: bool) -> Self {
        self.match_aliases = enabled;
        self
    }

    /// Get the acceptance threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Similarity between two normalized strings.
    pub fn similarity(a: &str, b: &str) -> f64 {
        if a == b {
            return 1.0;
        }
        strsim::normalized_levenshtein(a, b)
    }

    /// Pick the highest-scoring candidate.
    ///
    /// On equal scores the earliest candidate wins, so callers must supply
    /// candidates in registry insertion order.
    pub fn best_candidate<'a, I>(&self, mention: &str, candidates: I) -> Option<MatchCandidate>
    where
        I: IntoIterator<Item = (EntityId, &'a str)>,
    {
        let mut best: Option<MatchCandidate> = None;
        for (entity_id, text) in candidates {
            let score = Self::similarity(mention, text);
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(MatchCandidate {
                    entity_id,
                    text: text.to_string(),
                    score,
                });
            }
        }
        best
    }

    /// Find the best registry entity of `entity_type` for a normalized mention.
    pub fn find_match(
        &self,
        normalized: &str,
        entity_type: EntityType,
        registry: &EntityRegistry,
    ) -> MatchResult {
        let mut candidates: Vec<(EntityId, String)> = Vec::new();
        for entity in registry.of_type(entity_type) {
            candidates.push((entity.id, entity.canonical_text.clone()));
            if self.match_aliases {
                for alias in &entity.aliases {
                    let alias = normalize(alias, entity_type);
                    if !alias.is_empty() && alias != entity.canonical_text {
                        candidates.push((entity.id, alias));
                    }
                }
            }
        }

        let best = self.best_candidate(
            normalized,
            candidates.iter().map(|(id, text)| (*id, text.as_str())),
        );

        match best {
            Some(candidate) => {
                let matched = candidate.score >= self.threshold;
                tracing::debug!(
                    mention = normalized,
                    candidate = %candidate.text,
                    score = candidate.score,
                    matched,
                    "Best fuzzy candidate"
                );
                MatchResult {
                    matched,
                    best: Some(candidate),
                }
            }
            None => MatchResult::no_match(),
        }
    }
}
