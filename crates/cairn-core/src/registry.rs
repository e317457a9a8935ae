//! The global entity registry.
//!
//! Entities are kept in insertion order, which is also id order. Ids are
//! allocated sequentially and never reused, even across save/load cycles.

use std::collections::{BTreeMap, HashMap};

use crate::error::{CairnError, CairnResult};
use crate::types::{Entity, EntityId, EntityType};

/// Ordered, id-keyed collection of canonical entities.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
    index: HashMap<EntityId, usize>,
    next_id: EntityId,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    /// Create an empty registry. The first entity gets id 1.
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            index: HashMap::new(),
            next_id: 1,
        }
    }

    /// Rebuild a registry from persisted entities.
    ///
    /// Entities are re-sorted by id. The next id is the larger of the
    /// persisted counter and one past the highest id present.
    pub fn from_entities(mut entities: Vec<Entity>, next_id: EntityId) -> CairnResult<Self> {
        entities.sort_by_key(|e| e.id);

        let mut index = HashMap::with_capacity(entities.len());
        for (pos, entity) in entities.iter().enumerate() {
            if entity.id == 0 {
                return Err(CairnError::corrupt("entity id 0 is reserved"));
            }
            if entity.canonical_text.trim().is_empty() {
                return Err(CairnError::corrupt(format!(
                    "entity {} has empty canonical text",
                    entity.id
                )));
            }
            if index.insert(entity.id, pos).is_some() {
                return Err(CairnError::corrupt(format!(
                    "duplicate entity id {}",
                    entity.id
                )));
            }
        }

        let max_id = entities.last().map_or(0, |e| e.id);
        let after_max = max_id
            .checked_add(1)
            .ok_or_else(|| CairnError::corrupt("entity id space exhausted"))?;
        Ok(Self {
            entities,
            index,
            next_id: next_id.max(after_max),
        })
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the registry holds no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The id the next inserted entity will receive.
    pub fn next_id(&self) -> EntityId {
        self.next_id
    }

    /// Look up an entity by id.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index.get(&id).map(|&pos| &self.entities[pos])
    }

    /// Mutable lookup, used when linking a mention to an existing entity.
    pub fn entity_mut(&mut self, id: EntityId) -> CairnResult<&mut Entity> {
        match self.index.get(&id) {
            Some(&pos) => Ok(&mut self.entities[pos]),
            None => Err(CairnError::not_found(id)),
        }
    }

    /// Iterate entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Iterate entities of one type in insertion order.
    pub fn of_type(&self, entity_type: EntityType) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(move |e| e.entity_type == entity_type)
    }

    /// Insert a new entity and return its id.
    pub fn insert(
        &mut self,
        canonical_text: impl Into<String>,
        entity_type: EntityType,
        alias: impl Into<String>,
        first_seen_source: impl Into<String>,
    ) -> CairnResult<EntityId> {
        let canonical_text = canonical_text.into();
        if canonical_text.trim().is_empty() {
            return Err(CairnError::invalid_mention(
                "canonical text must not be empty",
            ));
        }

        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or_else(|| CairnError::corrupt("entity id space exhausted"))?;

        let entity = Entity::new(id, canonical_text, entity_type, alias, first_seen_source);
        self.index.insert(id, self.entities.len());
        self.entities.push(entity);

        tracing::debug!(entity_id = id, %entity_type, "Inserted entity");
        Ok(id)
    }

    /// Entity counts per type, ordered by type.
    pub fn type_distribution(&self) -> BTreeMap<EntityType, usize> {
        let mut distribution = BTreeMap::new();
        for entity in &self.entities {
            *distribution.entry(entity.entity_type).or_insert(0) += 1;
        }
        distribution
    }

    /// The `n` most frequently seen entities. Ties keep id order.
    pub fn top_by_count(&self, n: usize) -> Vec<&Entity> {
        let mut sorted: Vec<&Entity> = self.entities.iter().collect();
        sorted.sort_by(|a, b| b.count().cmp(&a.count()));
        sorted.truncate(n);
        sorted
    }

    /// Consume the registry, yielding its entities and next id.
    pub fn into_parts(self) -> (Vec<Entity>, EntityId) {
        (self.entities, self.next_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::types::Occurrence;

    #[test]
    fn test_insert_allocates_sequential_ids() {
        let mut registry = EntityRegistry::new();
        let a = registry.insert("servo motor", EntityType::Component, "Servo Motor", "s1").unwrap();
        let b = registry.insert("tighten", EntityType::Action, "tighten", "s1").unwrap();

        assert_eq!((a, b), (1, 2));
        assert_eq!(registry.next_id(), 3);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(1).unwrap().canonical_text, "servo motor");
    }

    #[test]
    fn test_insert_rejects_empty_canonical() {
        let mut registry = EntityRegistry::new();
        let err = registry.insert("  ", EntityType::Tool, "", "s1").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValEmptyMention);
        assert_eq!(registry.next_id(), 1);
    }

    #[test]
    fn test_of_type_keeps_insertion_order() {
        let mut registry = EntityRegistry::new();
        registry.insert("bolt", EntityType::Component, "bolt", "s1").unwrap();
        registry.insert("wrench", EntityType::Tool, "wrench", "s1").unwrap();
        registry.insert("nut", EntityType::Component, "nut", "s2").unwrap();

        let ids: Vec<_> = registry.of_type(EntityType::Component).map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_from_entities_restores_next_id() {
        let entities = vec![
            Entity::new(4, "nut", EntityType::Component, "nut", "s2"),
            Entity::new(2, "bolt", EntityType::Component, "bolt", "s1"),
        ];

        let registry = EntityRegistry::from_entities(entities.clone(), 0).unwrap();
        assert_eq!(registry.next_id(), 5);
        assert_eq!(registry.iter().map(|e| e.id).collect::<Vec<_>>(), vec![2, 4]);

        // A persisted counter beyond the max id is honoured so ids are never reused
        let registry = EntityRegistry::from_entities(entities, 9).unwrap();
        assert_eq!(registry.next_id(), 9);
    }

    #[test]
    fn test_from_entities_rejects_duplicates() {
        let entities = vec![
            Entity::new(1, "bolt", EntityType::Component, "bolt", "s1"),
            Entity::new(1, "nut", EntityType::Component, "nut", "s1"),
        ];
        let err = EntityRegistry::from_entities(entities, 0).unwrap_err();
        assert_eq!(err.code(), ErrorCode::RegCorrupted);
    }

    #[test]
    fn test_from_entities_rejects_empty_canonical() {
        let entities = vec![Entity::new(1, "", EntityType::Component, "x", "s1")];
        assert!(EntityRegistry::from_entities(entities, 0).is_err());
    }

    #[test]
    fn test_from_entities_rejects_max_id() {
        let entities = vec![Entity::new(u64::MAX, "bolt", EntityType::Component, "bolt", "s1")];
        let err = EntityRegistry::from_entities(entities, 0).unwrap_err();
        assert_eq!(err.code(), ErrorCode::RegCorrupted);
    }

    #[test]
    fn test_insert_fails_when_ids_exhausted() {
        let entities = vec![Entity::new(1, "bolt", EntityType::Component, "bolt", "s1")];
        let mut registry = EntityRegistry::from_entities(entities, u64::MAX).unwrap();

        let err = registry.insert("nut", EntityType::Component, "nut", "s1").unwrap_err();
        assert_eq!(err.code(), ErrorCode::RegCorrupted);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.next_id(), u64::MAX);
    }

    #[test]
    fn test_entity_mut_missing() {
        let mut registry = EntityRegistry::new();
        let err = registry.entity_mut(42).unwrap_err();
        assert_eq!(err.code(), ErrorCode::RegNotFound);
    }

    #[test]
    fn test_type_distribution_and_top() {
        let mut registry = EntityRegistry::new();
        let bolt = registry.insert("bolt", EntityType::Component, "bolt", "s1").unwrap();
        registry.insert("wrench", EntityType::Tool, "wrench", "s1").unwrap();
        let nut = registry.insert("nut", EntityType::Component, "nut", "s1").unwrap();

        for _ in 0..3 {
            registry.entity_mut(nut).unwrap().record(Occurrence::new("s1", "nut"));
        }
        registry.entity_mut(bolt).unwrap().record(Occurrence::new("s1", "bolt"));

        let distribution = registry.type_distribution();
        assert_eq!(distribution[&EntityType::Component], 2);
        assert_eq!(distribution[&EntityType::Tool], 1);

        let top: Vec<_> = registry.top_by_count(2).iter().map(|e| e.id).collect();
        assert_eq!(top, vec![nut, bolt]);
    }
}
