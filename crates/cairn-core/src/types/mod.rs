//! Core types for cairn.

mod entity;
mod entity_type;
mod mention;

pub use entity::{Entity, EntityId, Occurrence};
pub use entity_type::EntityType;
pub use mention::{Mention, MentionRecord, Span};
