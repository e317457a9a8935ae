//! Compact registry context for the LLM extractor.
//!
//! The full registry outgrows a prompt quickly, so only the most frequently
//! seen entities are rendered, one line each:
//!
//! ```text
//! control box (COMPONENT) [seen 3x] {control box, Control Box, controller box}
//! ```

use crate::registry::EntityRegistry;
use crate::types::Entity;

/// Aliases shown per entity.
const MAX_ALIASES: usize = 3;

/// Render the `max_entities` most frequent entities, most frequent first.
pub fn compact_context(registry: &EntityRegistry, max_entities: usize) -> String {
    registry
        .top_by_count(max_entities)
        .into_iter()
        .map(render_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_line(entity: &Entity) -> String {
    let aliases: Vec<&str> = entity
        .aliases
        .iter()
        .take(MAX_ALIASES)
        .map(String::as_str)
        .collect();
    format!(
        "{} ({}) [seen {}x] {{{}}}",
        entity.canonical_text,
        entity.entity_type,
        entity.count(),
        aliases.join(", ")
    )
}
