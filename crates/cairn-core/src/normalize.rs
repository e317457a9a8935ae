//! Mention normalization.
//!
//! Mentions are compared in normalized form: lowercased, trimmed, with
//! punctuation that carries no meaning for the entity type turned into word
//! breaks and whitespace collapsed. Parameters keep the symbols that make up values and
//! units; part-like types keep the separators that appear in designations
//! such as `M8/M10` or `No.2`.

use crate::types::EntityType;

const PARAMETER_KEEP: &[char] = &['.', ',', '%', '/', '+', '-', '°', '±'];
const DESIGNATION_INNER: &[char] = &['/', '.'];

/// Normalize a mention for comparison.
///
/// Returns an empty string when nothing meaningful remains.
pub fn normalize(text: &str, entity_type: EntityType) -> String {
    let lowered = text.trim().to_lowercase();
    let chars: Vec<char> = if entity_type == EntityType::Parameter {
        lowered.chars().collect()
    } else {
        lowered
            .chars()
            .map(|c| if c == '-' || c == '_' { ' ' } else { c })
            .collect()
    };

    let mut kept = String::with_capacity(chars.len());
    for (i, &c) in chars.iter().enumerate() {
        if c.is_alphanumeric() || c.is_whitespace() || keeps(entity_type, &chars, i) {
            kept.push(c);
        } else {
            kept.push(' ');
        }
    }

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether punctuation at `chars[i]` is meaningful for this entity type.
fn keeps(entity_type: EntityType, chars: &[char], i: usize) -> bool {
    let c = chars[i];
    let alnum_at = |j: Option<usize>| {
        j.and_then(|j| chars.get(j))
            .map_or(false, |c| c.is_alphanumeric())
    };
    let before = alnum_at(i.checked_sub(1));
    let after = alnum_at(Some(i + 1));

    match entity_type {
        EntityType::Parameter => PARAMETER_KEEP.contains(&c),
        EntityType::Component | EntityType::Tool | EntityType::Material => {
            (DESIGNATION_INNER.contains(&c) && before && after) || (c == '#' && after)
        }
        EntityType::Action | EntityType::Location => false,
    }
}
