//! `cairn show` - one entity in detail.

use anyhow::Result;
use cairn_core::{CairnError, EntityId};
use clap::Args;

use super::Context;

#[derive(Args)]
pub struct ShowArgs {
    /// Entity id
    pub id: EntityId,
}

pub fn run(args: ShowArgs, ctx: &Context) -> Result<()> {
    let (registry, _) = ctx.store().load_or_default()?;
    let entity = registry
        .get(args.id)
        .ok_or_else(|| CairnError::not_found(args.id))?;

    if ctx.json_output {
        return ctx.print_json(entity);
    }

    println!("Entity {}: {} ({})", entity.id, entity.canonical_text, entity.entity_type);
    println!("First seen:  {}", entity.first_seen_source);
    println!("Occurrences: {}", entity.count());
    println!("Aliases:");
    for alias in &entity.aliases {
        println!("  - {}", alias);
    }
    println!("Seen in:");
    for occurrence in &entity.occurrences {
        println!("  - {}: '{}'", occurrence.source, occurrence.matched_text);
    }
    Ok(())
}
