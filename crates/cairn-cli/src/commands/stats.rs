//! `cairn stats` - registry statistics.

use anyhow::Result;
use cairn_core::RegistryStatistics;
use clap::Args;

use super::Context;

#[derive(Args)]
pub struct StatsArgs {}

pub fn run(_args: StatsArgs, ctx: &Context) -> Result<()> {
    let (registry, linking) = ctx.store().load_or_default()?;
    let stats = RegistryStatistics::compute(&registry, linking);

    if ctx.json_output {
        return ctx.print_json(&stats);
    }

    println!("Registry:            {}", ctx.config.registry_path.display());
    println!("Total entities:      {}", stats.total_entities);
    println!("Total occurrences:   {}", stats.total_occurrences);
    println!("Total extractions:   {}", stats.linking.total_extractions);
    println!("New entities:        {}", stats.linking.new_entities);
    println!("Linked mentions:     {}", stats.linking.linked_entities);
    println!("Rejected mentions:   {}", stats.linking.rejected);
    println!("Link rate:           {:.1}%", stats.link_rate);
    if !stats.entities_by_type.is_empty() {
        println!("Entities by type:");
        for (entity_type, count) in &stats.entities_by_type {
            println!("  {:<10} {}", entity_type, count);
        }
    }
    Ok(())
}
