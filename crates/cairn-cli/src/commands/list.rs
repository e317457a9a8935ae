//! `cairn list` - list registry entities.

use anyhow::Result;
use cairn_core::{EntityId, EntityType};
use clap::Args;
use serde::Serialize;

use super::Context;

#[derive(Args)]
pub struct ListArgs {
    /// Only entities of this type
    #[arg(long = "type", value_parser = parse_entity_type)]
    pub entity_type: Option<EntityType>,
}

#[derive(Serialize)]
struct Row<'a> {
    id: EntityId,
    #[serde(rename = "type")]
    entity_type: EntityType,
    canonical_text: &'a str,
    count: usize,
}

fn parse_entity_type(s: &str) -> Result<EntityType, String> {
    s.parse::<EntityType>().map_err(|e| e.to_string())
}

pub fn run(args: ListArgs, ctx: &Context) -> Result<()> {
    let (registry, _) = ctx.store().load_or_default()?;

    let rows: Vec<Row<'_>> = registry
        .iter()
        .filter(|e| args.entity_type.map_or(true, |t| e.entity_type == t))
        .map(|e| Row {
            id: e.id,
            entity_type: e.entity_type,
            canonical_text: &e.canonical_text,
            count: e.count(),
        })
        .collect();

    if ctx.json_output {
        return ctx.print_json(&rows);
    }

    for row in &rows {
        println!(
            "{:>5}  {:<10} {} [{}x]",
            row.id,
            row.entity_type.as_str(),
            row.canonical_text,
            row.count
        );
    }
    Ok(())
}
