//! `cairn context` - compact entity list for the extractor prompt.

use anyhow::Result;
use cairn_core::compact_context;
use clap::Args;

use super::Context;

#[derive(Args)]
pub struct ContextArgs {
    /// Maximum entities to include (defaults to the configured limit)
    #[arg(long)]
    pub limit: Option<usize>,
}

pub fn run(args: ContextArgs, ctx: &Context) -> Result<()> {
    let (registry, _) = ctx.store().load_or_default()?;
    let limit = args.limit.unwrap_or(ctx.config.context_limit);
    let block = compact_context(&registry, limit);

    if ctx.json_output {
        let lines: Vec<&str> = block.lines().collect();
        return ctx.print_json(&lines);
    }

    if !block.is_empty() {
        println!("{}", block);
    }
    Ok(())
}
