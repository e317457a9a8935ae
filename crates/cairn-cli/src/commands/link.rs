//! `cairn link` - link extracted mentions into the registry.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use cairn_core::{
    parse_annotated_dataset, parse_extraction_output, write_resolutions_jsonl, LinkReport, Linker,
    MentionBatch,
};
use clap::{Args, ValueEnum};
use serde::Serialize;

use super::Context;

/// Input file shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// Extractor output for one text: `[{"text", "type"}, ...]`
    Extraction,
    /// Annotated samples: `[{"text", "entities": [[start, end, label], ...]}]`
    Annotated,
}

#[derive(Args)]
pub struct LinkArgs {
    /// Mention file to link
    pub input: PathBuf,

    /// Input format
    #[arg(long, value_enum, default_value_t = InputFormat::Extraction)]
    pub format: InputFormat,

    /// Source id for extraction input (defaults to the file stem).
    /// Annotated samples are always numbered `sent_0001`, `sent_0002`, ...
    #[arg(long)]
    pub source: Option<String>,

    /// Write mention resolutions as JSON Lines to this file
    #[arg(long)]
    pub resolutions: Option<PathBuf>,

    /// Link without saving the registry
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Serialize)]
struct LinkSummary<'a> {
    registry: String,
    batches: usize,
    new: usize,
    linked: usize,
    rejected: usize,
    total_entities: usize,
    reports: &'a [LinkReport],
}

pub fn run(args: LinkArgs, ctx: &Context) -> Result<()> {
    if args.format == InputFormat::Annotated && args.source.is_some() {
        bail!("--source applies to extraction input only; annotated samples are numbered sent_NNNN");
    }

    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let batches = match args.format {
        InputFormat::Extraction => {
            let source = args.source.clone().unwrap_or_else(|| {
                args.input
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "input".to_string())
            });
            vec![MentionBatch {
                source,
                text: None,
                mentions: parse_extraction_output(&content)?,
            }]
        }
        InputFormat::Annotated => parse_annotated_dataset(&content)?,
    };

    let store = ctx.store();
    let (mut registry, mut totals) = store.load_or_default()?;
    let mut linker = Linker::new(&ctx.config);

    let reports: Vec<LinkReport> = batches
        .into_iter()
        .map(|batch| linker.link_batch(&mut registry, batch.mentions, &batch.source))
        .collect();

    totals.absorb(linker.stats());
    if args.dry_run {
        tracing::info!("Dry run, registry not saved");
    } else {
        store.save(&registry, totals)?;
    }

    if let Some(path) = &args.resolutions {
        let file =
            File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let export = write_resolutions_jsonl(&reports, file)?;
        for error in &export.errors {
            tracing::warn!("{}", error);
        }
        tracing::info!(path = %path.display(), lines = export.exported, "Wrote resolutions");
    }

    let summary = LinkSummary {
        registry: store.path().display().to_string(),
        batches: reports.len(),
        new: reports.iter().map(|r| r.new_count).sum(),
        linked: reports.iter().map(|r| r.linked_count).sum(),
        rejected: reports.iter().map(|r| r.rejections.len()).sum(),
        total_entities: registry.len(),
        reports: &reports,
    };

    if ctx.json_output {
        return ctx.print_json(&summary);
    }

    for report in &reports {
        for resolution in &report.resolutions {
            let marker = if resolution.is_new() { "NEW" } else { "LINKED" };
            println!(
                "{:<6} {} '{}' -> {} ({})",
                marker, report.source, resolution.text, resolution.entity_id, resolution.canonical
            );
        }
        for rejection in &report.rejections {
            println!(
                "REJECT {} #{} '{}' [{}] {}",
                report.source, rejection.index, rejection.text, rejection.code, rejection.message
            );
        }
    }
    println!(
        "{} new, {} linked, {} rejected; registry holds {} entities",
        summary.new, summary.linked, summary.rejected, summary.total_entities
    );
    Ok(())
}
