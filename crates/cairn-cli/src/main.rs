//! cairn - entity registry CLI.
//!
//! Links entity mentions extracted from technical assembly texts into a
//! persistent global registry and inspects it.
//!
//! # Configuration
//!
//! - `--config <FILE>` - TOML, JSON or YAML file
//! - `CAIRN_REGISTRY` - registry file, defaults to `~/.cairn/registry.json`
//! - `CAIRN_SIMILARITY_THRESHOLD` - fuzzy match threshold, defaults to 0.85
//! - `RUST_LOG` - log filter; logs go to stderr

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::{context, link, list, show, stats};

/// cairn - global entity registry with fuzzy mention linking
#[derive(Parser)]
#[command(name = "cairn")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (.toml, .json, .yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Registry file
    #[arg(long, global = true)]
    pub registry: Option<PathBuf>,

    /// Similarity threshold for linking, in [0, 1]
    #[arg(long, global = true)]
    pub threshold: Option<f64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Link extracted mentions into the registry
    Link(link::LinkArgs),

    /// Show registry statistics
    Stats(stats::StatsArgs),

    /// Print a compact entity context block for the extractor
    Context(context::ContextArgs),

    /// List registry entities
    List(list::ListArgs),

    /// Show one entity with its aliases and occurrences
    Show(show::ShowArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "cairn=debug,cairn_core=debug,warn"
    } else {
        "cairn=info,cairn_core=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // stdout carries command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .init();

    let ctx = commands::Context::from_cli(&cli)?;

    match cli.command {
        Commands::Link(args) => link::run(args, &ctx),
        Commands::Stats(args) => stats::run(args, &ctx),
        Commands::Context(args) => context::run(args, &ctx),
        Commands::List(args) => list::run(args, &ctx),
        Commands::Show(args) => show::run(args, &ctx),
    }
}
