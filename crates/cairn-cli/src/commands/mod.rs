//! Command implementations.

pub mod context;
pub mod link;
pub mod list;
pub mod show;
pub mod stats;

use anyhow::{Context as _, Result};
use cairn_core::{CairnConfig, RegistryStore};
use serde::Serialize;

use crate::Cli;

/// Shared state for command handlers.
pub struct Context {
    pub config: CairnConfig,
    pub json_output: bool,
}

impl Context {
    /// Resolve configuration: file (if given), then environment, then flags.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => CairnConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => CairnConfig::default(),
        };
        config.apply_env()?;

        if let Some(path) = &cli.registry {
            config.registry_path = path.clone();
        }
        if let Some(threshold) = cli.threshold {
            config.similarity_threshold = threshold;
        }
        config.validate()?;

        tracing::debug!(?config, "Resolved configuration");
        Ok(Self {
            config,
            json_output: cli.json,
        })
    }

    /// Store for the configured registry file.
    pub fn store(&self) -> RegistryStore {
        RegistryStore::new(&self.config.registry_path)
    }

    /// Print a value as pretty JSON on stdout.
    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}
