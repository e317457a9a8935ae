//! JSON Lines export of mention resolutions.
//!
//! Each accepted mention becomes one line mapping it to the entity id it
//! resolved to, suitable for `jq` and line-by-line processing.

use std::io::{BufWriter, Write};

use serde::{Deserialize, Serialize};

use crate::error::CairnResult;
use crate::linker::{LinkOutcome, LinkReport, Resolution};
use crate::types::{EntityId, EntityType};

/// Statistics from an export operation.
#[derive(Debug, Default, Clone)]
pub struct ExportStats {
    /// Total resolutions processed.
    pub total: u64,
    /// Successfully written lines.
    pub exported: u64,
    /// Error messages for failed lines.
    pub errors: Vec<String>,
}

impl ExportStats {
    /// Check if export completed without errors.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.total == self.exported
    }
}

/// One exported mention → entity mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionLine {
    pub source: String,
    pub index: usize,
    pub text: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub entity_id: EntityId,
    pub canonical: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub outcome: LinkOutcome,
}

impl ResolutionLine {
    fn new(source: &str, resolution: &Resolution) -> Self {
        Self {
            source: source.to_string(),
            index: resolution.index,
            text: resolution.text.clone(),
            entity_type: resolution.entity_type,
            entity_id: resolution.entity_id,
            canonical: resolution.canonical.clone(),
            score: resolution.score,
            outcome: resolution.outcome,
        }
    }
}

/// Write every resolution in `reports` as JSON Lines.
///
/// Per-line failures are collected into the returned stats; only the final
/// flush is fatal.
pub fn write_resolutions_jsonl<'a, W, I>(reports: I, writer: W) -> CairnResult<ExportStats>
where
    W: Write,
    I: IntoIterator<Item = &'a LinkReport>,
{
    let mut stats = ExportStats::default();
    let mut writer = BufWriter::new(writer);

    for report in reports {
        for resolution in &report.resolutions {
            stats.total += 1;
            let line = ResolutionLine::new(&report.source, resolution);

            let json = match serde_json::to_string(&line) {
                Ok(json) => json,
                Err(e) => {
                    stats.errors.push(format!(
                        "Serialization error for {}#{}: {}",
                        line.source, line.index, e
                    ));
                    continue;
                }
            };

            if let Err(e) = writeln!(writer, "{}", json) {
                stats.errors.push(format!(
                    "Write error for {}#{}: {}",
                    line.source, line.index, e
                ));
                continue;
            }
            stats.exported += 1;
        }
    }

    writer.flush()?;
    Ok(stats)
}
