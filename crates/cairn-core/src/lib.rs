//! cairn-core - Core library for cairn.
//!
//! This crate maintains a growing, global registry of named entities found in
//! technical assembly texts and links newly extracted mentions to it.
//!
//! # Example
//!
//! ```ignore
//! use cairn_core::{CairnConfig, EntityRegistry, Linker, MentionRecord};
//!
//! let mut registry = EntityRegistry::new();
//! let mut linker = Linker::new(&CairnConfig::default());
//!
//! let records = vec![
//!     MentionRecord::new("Servo Motor", "COMPONENT"),
//!     MentionRecord::new("torque wrench", "TOOL"),
//! ];
//! let report = linker.link_batch(&mut registry, records, "sent_0001");
//! println!("{} new, {} linked", report.new_count, report.linked_count);
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod export;
pub mod ingest;
pub mod linker;
pub mod matcher;
pub mod normalize;
pub mod registry;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::CairnConfig;
pub use context::compact_context;
pub use error::{CairnError, CairnResult, ErrorCode};
pub use export::{write_resolutions_jsonl, ExportStats, ResolutionLine};
pub use ingest::{parse_annotated_dataset, parse_extraction_output, MentionBatch};
pub use linker::{LinkOutcome, LinkReport, LinkStats, Linker, Rejection, Resolution};
pub use matcher::{FuzzyMatcher, MatchCandidate, MatchResult};
pub use normalize::normalize;
pub use registry::EntityRegistry;
pub use store::{RegistryDocument, RegistryStatistics, RegistryStore};
pub use types::{Entity, EntityId, EntityType, Mention, MentionRecord, Occurrence, Span};
