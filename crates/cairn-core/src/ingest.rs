//! Parsing of mention lists produced by the extraction collaborators.
//!
//! Two shapes are accepted:
//!
//! - **Extraction output**: what the LLM or classical extractor emits for one
//!   text, a JSON list of `{"text", "type"}` objects (or `{"entities": [...]}`).
//!   LLM responses are often wrapped in markdown fences or carry trailing
//!   commas, so parsing is lenient.
//! - **Annotated dataset**: a list of samples, each a text with
//!   `[start, end, label]` character-offset annotations. Every sample becomes
//!   its own batch with source id `sent_NNNN`.
//!
//! Records are passed through even when they are malformed; the linker
//! rejects and reports them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CairnError, CairnResult};
use crate::types::{MentionRecord, Span};

/// Mentions extracted from one source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentionBatch {
    /// Source identifier, e.g. `sent_0003`.
    pub source: String,
    /// The source text, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub mentions: Vec<MentionRecord>,
}

/// Raw JSON structures for lenient parsing.
mod raw {
    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Debug, Deserialize)]
    pub struct RawMention {
        #[serde(alias = "name", alias = "mention")]
        pub text: Option<String>,
        #[serde(alias = "type", alias = "entity_type", alias = "entityType")]
        pub label: Option<String>,
        pub start: Option<usize>,
        pub end: Option<usize>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Annotations {
        #[serde(default)]
        pub entities: Vec<Value>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    pub enum RawSample {
        Object {
            text: String,
            #[serde(default)]
            entities: Vec<Value>,
        },
        Pair(String, Annotations),
    }

    impl RawSample {
        pub fn into_parts(self) -> (String, Vec<Value>) {
            match self {
                Self::Object { text, entities } => (text, entities),
                Self::Pair(text, annotations) => (text, annotations.entities),
            }
        }
    }
}

/// Parse one extractor response into mention records.
pub fn parse_extraction_output(content: &str) -> CairnResult<Vec<MentionRecord>> {
    let content = content.trim();
    if content.is_empty() {
        return Ok(Vec::new());
    }

    let json_str = extract_json(content);
    let value: Value = match serde_json::from_str(json_str) {
        Ok(v) => v,
        Err(e) => lenient_parse(json_str)
            .ok_or_else(|| CairnError::parse(format!("extraction output is not JSON: {}", e)))?,
    };

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("entities") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(CairnError::parse(
                    "extraction output object has no \"entities\" list",
                ))
            }
        },
        _ => return Err(CairnError::parse("extraction output must be a list")),
    };

    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<raw::RawMention>(item) {
            Ok(raw) => records.push(convert_mention(raw)),
            Err(e) => tracing::warn!(index = i, "Skipping unreadable mention: {}", e),
        }
    }
    Ok(records)
}

/// Parse an annotated dataset into one batch per sample.
pub fn parse_annotated_dataset(content: &str) -> CairnResult<Vec<MentionBatch>> {
    let samples: Vec<raw::RawSample> = serde_json::from_str(content)
        .map_err(|e| CairnError::parse(format!("annotated dataset: {}", e)))?;

    let mut batches = Vec::with_capacity(samples.len());
    for (i, sample) in samples.into_iter().enumerate() {
        let source = format!("sent_{:04}", i + 1);
        let (text, annotations) = sample.into_parts();

        let mut mentions = Vec::with_capacity(annotations.len());
        for annotation in &annotations {
            match parse_annotation(annotation) {
                Some((start, end, label)) => {
                    let mention_text = slice_chars(&text, start, end).unwrap_or_default();
                    mentions.push(
                        MentionRecord::new(mention_text, label).with_span(Span::new(start, end)),
                    );
                }
                None => tracing::warn!(source = %source, "Skipping annotation {}", annotation),
            }
        }

        batches.push(MentionBatch {
            source,
            text: Some(text),
            mentions,
        });
    }
    Ok(batches)
}

/// Extract JSON from response (handles markdown code blocks).
fn extract_json(content: &str) -> &str {
    static JSON_BLOCK: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"```(?:json)?\s*\n?([\s\S]*?)\n?```").expect("valid code fence pattern")
    });

    if let Some(caps) = JSON_BLOCK.captures(content) {
        if let Some(m) = caps.get(1) {
            return m.as_str().trim();
        }
    }

    content
}

/// Lenient parsing for malformed JSON.
fn lenient_parse(json_str: &str) -> Option<Value> {
    static TRAILING_COMMA: Lazy<Regex> =
        Lazy::new(|| Regex::new(r",\s*([\]}])").expect("valid trailing comma pattern"));

    let fixed = TRAILING_COMMA.replace_all(json_str, "$1");
    if let Ok(value) = serde_json::from_str(&fixed) {
        return Some(value);
    }

    serde_json::from_str(&fixed.replace('\'', "\"")).ok()
}

fn convert_mention(raw: raw::RawMention) -> MentionRecord {
    let mut record = MentionRecord::new(
        raw.text.unwrap_or_default(),
        raw.label.unwrap_or_default(),
    );
    if let (Some(start), Some(end)) = (raw.start, raw.end) {
        record = record.with_span(Span::new(start, end));
    }
    record
}

/// `[start, end, label]` triple.
fn parse_annotation(value: &Value) -> Option<(usize, usize, String)> {
    let items = value.as_array()?;
    if items.len() != 3 {
        return None;
    }
    let start = usize::try_from(items[0].as_u64()?).ok()?;
    let end = usize::try_from(items[1].as_u64()?).ok()?;
    let label = items[2].as_str()?.to_string();
    Some((start, end, label))
}

/// Slice by character offsets; `None` for inverted or out-of-range spans.
fn slice_chars(text: &str, start: usize, end: usize) -> Option<String> {
    if start >= end || end > text.chars().count() {
        return None;
    }
    Some(text.chars().skip(start).take(end - start).collect())
}
