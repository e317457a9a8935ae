//! Mentions produced by the extraction collaborators.

use serde::{Deserialize, Serialize};

use super::EntityType;
use crate::error::{CairnError, CairnResult};

/// Character offsets of a mention within its source text (end exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A typed mention, ready for linking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    /// The mention text as extracted.
    pub text: String,
    /// Entity type.
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Location in the source text, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl Mention {
    /// Create a new mention.
    pub fn new(text: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            text: text.into(),
            entity_type,
            span: None,
        }
    }

    /// Add a span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

/// An untyped mention as emitted by an extractor.
///
/// The label is kept verbatim so that an unrecognized type can be reported
/// against the record that carried it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentionRecord {
    pub text: String,
    #[serde(alias = "type", alias = "entity_type")]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl MentionRecord {
    /// Create a new record.
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
            span: None,
        }
    }

    /// Add a span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Validate the record and resolve its label.
    pub fn to_mention(&self) -> CairnResult<Mention> {
        if self.text.trim().is_empty() {
            return Err(CairnError::invalid_mention(format!(
                "empty mention text (label '{}')",
                self.label
            )));
        }
        let entity_type = self.label.parse::<EntityType>()?;
        Ok(Mention {
            text: self.text.clone(),
            entity_type,
            span: self.span,
        })
    }
}

impl From<Mention> for MentionRecord {
    fn from(mention: Mention) -> Self {
        Self {
            text: mention.text,
            label: mention.entity_type.as_str().to_string(),
            span: mention.span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_record_to_mention() {
        let record = MentionRecord::new("Servo Motor", "component").with_span(Span::new(4, 15));
        let mention = record.to_mention().unwrap();
        assert_eq!(mention.entity_type, EntityType::Component);
        assert_eq!(mention.text, "Servo Motor");
        assert_eq!(mention.span, Some(Span::new(4, 15)));
    }

    #[test]
    fn test_record_rejects_empty_text_before_label() {
        let err = MentionRecord::new("   ", "WIDGET").to_mention().unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValEmptyMention);
    }

    #[test]
    fn test_record_rejects_unknown_label() {
        let err = MentionRecord::new("bolt", "WIDGET").to_mention().unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValUnknownType);
    }

    #[test]
    fn test_record_label_aliases() {
        let record: MentionRecord =
            serde_json::from_str(r#"{"text": "hex key", "type": "TOOL"}"#).unwrap();
        assert_eq!(record.label, "TOOL");

        let record: MentionRecord =
            serde_json::from_str(r#"{"text": "hex key", "entity_type": "tool"}"#).unwrap();
        assert_eq!(record.to_mention().unwrap().entity_type, EntityType::Tool);
    }
}
