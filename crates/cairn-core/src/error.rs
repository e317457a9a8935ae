//! Error types for cairn operations.
//!
//! Errors carry a structured [`ErrorCode`] so that rejected mentions can be
//! reported in machine-readable form alongside the human message.

use thiserror::Error;

use crate::types::EntityId;

/// Result type alias for cairn operations.
pub type CairnResult<T> = Result<T, CairnError>;

/// Main error type for all cairn operations.
#[derive(Error, Debug)]
pub enum CairnError {
    /// Mention text is empty, or empty once normalized.
    #[error("Invalid mention: {message}")]
    InvalidMention { message: String, code: ErrorCode },

    /// Mention label does not name a known entity type.
    #[error("Unknown entity type: {label}")]
    UnknownEntityType { label: String, code: ErrorCode },

    /// Entity not found in the registry.
    #[error("Entity not found: {message}")]
    NotFound {
        message: String,
        code: ErrorCode,
        entity_id: Option<EntityId>,
    },

    /// Persisted registry violates an invariant.
    #[error("Corrupt registry: {message}")]
    CorruptRegistry { message: String, code: ErrorCode },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Parse error for collaborator output.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValEmptyMention,
    ValUnknownType,

    // Registry (REG_xxx)
    RegCorrupted,
    RegNotFound,

    // Configuration (CFG_xxx)
    CfgInvalid,

    // Parse (PARSE_xxx)
    ParseInvalidJson,

    // IO
    Io,

    // Serialization
    Serialization,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValEmptyMention => "VAL_001",
            ErrorCode::ValUnknownType => "VAL_002",
            ErrorCode::RegCorrupted => "REG_001",
            ErrorCode::RegNotFound => "REG_002",
            ErrorCode::CfgInvalid => "CFG_001",
            ErrorCode::ParseInvalidJson => "PARSE_001",
            ErrorCode::Io => "IO_001",
            ErrorCode::Serialization => "SER_001",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CairnError {
    /// Create an invalid-mention error.
    pub fn invalid_mention(message: impl Into<String>) -> Self {
        Self::InvalidMention {
            message: message.into(),
            code: ErrorCode::ValEmptyMention,
        }
    }

    /// Create an unknown-type error.
    pub fn unknown_type(label: impl Into<String>) -> Self {
        Self::UnknownEntityType {
            label: label.into(),
            code: ErrorCode::ValUnknownType,
        }
    }

    /// Create a not found error.
    pub fn not_found(entity_id: EntityId) -> Self {
        Self::NotFound {
            message: format!("Entity with id '{}' not found", entity_id),
            code: ErrorCode::RegNotFound,
            entity_id: Some(entity_id),
        }
    }

    /// Create a corrupt-registry error.
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::CorruptRegistry {
            message: message.into(),
            code: ErrorCode::RegCorrupted,
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidJson,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidMention { code, .. } => *code,
            Self::UnknownEntityType { code, .. } => *code,
            Self::NotFound { code, .. } => *code,
            Self::CorruptRegistry { code, .. } => *code,
            Self::Parse { code, .. } => *code,
            Self::Configuration(_) => ErrorCode::CfgInvalid,
            Self::Io(_) => ErrorCode::Io,
            Self::Serialization(_) => ErrorCode::Serialization,
        }
    }

    /// Whether this error only rejects a single mention rather than the run.
    pub fn is_mention_level(&self) -> bool {
        matches!(
            self,
            Self::InvalidMention { .. } | Self::UnknownEntityType { .. }
        )
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::UnknownEntityType { .. } => Some(
                "Use one of COMPONENT, TOOL, ACTION, PARAMETER, LOCATION, MATERIAL",
            ),
            Self::CorruptRegistry { .. } => {
                Some("Restore the registry file from a backup or start a new one")
            }
            Self::NotFound { .. } => Some("Run `cairn list` to see known entity ids"),
            _ => None,
        }
    }
}
