//! Load-time errors.
//!
//! Everything here is raised once per load and is fatal for that load.
//! Pointer queries never produce errors; they answer `None`.

use core::fmt;

use thiserror::Error;

/// Result type for loading operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Decoded field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingField {
    GeneratedColumn,
    Source,
    OriginalLine,
    OriginalColumn,
    Name,
}

impl fmt::Display for MappingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::GeneratedColumn => "generated column",
            Self::Source => "source index",
            Self::OriginalLine => "original line",
            Self::OriginalColumn => "original column",
            Self::Name => "name index",
        };
        f.write_str(label)
    }
}

/// Errors that can occur while loading a source map.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Document `version` is not 3.
    #[error("unsupported source map version {found} (expected 3)")]
    InvalidVersion { found: i64 },

    /// Bad base64 digit, truncated or oversized VLQ, or a segment with the
    /// wrong number of fields.
    #[error("malformed VLQ data at offset {offset}: {reason}")]
    MalformedVlq { offset: usize, reason: &'static str },

    /// A decoded value addresses nothing: a source or name index outside
    /// the declared tables, or a negative position.
    #[error("invalid {field} {value} at offset {offset}")]
    InvalidIndex {
        field: MappingField,
        value: i64,
        offset: usize,
    },

    /// The document is not valid JSON for a source map.
    #[error("invalid source map JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl LoadError {
    /// True for errors that replace the whole panel instead of leaving the
    /// previous render visible.
    pub fn is_full_panel(&self) -> bool {
        matches!(self, Self::InvalidVersion { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = LoadError::MalformedVlq {
            offset: 4,
            reason: "invalid base64 digit",
        };
        assert_eq!(
            err.to_string(),
            "malformed VLQ data at offset 4: invalid base64 digit"
        );

        let err = LoadError::InvalidIndex {
            field: MappingField::Source,
            value: 2,
            offset: 0,
        };
        assert_eq!(err.to_string(), "invalid source index 2 at offset 0");
    }

    #[test]
    fn test_full_panel_only_for_version() {
        assert!(LoadError::InvalidVersion { found: 2 }.is_full_panel());
        assert!(
            !LoadError::MalformedVlq {
                offset: 0,
                reason: "x"
            }
            .is_full_panel()
        );
    }
}
