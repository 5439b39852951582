//! Error types for price-list extraction.
//!
//! Document-level failures are recovered by the batch orchestrator and
//! surfaced as report entries; only [`ExtractError::CapabilityUnavailable`]
//! aborts a whole batch, since it indicates an environment fault rather than
//! a bad document.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while extracting records from a single document.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The bytes could not be opened as a PDF by any strategy.
    #[error("document cannot be opened as a PDF: {0}")]
    CorruptDocument(String),

    /// Every strategy ran, but none produced a table that passed the
    /// sufficiency test.
    #[error("no extractable table found by any strategy")]
    NoExtractableTable,

    /// An external capability (page rasterizer, OCR engine) is unreachable
    /// or misconfigured.
    #[error("extraction capability unavailable: {0}")]
    CapabilityUnavailable(String),
}

impl ExtractError {
    /// The reporting category for this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::CorruptDocument(_) => ErrorKind::CorruptDocument,
            Self::NoExtractableTable => ErrorKind::NoExtractableTable,
            Self::CapabilityUnavailable(_) => ErrorKind::CapabilityUnavailable,
        }
    }

    /// Whether this error must abort the whole batch instead of failing a
    /// single document.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::CapabilityUnavailable(_))
    }
}

/// Serializable error category surfaced in batch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Bytes were not a readable PDF.
    CorruptDocument,
    /// Both strategies ran but the sufficiency test failed.
    NoExtractableTable,
    /// An external collaborator is missing; environment fault.
    CapabilityUnavailable,
}

/// Convenience alias used across the extraction crates.
pub type Result<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(
            ExtractError::CorruptDocument("bad header".into()).kind(),
            ErrorKind::CorruptDocument
        );
        assert_eq!(
            ExtractError::NoExtractableTable.kind(),
            ErrorKind::NoExtractableTable
        );
        assert_eq!(
            ExtractError::CapabilityUnavailable("no pdfium".into()).kind(),
            ErrorKind::CapabilityUnavailable
        );
    }

    #[test]
    fn only_capability_errors_are_fatal() {
        assert!(ExtractError::CapabilityUnavailable("ocr models missing".into()).is_fatal());
        assert!(!ExtractError::NoExtractableTable.is_fatal());
        assert!(!ExtractError::CorruptDocument("truncated".into()).is_fatal());
    }

    #[test]
    fn kind_serializes_kebab_case() {
        let json = serde_json::to_string(&ErrorKind::NoExtractableTable).unwrap();
        assert_eq!(json, "\"no-extractable-table\"");
    }
}
