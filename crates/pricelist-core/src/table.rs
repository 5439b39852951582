//! Source documents and the raw tables extracted from them.

use serde::{Deserialize, Serialize};

/// One uploaded document: raw byte content plus the original filename.
///
/// Immutable once ingested; the pipeline never writes it back out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Original filename as supplied by the ingestion collaborator
    /// (no path component expected).
    pub filename: String,
    /// Raw PDF bytes.
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    /// Create a new source document.
    #[must_use]
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

/// Which strategy produced a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Extracted from the PDF's embedded text objects, no rasterization.
    TextLayer,
    /// Reconstructed from recognized text on a rasterized page.
    Ocr,
}

/// An unvalidated grid of text cells produced by exactly one strategy,
/// prior to semantic column mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    /// Ordered rows of ordered text cells. Rows may be ragged; the parser
    /// pads short rows with empty cells.
    pub rows: Vec<Vec<String>>,
    /// Strategy that produced this table.
    pub provenance: Provenance,
    /// Zero-based page index the table was found on.
    pub page: usize,
}

impl RawTable {
    /// Create a new raw table.
    #[must_use]
    pub const fn new(rows: Vec<Vec<String>>, provenance: Provenance, page: usize) -> Self {
        Self {
            rows,
            provenance,
            page,
        }
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest row length.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_count_uses_widest_row() {
        let table = RawTable::new(
            vec![
                vec!["SKU".into(), "Description".into()],
                vec!["A1".into(), "Widget".into(), "$2.50".into()],
            ],
            Provenance::TextLayer,
            0,
        );
        assert_eq!(table.column_count(), 3);
        assert!(!table.is_empty());
    }

    #[test]
    fn provenance_serializes_as_kebab_case_tags() {
        assert_eq!(
            serde_json::to_string(&Provenance::TextLayer).unwrap(),
            "\"text-layer\""
        );
        assert_eq!(serde_json::to_string(&Provenance::Ocr).unwrap(), "\"ocr\"");
    }
}
