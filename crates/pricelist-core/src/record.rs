//! Typed product records and batch results.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, ExtractError};
use crate::table::Provenance;
use crate::vendor::VendorLabel;

/// One extracted price-list entry.
///
/// Invariants are enforced by the record parser: `product_id` and
/// `description` are non-empty after trimming, `cost` is a non-negative
/// finite value. Rows that cannot satisfy these are dropped and counted,
/// never emitted with guessed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Vendor's product identifier (SKU, item number, ...).
    pub product_id: String,
    /// Product description.
    pub description: String,
    /// Unit cost.
    pub cost: f64,
}

impl ProductRecord {
    /// Create a new record.
    #[must_use]
    pub fn new(product_id: impl Into<String>, description: impl Into<String>, cost: f64) -> Self {
        Self {
            product_id: product_id.into(),
            description: description.into(),
            cost,
        }
    }
}

/// Per-document processing statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DocumentStats {
    /// Tables accepted by the sufficiency test.
    pub tables_found: usize,
    /// Rows dropped during record parsing (row-level skips, non-fatal).
    pub rows_skipped: usize,
    /// Which strategy produced the accepted tables.
    pub provenance: Option<Provenance>,
    /// Wall-clock processing time for this document.
    pub elapsed_ms: u64,
}

/// A per-document failure entry in a batch report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEntry {
    /// Filename of the failed document.
    pub filename: String,
    /// Error category.
    pub kind: ErrorKind,
    /// Human-readable detail.
    pub message: String,
}

/// Outcome of processing one source document. Exactly one per document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum DocumentResult {
    /// Records were extracted and grouped under the document's vendor label.
    Success {
        /// Vendor label derived from the filename.
        vendor: VendorLabel,
        /// Original filename.
        filename: String,
        /// Extracted records, in row order.
        records: Vec<ProductRecord>,
        /// Processing statistics.
        stats: DocumentStats,
    },
    /// The document failed; other documents in the batch are unaffected.
    Failure {
        /// Original filename.
        filename: String,
        /// Error category.
        kind: ErrorKind,
        /// Human-readable detail.
        message: String,
    },
}

impl DocumentResult {
    /// Build a failure entry from an extraction error.
    #[must_use]
    pub fn failure(filename: impl Into<String>, err: &ExtractError) -> Self {
        Self::Failure {
            filename: filename.into(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// The filename this result belongs to.
    #[must_use]
    pub fn filename(&self) -> &str {
        match self {
            Self::Success { filename, .. } | Self::Failure { filename, .. } => filename,
        }
    }

    /// Whether this is a success entry.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Aggregate counters for a finished batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BatchStats {
    /// Documents that produced records.
    pub documents_succeeded: usize,
    /// Documents that failed.
    pub documents_failed: usize,
    /// Total records across all vendors.
    pub records_extracted: usize,
    /// Total row-level skips across all documents.
    pub rows_skipped: usize,
}

/// Result of one batch: records grouped by vendor plus per-document failures.
///
/// Vendor keys appear in first-arrival order; duplicate labels across
/// documents accumulate under one key, preserving document order and then
/// row order within each document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BatchResult {
    /// Extracted records grouped by vendor label.
    pub vendors: IndexMap<VendorLabel, Vec<ProductRecord>>,
    /// Per-document failures, in input order.
    pub failures: Vec<FailureEntry>,
    /// Aggregate counters.
    pub stats: BatchStats,
}

impl BatchResult {
    /// Fold per-document outcomes (already in input order) into a batch
    /// result.
    ///
    /// This is the pure aggregation step of the orchestrator: it never
    /// drops an outcome and never reorders. A
    /// [`ErrorKind::CapabilityUnavailable`] failure converts the whole
    /// batch into an error, since it reflects a broken environment rather
    /// than a bad document.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::CapabilityUnavailable`] when any document
    /// failed for that reason.
    pub fn collect(outcomes: Vec<DocumentResult>) -> Result<Self, ExtractError> {
        let mut batch = Self::default();

        for outcome in outcomes {
            match outcome {
                DocumentResult::Success {
                    vendor,
                    records,
                    stats,
                    ..
                } => {
                    batch.stats.documents_succeeded += 1;
                    batch.stats.records_extracted += records.len();
                    batch.stats.rows_skipped += stats.rows_skipped;
                    batch.vendors.entry(vendor).or_default().extend(records);
                }
                DocumentResult::Failure {
                    filename,
                    kind,
                    message,
                } => {
                    if kind == ErrorKind::CapabilityUnavailable {
                        return Err(ExtractError::CapabilityUnavailable(message));
                    }
                    batch.stats.documents_failed += 1;
                    batch.failures.push(FailureEntry {
                        filename,
                        kind,
                        message,
                    });
                }
            }
        }

        Ok(batch)
    }
}
