//! Batch orchestration for pricelist-rs
//!
//! Drives the extraction pipeline over a set of uploaded documents:
//! vendor identity from the filename, strategy selection, record parsing,
//! then aggregation into one [`BatchResult`]. Every document yields exactly
//! one outcome; a failing document never aborts the others. The only
//! batch-fatal condition is a missing capability (pdfium or the OCR
//! models), which is an environment fault rather than a data fault.
//!
//! Documents are independent and stateless with respect to each other, so
//! the batch maps over them with a bounded rayon pool; results are
//! collected in input order regardless of completion order, keeping output
//! deterministic.

use std::time::Instant;

use rayon::prelude::*;

use pricelist_core::{
    vendor_label, BatchResult, DocumentResult, DocumentStats, ExtractError, ExtractionOptions,
    Result, SourceDocument,
};
use pricelist_extract::{
    OcrFallbackStrategy, PdfiumRasterizer, PdfiumTextLayerReader, StrategySelector,
    TextLayerStrategy,
};
use pricelist_ocr::OnnxOcrEngine;
use pricelist_parse::{ProfileRegistry, RecordParser};

/// Batch scheduling options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Worker threads for the batch pool. `0` uses rayon's default
    /// (bounded by core count), `1` forces strictly sequential processing.
    pub workers: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { workers: 0 }
    }
}

/// Processes one document end to end.
pub struct DocumentProcessor {
    selector: StrategySelector,
    options: ExtractionOptions,
    profiles: ProfileRegistry,
}

impl DocumentProcessor {
    /// Wire the production pipeline: pdfium text layer first, ONNX OCR
    /// fallback second.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::CapabilityUnavailable`] when the OCR models
    /// cannot be loaded; without the fallback engine the pipeline cannot
    /// honor its contract for scanned documents.
    pub fn new(options: ExtractionOptions) -> Result<Self> {
        let engine = OnnxOcrEngine::new()
            .map_err(|e| ExtractError::CapabilityUnavailable(e.to_string()))?;

        let selector = StrategySelector::new(
            vec![
                Box::new(TextLayerStrategy::new(
                    PdfiumTextLayerReader,
                    options.clone(),
                )),
                Box::new(OcrFallbackStrategy::new(
                    PdfiumRasterizer,
                    engine,
                    options.clone(),
                )),
            ],
            options.clone(),
        );
        Ok(Self::with_selector(selector, options))
    }

    /// Build a processor over an explicit selector. Used by tests to
    /// substitute strategies, and by callers embedding custom capability
    /// implementations.
    #[must_use]
    pub fn with_selector(selector: StrategySelector, options: ExtractionOptions) -> Self {
        Self {
            selector,
            options,
            profiles: ProfileRegistry::new(),
        }
    }

    /// Attach a vendor profile registry.
    #[must_use]
    pub fn with_profiles(mut self, profiles: ProfileRegistry) -> Self {
        self.profiles = profiles;
        self
    }

    /// Process one document. Infallible by design: every error becomes a
    /// failure entry for this document alone.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn process(&self, document: &SourceDocument) -> DocumentResult {
        let started = Instant::now();
        let vendor = vendor_label(&document.filename);
        log::debug!("processing {} (vendor: {vendor})", document.filename);

        match self.selector.select(&document.bytes) {
            Ok(tables) => {
                let profile = self.profiles.profile_for(&vendor).clone();
                let parser = RecordParser::with_profile(self.options.clone(), profile);
                let parsed = parser.parse_tables(&tables);
                log::debug!(
                    "{}: {} record(s), {} row(s) skipped",
                    document.filename,
                    parsed.records.len(),
                    parsed.rows_skipped
                );

                DocumentResult::Success {
                    vendor,
                    filename: document.filename.clone(),
                    records: parsed.records,
                    stats: DocumentStats {
                        tables_found: tables.len(),
                        rows_skipped: parsed.rows_skipped,
                        provenance: tables.first().map(|t| t.provenance),
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    },
                }
            }
            Err(err) => {
                log::warn!("{}: {err}", document.filename);
                DocumentResult::failure(&document.filename, &err)
            }
        }
    }
}

/// Process a batch of documents into one [`BatchResult`].
///
/// Documents are processed independently (parallel map over a bounded pool,
/// or sequentially with `workers == 1`) and their outcomes folded in input
/// order, so duplicate vendor labels accumulate records in document-then-row
/// order.
///
/// # Errors
///
/// Returns [`ExtractError::CapabilityUnavailable`] when any document hit a
/// missing capability; all other failures are entries in the returned
/// result, not errors.
pub fn process_batch(
    processor: &DocumentProcessor,
    documents: &[SourceDocument],
    options: &BatchOptions,
) -> Result<BatchResult> {
    log::info!(
        "processing batch of {} document(s), workers = {}",
        documents.len(),
        options.workers
    );

    let outcomes: Vec<DocumentResult> = match options.workers {
        1 => documents.iter().map(|d| processor.process(d)).collect(),
        0 => documents.par_iter().map(|d| processor.process(d)).collect(),
        workers => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .map_err(|e| {
                    ExtractError::CapabilityUnavailable(format!("worker pool setup failed: {e}"))
                })?;
            pool.install(|| documents.par_iter().map(|d| processor.process(d)).collect())
        }
    };

    BatchResult::collect(outcomes)
}
