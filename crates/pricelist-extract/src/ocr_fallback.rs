//! OCR fallback strategy.
//!
//! Strictly more expensive and less precise than the text layer: every page
//! is rasterized, preprocessed and run through character recognition, then
//! the recognized tokens are clustered back into tabular structure from
//! their bounding-box geometry. The selector only invokes this for
//! documents where the text layer came up empty — scanned price sheets,
//! mostly.

use image::{DynamicImage, GenericImageView};
use pricelist_core::{ExtractError, ExtractionOptions, Provenance, RawTable, Result};
use pricelist_ocr::preprocess::{block_radius_for_dpi, prepare_page};
use pricelist_ocr::{OcrError, TextRecognizer};

use crate::capabilities::{PageRasterizer, TextCell};
use crate::cluster::{cluster_region, split_at_gutter};
use crate::selector::TableStrategy;

/// Table reconstruction from rasterized pages.
pub struct OcrFallbackStrategy<Z, E> {
    rasterizer: Z,
    recognizer: E,
    options: ExtractionOptions,
}

impl<Z, E> OcrFallbackStrategy<Z, E> {
    /// Create the strategy over rasterization and recognition capabilities.
    #[must_use]
    pub fn new(rasterizer: Z, recognizer: E, options: ExtractionOptions) -> Self {
        Self {
            rasterizer,
            recognizer,
            options,
        }
    }
}

impl<Z: PageRasterizer, E: TextRecognizer> TableStrategy for OcrFallbackStrategy<Z, E> {
    fn name(&self) -> &'static str {
        "ocr-fallback"
    }

    fn provenance(&self) -> Provenance {
        Provenance::Ocr
    }

    #[allow(clippy::cast_precision_loss)]
    fn extract_tables(&self, bytes: &[u8]) -> Result<Vec<RawTable>> {
        let pages = self.rasterizer.rasterize(bytes, self.options.render_dpi)?;
        let radius = block_radius_for_dpi(self.options.render_dpi);
        let mut tables = Vec::new();

        for (page_index, image) in pages.into_iter().enumerate() {
            let page_width = image.width() as f32;
            let prepared = DynamicImage::ImageLuma8(prepare_page(&image, radius));

            let tokens = match self.recognizer.recognize(&prepared) {
                Ok(tokens) => tokens,
                Err(err @ OcrError::ModelLoad(_)) => {
                    return Err(ExtractError::CapabilityUnavailable(err.to_string()));
                }
                Err(err) => {
                    // A failed page is a data problem, not an environment
                    // one; keep going with the remaining pages.
                    log::warn!("OCR failed on page {page_index}: {err}");
                    continue;
                }
            };

            let cells: Vec<TextCell> = tokens
                .into_iter()
                .filter(|t| t.confidence >= self.options.min_token_confidence)
                .map(|t| TextCell::new(t.text, t.bbox))
                .collect();

            for region in split_at_gutter(cells, page_width, self.options.gutter_split_ratio) {
                if let Some(grid) = cluster_region(&region, &self.options) {
                    tables.push(RawTable::new(grid, Provenance::Ocr, page_index));
                }
            }
        }

        log::debug!("OCR fallback produced {} candidate table(s)", tables.len());
        Ok(tables)
    }
}
