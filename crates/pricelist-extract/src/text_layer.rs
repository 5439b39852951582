//! Text-layer extraction strategy.
//!
//! Reads the PDF's embedded text objects with positions and reconstructs
//! table-shaped regions purely from layout; no pixel is ever rendered.
//! Absence of tables is a normal outcome delegated to the selector's
//! sufficiency test.

use pricelist_core::{ExtractionOptions, Provenance, RawTable, Result};

use crate::capabilities::TextLayerReader;
use crate::cluster::{cluster_region, split_at_gutter};
use crate::selector::TableStrategy;

/// Table extraction from the embedded text layer.
pub struct TextLayerStrategy<R> {
    reader: R,
    options: ExtractionOptions,
}

impl<R> TextLayerStrategy<R> {
    /// Create the strategy over a text-layer reading capability.
    #[must_use]
    pub fn new(reader: R, options: ExtractionOptions) -> Self {
        Self {
            reader,
            options,
        }
    }
}

impl<R: TextLayerReader> TableStrategy for TextLayerStrategy<R> {
    fn name(&self) -> &'static str {
        "text-layer"
    }

    fn provenance(&self) -> Provenance {
        Provenance::TextLayer
    }

    fn extract_tables(&self, bytes: &[u8]) -> Result<Vec<RawTable>> {
        let pages = self.reader.read_pages(bytes)?;
        let mut tables = Vec::new();

        for (page_index, page) in pages.into_iter().enumerate() {
            let regions = split_at_gutter(page.cells, page.width, self.options.gutter_split_ratio);
            for region in regions {
                if let Some(grid) = cluster_region(&region, &self.options) {
                    tables.push(RawTable::new(grid, Provenance::TextLayer, page_index));
                }
            }
        }

        log::debug!("text layer produced {} candidate table(s)", tables.len());
        Ok(tables)
    }
}
