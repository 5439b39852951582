//! Capability seams consumed by the strategies.
//!
//! The pipeline treats PDF text reading and page rasterization as external
//! collaborators: strategies are written against these traits, production
//! wires in the pdfium implementations from [`crate::pdfium`], and tests
//! substitute synthetic pages.

use image::DynamicImage;
use pricelist_core::{BoundingBox, Result};

/// One positioned text span on a page, in page coordinates with a top-left
/// origin.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCell {
    /// Text content of the span.
    pub text: String,
    /// Position on the page.
    pub bbox: BoundingBox,
}

impl TextCell {
    /// Create a new cell.
    #[must_use]
    pub fn new(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// All positioned text of one page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageCells {
    /// Text spans in document order.
    pub cells: Vec<TextCell>,
    /// Page width in the same units as the cell boxes.
    pub width: f32,
    /// Page height in the same units as the cell boxes.
    pub height: f32,
}

/// Reads a PDF's embedded text layer with positions; no rasterization.
pub trait TextLayerReader: Send + Sync {
    /// Positioned text for every page of the document.
    ///
    /// # Errors
    ///
    /// [`pricelist_core::ExtractError::CorruptDocument`] when the bytes are
    /// not a readable PDF, [`pricelist_core::ExtractError::CapabilityUnavailable`]
    /// when the PDF library itself cannot be loaded.
    fn read_pages(&self, bytes: &[u8]) -> Result<Vec<PageCells>>;
}

/// Converts PDF pages to raster images at a requested resolution.
pub trait PageRasterizer: Send + Sync {
    /// Rasterize every page at `dpi` dots per inch.
    ///
    /// # Errors
    ///
    /// Same contract as [`TextLayerReader::read_pages`].
    fn rasterize(&self, bytes: &[u8], dpi: f32) -> Result<Vec<DynamicImage>>;
}
