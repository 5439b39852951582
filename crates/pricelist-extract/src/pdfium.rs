//! pdfium-backed capability implementations.
//!
//! PDFium's library initialization and document calls are not thread-safe;
//! all access goes through one process-wide lock. The batch pool still
//! parallelizes OCR and parsing — only the pdfium calls themselves
//! serialize.

use std::sync::Mutex;

use image::DynamicImage;
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;

use pricelist_core::{BoundingBox, ExtractError, Result};

use crate::capabilities::{PageCells, PageRasterizer, TextCell, TextLayerReader};

/// Serializes every pdfium call in the process.
static PDFIUM_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

const POINTS_PER_INCH: f32 = 72.0;

/// Bind to the system pdfium library, falling back to a bundled copy next
/// to the executable.
fn bind() -> Result<Pdfium> {
    Pdfium::bind_to_system_library()
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        })
        .map(Pdfium::new)
        .map_err(|e| {
            ExtractError::CapabilityUnavailable(format!("pdfium library not available: {e}"))
        })
}

fn corrupt(e: PdfiumError) -> ExtractError {
    ExtractError::CorruptDocument(e.to_string())
}

/// [`TextLayerReader`] over pdfium's text segment API.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumTextLayerReader;

impl TextLayerReader for PdfiumTextLayerReader {
    fn read_pages(&self, bytes: &[u8]) -> Result<Vec<PageCells>> {
        let _guard = PDFIUM_LOCK
            .lock()
            .map_err(|_| ExtractError::CapabilityUnavailable("pdfium lock poisoned".to_string()))?;
        let pdfium = bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(corrupt)?;

        let mut pages = Vec::new();
        for page in document.pages().iter() {
            let width = page.width().value;
            let height = page.height().value;
            let text = page.text().map_err(corrupt)?;

            let mut cells = Vec::new();
            for segment in text.segments().iter() {
                let content = segment.text();
                let trimmed = content.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let bounds = segment.bounds();
                // pdfium reports bottom-left origin coordinates; the
                // clustering code expects top-left.
                let left = bounds.left().value;
                let top = height - bounds.top().value;
                let bottom = height - bounds.bottom().value;
                cells.push(TextCell::new(
                    trimmed,
                    BoundingBox::new(
                        left,
                        top.min(bottom),
                        (bounds.right().value - left).max(0.0),
                        (bottom - top).abs(),
                    ),
                ));
            }

            pages.push(PageCells {
                cells,
                width,
                height,
            });
        }
        Ok(pages)
    }
}

/// [`PageRasterizer`] over pdfium's bitmap rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumRasterizer;

impl PageRasterizer for PdfiumRasterizer {
    #[allow(clippy::cast_possible_truncation)]
    fn rasterize(&self, bytes: &[u8], dpi: f32) -> Result<Vec<DynamicImage>> {
        let _guard = PDFIUM_LOCK
            .lock()
            .map_err(|_| ExtractError::CapabilityUnavailable("pdfium lock poisoned".to_string()))?;
        let pdfium = bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(corrupt)?;

        let scale = dpi.max(POINTS_PER_INCH) / POINTS_PER_INCH;
        let mut images = Vec::new();
        for page in document.pages().iter() {
            let target_width = (page.width().value * scale).round() as i32;
            let target_height = (page.height().value * scale).round() as i32;
            let config = PdfRenderConfig::new()
                .set_target_width(target_width)
                .set_target_height(target_height);
            let bitmap = page.render_with_config(&config).map_err(corrupt)?;
            images.push(bitmap.as_image());
        }
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These run with or without a system pdfium: garbage bytes must come
    // back as an error (capability or corrupt-document), never a panic.

    #[test]
    fn text_reader_rejects_garbage_bytes() {
        let result = PdfiumTextLayerReader.read_pages(b"not a pdf");
        assert!(result.is_err());
    }

    #[test]
    fn rasterizer_rejects_garbage_bytes() {
        let result = PdfiumRasterizer.rasterize(b"not a pdf", 400.0);
        assert!(result.is_err());
    }
}
