//! Extraction strategies for pricelist-rs
//!
//! Turns PDF bytes into [`RawTable`]s through two strategies sharing one
//! geometric core:
//!
//! ```text
//! bytes ──► TextLayerStrategy ──► positioned text spans ─┐
//!                                                        ├─► cluster ──► RawTable(s)
//! bytes ──► OcrFallbackStrategy ─► rasterize ► OCR ──────┘
//! ```
//!
//! The [`selector::StrategySelector`] tries the cheap text-layer strategy
//! first and falls back to OCR only when the sufficiency test fails, so the
//! expensive rasterize-and-recognize path runs solely for scanned documents.
//!
//! External capabilities (PDF text reading, page rasterization, character
//! recognition) enter through the seams in [`capabilities`] and
//! [`pricelist_ocr::TextRecognizer`]; the pdfium-backed implementations live
//! in [`pdfium`].

pub mod capabilities;
pub mod cluster;
pub mod ocr_fallback;
pub mod pdfium;
pub mod selector;
pub mod text_layer;

pub use capabilities::{PageCells, PageRasterizer, TextCell, TextLayerReader};
pub use ocr_fallback::OcrFallbackStrategy;
pub use pdfium::{PdfiumRasterizer, PdfiumTextLayerReader};
pub use selector::{StrategySelector, TableStrategy};
pub use text_layer::TextLayerStrategy;
