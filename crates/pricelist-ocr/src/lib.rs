//! OCR capability for pricelist-rs
//!
//! Recognizes text on rasterized PDF pages, keeping per-token bounding-box
//! geometry so the OCR fallback strategy can reconstruct tabular structure.
//!
//! The pipeline consumes this crate through the [`TextRecognizer`] seam; the
//! shipped implementation is [`OnnxOcrEngine`], a two-stage ONNX Runtime
//! pipeline (detection model finds text regions, recognition model reads
//! each region with CTC decoding). Raster preprocessing lives in
//! [`preprocess`].

mod engine;
pub mod preprocess;

pub use engine::OnnxOcrEngine;

use image::DynamicImage;
use pricelist_core::BoundingBox;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OCR-specific errors.
#[derive(Error, Debug)]
pub enum OcrError {
    /// A model or its character dictionary could not be loaded.
    #[error("failed to load OCR model: {0}")]
    ModelLoad(String),

    /// Inference (forward pass) failed.
    #[error("OCR inference failed: {0}")]
    Inference(String),

    /// The input image could not be prepared for the model.
    #[error("OCR preprocessing failed: {0}")]
    Preprocessing(String),

    /// Image dimensions unusable for recognition.
    #[error("invalid image dimensions: {0}x{1}")]
    InvalidDimensions(u32, u32),
}

/// One recognized token: text plus its bounding box on the input raster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrToken {
    /// Recognized text content.
    pub text: String,
    /// Bounding box in raster pixel coordinates.
    pub bbox: BoundingBox,
    /// Recognition confidence (0.0–1.0).
    pub confidence: f32,
}

impl OcrToken {
    /// Create a new token.
    #[must_use]
    pub const fn new(text: String, bbox: BoundingBox, confidence: f32) -> Self {
        Self {
            text,
            bbox,
            confidence,
        }
    }
}

/// The OCR capability seam.
///
/// The OCR fallback strategy is written against this trait; tests substitute
/// deterministic fakes, production wires in [`OnnxOcrEngine`].
pub trait TextRecognizer: Send + Sync {
    /// Recognize text on one raster image, returning tokens in reading
    /// order (top-to-bottom, then left-to-right).
    ///
    /// # Errors
    ///
    /// Returns [`OcrError`] when the engine cannot process the image; an
    /// image with no recognizable text is an empty token list, not an
    /// error.
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<OcrToken>, OcrError>;
}

/// Sort tokens into reading order: primary by vertical center, secondary by
/// left edge. Total order, so repeated runs over the same tokens are stable.
pub fn sort_reading_order(tokens: &mut [OcrToken]) {
    tokens.sort_by(|a, b| {
        a.bbox
            .center_y()
            .total_cmp(&b.bbox.center_y())
            .then(a.bbox.left.total_cmp(&b.bbox.left))
    });
}
