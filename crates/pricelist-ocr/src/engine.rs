//! Two-stage ONNX OCR engine.
//!
//! Stage one runs a DB-style text detection model over the page raster and
//! turns the probability map into axis-aligned text-region boxes. Stage two
//! crops each region, runs a CRNN recognition model and CTC-decodes the
//! output against a character dictionary.
//!
//! Models are ordinary PaddleOCR-family ONNX exports; they are discovered
//! through the `PRICELIST_OCR_MODELS` environment variable or a `models/`
//! directory next to the crate.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use imageproc::contours::find_contours;
use imageproc::morphology::dilate;
use ndarray::{Array3, Array4, ArrayView2, Axis};
use ort::{
    inputs,
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};

use pricelist_core::BoundingBox;

use crate::{sort_reading_order, OcrError, OcrToken, TextRecognizer};

/// Pixel scale for 8-bit images.
const PIXEL_MAX: f32 = 255.0;

/// Detection-stage tuning.
#[derive(Debug, Clone, PartialEq)]
struct DetectionParams {
    /// Probability threshold for the binary text mask.
    mask_thresh: f32,
    /// Mean-probability floor for keeping a candidate box.
    box_thresh: f32,
    /// Expansion ratio applied to each kept box (DB unclip).
    unclip_ratio: f32,
    /// Candidate boxes with a side shorter than this are noise.
    min_box_side: f32,
    /// Upper bound on candidate regions per page.
    max_candidates: usize,
    /// Longest image side fed to the detector; larger pages are scaled down.
    resize_limit: u32,
    /// Per-channel normalization mean (RGB).
    mean: [f32; 3],
    /// Per-channel normalization std (RGB).
    std: [f32; 3],
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            mask_thresh: 0.3,
            box_thresh: 0.5,
            unclip_ratio: 1.6,
            min_box_side: 3.0,
            max_candidates: 1000,
            resize_limit: 960,
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
        }
    }
}

/// Recognition-stage tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RecognitionParams {
    /// Fixed input height of the recognition model.
    input_height: u32,
    /// Maximum input width; wider crops are squeezed.
    max_width: u32,
}

impl Default for RecognitionParams {
    fn default() -> Self {
        Self {
            input_height: 48,
            max_width: 320,
        }
    }
}

/// ONNX Runtime OCR engine with per-token bounding boxes.
///
/// Sessions are wrapped in mutexes because ONNX Runtime inference borrows
/// the session mutably; the engine itself can then be shared across the
/// batch pool.
pub struct OnnxOcrEngine {
    det_session: Mutex<Session>,
    rec_session: Mutex<Session>,
    characters: Vec<String>,
    detection: DetectionParams,
    recognition: RecognitionParams,
}

impl OnnxOcrEngine {
    /// Create an engine from the default model locations.
    ///
    /// Looks for `det.onnx`, `rec.onnx` and `dict.txt` under, in order:
    /// the `PRICELIST_OCR_MODELS` environment variable, the crate's own
    /// `models/` directory, and `crates/pricelist-ocr/models` relative to
    /// the workspace root.
    ///
    /// # Errors
    ///
    /// Returns [`OcrError::ModelLoad`] when no model directory is found or
    /// a model fails to load.
    pub fn new() -> Result<Self, OcrError> {
        let dir = Self::find_models_dir()?;
        Self::with_models(&dir.join("det.onnx"), &dir.join("rec.onnx"), &dir.join("dict.txt"))
    }

    /// Create an engine from explicit model paths.
    ///
    /// # Errors
    ///
    /// Returns [`OcrError::ModelLoad`] when a model or the dictionary
    /// cannot be loaded.
    pub fn with_models(
        detection_model: &Path,
        recognition_model: &Path,
        character_dict: &Path,
    ) -> Result<Self, OcrError> {
        let det_session = Self::build_session(detection_model)?;
        let rec_session = Self::build_session(recognition_model)?;
        let characters = Self::load_character_dict(character_dict)?;

        Ok(Self {
            det_session: Mutex::new(det_session),
            rec_session: Mutex::new(rec_session),
            characters,
            detection: DetectionParams::default(),
            recognition: RecognitionParams::default(),
        })
    }

    fn build_session(model: &Path) -> Result<Session, OcrError> {
        Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level1))
            .and_then(|b| b.with_intra_threads(2))
            .and_then(|b| b.commit_from_file(model))
            .map_err(|e| OcrError::ModelLoad(format!("{}: {e}", model.display())))
    }

    fn find_models_dir() -> Result<PathBuf, OcrError> {
        if let Ok(dir) = std::env::var("PRICELIST_OCR_MODELS") {
            let path = PathBuf::from(dir);
            if path.is_dir() {
                return Ok(path);
            }
        }

        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let own = Path::new(&manifest_dir).join("models");
            if own.is_dir() {
                return Ok(own);
            }
            if let Some(parent) = Path::new(&manifest_dir).parent() {
                let sibling = parent.join("pricelist-ocr").join("models");
                if sibling.is_dir() {
                    return Ok(sibling);
                }
            }
        }

        let relative = Path::new("crates/pricelist-ocr/models");
        if relative.is_dir() {
            return Ok(relative.to_path_buf());
        }

        Err(OcrError::ModelLoad(
            "no OCR model directory found; set PRICELIST_OCR_MODELS or place \
             det.onnx/rec.onnx/dict.txt under crates/pricelist-ocr/models"
                .to_string(),
        ))
    }

    /// CTC dictionary: blank token at index 0, one entry per line, trailing
    /// space entry.
    fn load_character_dict(path: &Path) -> Result<Vec<String>, OcrError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| OcrError::ModelLoad(format!("{}: {e}", path.display())))?;

        let mut characters = vec!["blank".to_string()];
        characters.extend(
            raw.lines()
                .map(str::trim_end)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
        characters.push(" ".to_string());
        Ok(characters)
    }

    /// Detect text-region boxes on an image (detection stage only).
    ///
    /// # Errors
    ///
    /// Returns [`OcrError`] when preprocessing or inference fails.
    // Image coordinates are small integers, f32 is exact enough.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn detect_regions(&self, image: &DynamicImage) -> Result<Vec<BoundingBox>, OcrError> {
        let (src_w, src_h) = image.dimensions();
        if src_w < 8 || src_h < 8 {
            return Err(OcrError::InvalidDimensions(src_w, src_h));
        }

        // Scale so the longest side fits the limit, then snap both sides to
        // multiples of 32 as the detector expects.
        let limit = self.detection.resize_limit as f32;
        let longest = src_w.max(src_h) as f32;
        let ratio = if longest > limit { limit / longest } else { 1.0 };
        let resize_w = (((src_w as f32 * ratio) / 32.0).round().max(1.0) as u32) * 32;
        let resize_h = (((src_h as f32 * ratio) / 32.0).round().max(1.0) as u32) * 32;

        let resized = image.resize_exact(resize_w, resize_h, image::imageops::FilterType::CatmullRom);
        let rgb = resized.to_rgb8();

        let mut input = Array3::<f32>::zeros((3, resize_h as usize, resize_w as usize));
        for (x, y, pixel) in rgb.enumerate_pixels() {
            for c in 0..3 {
                input[[c, y as usize, x as usize]] =
                    (f32::from(pixel[c]) / PIXEL_MAX - self.detection.mean[c]) / self.detection.std[c];
            }
        }
        let input = input.insert_axis(Axis(0));

        let prob_map = {
            let mut session = self
                .det_session
                .lock()
                .map_err(|_| OcrError::Inference("detection session lock poisoned".to_string()))?;
            let input_ref: TensorRef<f32> = TensorRef::from_array_view(&input)
                .map_err(|e| OcrError::Inference(e.to_string()))?;
            let outputs = session
                .run(inputs![input_ref])
                .map_err(|e| OcrError::Inference(format!("detection: {e}")))?;
            let output = outputs[0]
                .try_extract_array::<f32>()
                .map_err(|e| OcrError::Inference(e.to_string()))?;
            output
                .into_owned()
                .into_dimensionality::<ndarray::Ix4>()
                .map_err(|e| OcrError::Inference(format!("detection output shape: {e}")))?
        };

        let pred = prob_map.index_axis(Axis(0), 0);
        let pred = pred.index_axis(Axis(0), 0);
        let (map_h, map_w) = (pred.shape()[0], pred.shape()[1]);

        let mut mask = GrayImage::new(map_w as u32, map_h as u32);
        for y in 0..map_h {
            for x in 0..map_w {
                let on = pred[[y, x]] > self.detection.mask_thresh;
                mask.put_pixel(x as u32, y as u32, Luma([if on { 255 } else { 0 }]));
            }
        }
        let mask = dilate(&mask, imageproc::distance_transform::Norm::L1, 1);

        let contours = find_contours::<u32>(&mask);
        let scale_x = src_w as f32 / map_w as f32;
        let scale_y = src_h as f32 / map_h as f32;

        let mut boxes = Vec::new();
        for contour in contours.iter().take(self.detection.max_candidates) {
            if contour.points.is_empty() {
                continue;
            }

            let min_x = contour.points.iter().map(|p| p.x).min().unwrap_or(0) as f32;
            let max_x = contour.points.iter().map(|p| p.x).max().unwrap_or(0) as f32;
            let min_y = contour.points.iter().map(|p| p.y).min().unwrap_or(0) as f32;
            let max_y = contour.points.iter().map(|p| p.y).max().unwrap_or(0) as f32;

            let bbox = BoundingBox::new(min_x, min_y, max_x - min_x, max_y - min_y);
            if bbox.width.min(bbox.height) < self.detection.min_box_side {
                continue;
            }
            if Self::mean_probability(&pred, &bbox) < self.detection.box_thresh {
                continue;
            }

            let expanded = expand_box(&bbox, self.detection.unclip_ratio);
            let left = (expanded.left * scale_x).clamp(0.0, src_w as f32 - 1.0);
            let top = (expanded.top * scale_y).clamp(0.0, src_h as f32 - 1.0);
            let right = (expanded.right() * scale_x).clamp(0.0, src_w as f32);
            let bottom = (expanded.bottom() * scale_y).clamp(0.0, src_h as f32);
            if right - left < self.detection.min_box_side || bottom - top < self.detection.min_box_side
            {
                continue;
            }
            boxes.push(BoundingBox::new(left, top, right - left, bottom - top));
        }

        boxes.sort_by(|a, b| {
            a.center_y()
                .total_cmp(&b.center_y())
                .then(a.left.total_cmp(&b.left))
        });
        Ok(boxes)
    }

    /// Mean probability of the detection map inside a box.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn mean_probability(pred: &ArrayView2<'_, f32>, bbox: &BoundingBox) -> f32 {
        let (map_h, map_w) = (pred.shape()[0], pred.shape()[1]);
        let x0 = (bbox.left.floor().max(0.0) as usize).min(map_w.saturating_sub(1));
        let x1 = (bbox.right().ceil() as usize).clamp(x0 + 1, map_w);
        let y0 = (bbox.top.floor().max(0.0) as usize).min(map_h.saturating_sub(1));
        let y1 = (bbox.bottom().ceil() as usize).clamp(y0 + 1, map_h);

        let mut sum = 0.0f32;
        let mut count = 0usize;
        for y in y0..y1 {
            for x in x0..x1 {
                sum += pred[[y, x]];
                count += 1;
            }
        }
        if count == 0 {
            0.0
        } else {
            sum / count as f32
        }
    }

    /// Recognize the text inside one detected region.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn read_region(&self, image: &DynamicImage, bbox: &BoundingBox) -> Result<(String, f32), OcrError> {
        let (src_w, src_h) = image.dimensions();
        let x = bbox.left.max(0.0) as u32;
        let y = bbox.top.max(0.0) as u32;
        let w = (bbox.width as u32).max(1).min(src_w.saturating_sub(x).max(1));
        let h = (bbox.height as u32).max(1).min(src_h.saturating_sub(y).max(1));
        let crop = image.crop_imm(x, y, w, h);

        let target_h = self.recognition.input_height;
        let aspect = crop.width() as f32 / crop.height().max(1) as f32;
        let target_w = ((target_h as f32 * aspect).round() as u32)
            .clamp(16, self.recognition.max_width);
        let resized = crop.resize_exact(target_w, target_h, image::imageops::FilterType::CatmullRom);
        let rgb = resized.to_rgb8();

        // Normalize to [-1, 1].
        let mut input = Array4::<f32>::zeros((1, 3, target_h as usize, target_w as usize));
        for (px, py, pixel) in rgb.enumerate_pixels() {
            for c in 0..3 {
                input[[0, c, py as usize, px as usize]] =
                    (f32::from(pixel[c]) / PIXEL_MAX - 0.5) / 0.5;
            }
        }

        let output = {
            let mut session = self
                .rec_session
                .lock()
                .map_err(|_| OcrError::Inference("recognition session lock poisoned".to_string()))?;
            let input_ref: TensorRef<f32> = TensorRef::from_array_view(&input)
                .map_err(|e| OcrError::Inference(e.to_string()))?;
            let outputs = session
                .run(inputs![input_ref])
                .map_err(|e| OcrError::Inference(format!("recognition: {e}")))?;
            let output = outputs[0]
                .try_extract_array::<f32>()
                .map_err(|e| OcrError::Inference(e.to_string()))?;
            output
                .into_owned()
                .into_dimensionality::<ndarray::Ix3>()
                .map_err(|e| OcrError::Inference(format!("recognition output shape: {e}")))?
        };

        Ok(ctc_decode(&output.index_axis(Axis(0), 0), &self.characters))
    }
}

impl TextRecognizer for OnnxOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<OcrToken>, OcrError> {
        let regions = self.detect_regions(image)?;
        log::debug!("detected {} text regions", regions.len());

        let mut tokens = Vec::with_capacity(regions.len());
        for bbox in regions {
            let (text, confidence) = self.read_region(image, &bbox)?;
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }
            tokens.push(OcrToken::new(trimmed.to_string(), bbox, confidence));
        }
        sort_reading_order(&mut tokens);
        Ok(tokens)
    }
}

/// Expand a detection box the way DB postprocessing unclips polygons: each
/// side moves outward by `area * ratio / perimeter`.
#[must_use]
fn expand_box(bbox: &BoundingBox, ratio: f32) -> BoundingBox {
    let area = bbox.width * bbox.height;
    let perimeter = 2.0 * (bbox.width + bbox.height);
    if perimeter <= 0.0 {
        return *bbox;
    }
    let offset = area * ratio / perimeter;
    BoundingBox::new(
        bbox.left - offset,
        bbox.top - offset,
        bbox.width + 2.0 * offset,
        bbox.height + 2.0 * offset,
    )
}

/// Greedy CTC decoding: per-timestep argmax, collapse repeats, drop the
/// blank token at index 0. Confidence is the mean winning probability over
/// emitted steps.
#[allow(clippy::cast_precision_loss)]
fn ctc_decode(pred: &ArrayView2<'_, f32>, characters: &[String]) -> (String, f32) {
    let mut text = String::new();
    let mut confidences = Vec::new();
    let mut previous = 0usize;

    for step in pred.axis_iter(Axis(0)) {
        let (best_idx, best_prob) = step
            .iter()
            .enumerate()
            .fold((0usize, f32::MIN), |acc, (idx, &p)| {
                if p > acc.1 {
                    (idx, p)
                } else {
                    acc
                }
            });

        if best_idx != 0 && best_idx != previous {
            if let Some(character) = characters.get(best_idx) {
                if character != "blank" {
                    text.push_str(character);
                    confidences.push(best_prob.clamp(0.0, 1.0));
                }
            }
        }
        previous = best_idx;
    }

    let confidence = if confidences.is_empty() {
        0.0
    } else {
        confidences.iter().sum::<f32>() / confidences.len() as f32
    };
    (text, confidence)
}
