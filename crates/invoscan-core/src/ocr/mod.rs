//! OCR backends.
//!
//! The pipeline only needs "image in, text out"; [`OcrBackend`] is that seam.
//! The native build ships a PaddleOCR engine running on `pure-onnx-ocr`.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// A detected text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Result of OCR processing on an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// Detected and recognized text boxes.
    pub boxes: Vec<TextBox>,

    /// Full text in reading order.
    pub text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrResult {
    /// Build a result from unordered boxes, sorting them into reading order.
    pub fn from_boxes(mut boxes: Vec<TextBox>, image_size: (u32, u32), processing_time_ms: u64) -> Self {
        sort_by_reading_order(&mut boxes);
        let text = join_lines(&boxes);
        Self {
            boxes,
            text,
            processing_time_ms,
            image_size,
        }
    }
}

/// Sort boxes top-to-bottom, then left-to-right within a 20px row band.
fn sort_by_reading_order(boxes: &mut [TextBox]) {
    boxes.sort_by(|a, b| {
        let (ax, ay, _, _) = a.rect();
        let (bx, by, _, _) = b.rect();

        let row_a = (ay / 20.0) as i32;
        let row_b = (by / 20.0) as i32;

        if row_a != row_b {
            row_a.cmp(&row_b)
        } else {
            ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
        }
    });
}

/// Boxes in the same row band are joined with a space, rows with newlines,
/// so table rows come out as one line each.
fn join_lines(boxes: &[TextBox]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current_row: Option<i32> = None;

    for text_box in boxes {
        let (_, y, _, _) = text_box.rect();
        let row = (y / 20.0) as i32;
        match (current_row, lines.last_mut()) {
            (Some(r), Some(line)) if r == row => {
                line.push(' ');
                line.push_str(&text_box.text);
            }
            _ => lines.push(text_box.text.clone()),
        }
        current_row = Some(row);
    }

    lines.join("\n")
}

/// An OCR engine.
pub trait OcrBackend: Send + Sync {
    /// Engine name for logs.
    fn name(&self) -> &str;

    /// Recognize text in a decoded image.
    fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, OcrError>;

    /// Recognize text in the image file at `path`.
    fn recognize_file(&self, path: &Path) -> Result<String, OcrError> {
        let image = image::open(path)
            .map_err(|e| OcrError::InvalidImage(format!("{}: {}", path.display(), e)))?;
        Ok(self.recognize(&image)?.text)
    }
}

/// Stand-in used when no engine could be loaded; every call fails with the
/// load error.
#[derive(Debug, Clone)]
pub struct UnavailableOcr {
    reason: String,
}

impl UnavailableOcr {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl OcrBackend for UnavailableOcr {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn recognize(&self, _image: &DynamicImage) -> Result<OcrResult, OcrError> {
        Err(OcrError::Unavailable(self.reason.clone()))
    }
}

/// Load the configured OCR engine.
///
/// A missing or broken model set does not stop the service: PDFs with
/// embedded text still work, and image requests fail individually.
pub fn load_backend(config: &OcrConfig) -> Arc<dyn OcrBackend> {
    #[cfg(feature = "native")]
    {
        match PureOcrEngine::from_config(config) {
            Ok(engine) => return Arc::new(engine),
            Err(e) => {
                warn!("OCR engine unavailable, image uploads will fail: {}", e);
                return Arc::new(UnavailableOcr::new(e.to_string()));
            }
        }
    }

    #[cfg(not(feature = "native"))]
    {
        warn!("Built without an OCR engine (language {:?})", config.language);
        Arc::new(UnavailableOcr::new("built without the native feature"))
    }
}
