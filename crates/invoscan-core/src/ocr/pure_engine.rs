//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{OcrBackend, OcrResult, TextBox};

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    language: String,
    keep_unk: bool,
}

impl PureOcrEngine {
    /// Load the detection and recognition models for the configured language.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        let det_path = config.detection_path();
        let rec_path = config.recognition_path();
        let dict_path = config.dictionary_path();

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!("{} not found", path.display())));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!(
            "Loaded pure-onnx-ocr engine for {:?} from {}",
            config.language,
            config.model_dir.display()
        );

        Ok(Self {
            engine,
            language: config.language.clone(),
            keep_unk: config.keep_unk,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl OcrBackend for PureOcrEngine {
    fn name(&self) -> &str {
        "pure-onnx-ocr"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        debug!("Running OCR on {}x{} image", width, height);

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let boxes: Vec<TextBox> = results
            .iter()
            .map(|r| TextBox {
                bbox: polygon_to_bbox(&r.bounding_box),
                text: if self.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                },
                confidence: r.confidence,
            })
            .collect();

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!("OCR complete: {} text boxes in {}ms", boxes.len(), processing_time_ms);

        Ok(OcrResult::from_boxes(boxes, (width, height), processing_time_ms))
    }
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
///
/// Extracts the first 4 exterior points (quadrilateral) as
/// `[x1, y1, x2, y2, x3, y3, x4, y4]`.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}
