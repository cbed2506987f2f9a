//! OCR over uploaded images.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::models::document::{DocumentKind, RawText, UploadedDocument};
use crate::ocr::OcrBackend;
use crate::scratch::Scratch;

use super::{SourceText, TextSource};

/// Runs the OCR backend on a JPEG or PNG upload.
pub struct ImageOcrSource {
    ocr: Arc<dyn OcrBackend>,
    language: String,
}

impl ImageOcrSource {
    pub fn new(ocr: Arc<dyn OcrBackend>, language: impl Into<String>) -> Self {
        Self {
            ocr,
            language: language.into(),
        }
    }
}

impl TextSource for ImageOcrSource {
    fn name(&self) -> &'static str {
        "image-ocr"
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::Image
    }

    fn extract(&self, document: &UploadedDocument, _scratch: &Scratch) -> Result<SourceText> {
        debug!(
            "Running {} OCR ({}) on {}",
            self.ocr.name(),
            self.language,
            document.path.display()
        );

        let text = self.ocr.recognize_file(&document.path)?;
        info!("Recognized {} chars from {}", text.len(), document.original_filename);

        Ok(SourceText::new(RawText::new(text), self.name()))
    }
}
