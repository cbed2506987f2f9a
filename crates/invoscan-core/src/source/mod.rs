//! Text source adapters.
//!
//! Each adapter turns one kind of document into [`RawText`]. The
//! [`SourceRegistry`] holds one adapter per [`DocumentKind`] and is the only
//! place the pipeline looks to decide how a document is read.

mod image_ocr;
mod pdf;

pub use image_ocr::ImageOcrSource;
pub use pdf::{AutoPdfSource, PdfOcrSource, PdfTextSource};

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::models::config::{InvoscanConfig, PdfMode};
use crate::models::document::{DocumentKind, RawText, UploadedDocument};
use crate::ocr::OcrBackend;
use crate::scratch::Scratch;

/// Text produced by an adapter, tagged with the adapter that produced it.
#[derive(Debug, Clone)]
pub struct SourceText {
    pub text: RawText,
    pub source: &'static str,
}

impl SourceText {
    pub fn new(text: RawText, source: &'static str) -> Self {
        Self { text, source }
    }
}

/// Produces raw text from a persisted document.
pub trait TextSource: Send + Sync {
    /// Adapter name, reported in results and logs.
    fn name(&self) -> &'static str;

    /// Kind of document this adapter reads.
    fn kind(&self) -> DocumentKind;

    /// Extract the document's text. Intermediate files go into `scratch`.
    fn extract(&self, document: &UploadedDocument, scratch: &Scratch) -> Result<SourceText>;
}

/// One adapter per document kind.
#[derive(Clone)]
pub struct SourceRegistry {
    image: Arc<dyn TextSource>,
    pdf: Arc<dyn TextSource>,
}

impl SourceRegistry {
    pub fn new(image: Arc<dyn TextSource>, pdf: Arc<dyn TextSource>) -> Self {
        Self { image, pdf }
    }

    /// Adapters for the configured OCR language and PDF mode.
    pub fn from_config(config: &InvoscanConfig, ocr: Arc<dyn OcrBackend>) -> Self {
        let image: Arc<dyn TextSource> =
            Arc::new(ImageOcrSource::new(ocr.clone(), config.ocr.language.clone()));

        let pdf: Arc<dyn TextSource> = match config.pdf.mode {
            PdfMode::Text => Arc::new(PdfTextSource::new()),
            PdfMode::Ocr => Arc::new(PdfOcrSource::new(ocr, config.pdf.max_pages)),
            PdfMode::Auto => Arc::new(AutoPdfSource::new(
                PdfOcrSource::new(ocr, config.pdf.max_pages),
                config.pdf.min_text_length,
            )),
        };

        debug!(
            "Text sources: image={}, pdf={} (mode {:?})",
            image.name(),
            pdf.name(),
            config.pdf.mode
        );

        Self { image, pdf }
    }

    /// Adapter for `kind`.
    pub fn for_kind(&self, kind: DocumentKind) -> &dyn TextSource {
        match kind {
            DocumentKind::Image => self.image.as_ref(),
            DocumentKind::Pdf => self.pdf.as_ref(),
        }
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("image", &self.image.name())
            .field("pdf", &self.pdf.name())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FixedOcr;
    use super::*;

    #[test]
    fn test_registry_follows_pdf_mode() {
        let ocr: Arc<dyn OcrBackend> = Arc::new(FixedOcr::new("x"));
        let mut config = InvoscanConfig::default();

        let registry = SourceRegistry::from_config(&config, ocr.clone());
        assert_eq!(registry.for_kind(DocumentKind::Pdf).name(), "pdf-auto");
        assert_eq!(registry.for_kind(DocumentKind::Image).name(), "image-ocr");

        config.pdf.mode = PdfMode::Text;
        let registry = SourceRegistry::from_config(&config, ocr.clone());
        assert_eq!(registry.for_kind(DocumentKind::Pdf).name(), "pdf-text");

        config.pdf.mode = PdfMode::Ocr;
        let registry = SourceRegistry::from_config(&config, ocr);
        assert_eq!(registry.for_kind(DocumentKind::Pdf).name(), "pdf-ocr");
        assert_eq!(registry.for_kind(DocumentKind::Pdf).kind(), DocumentKind::Pdf);
    }
}
