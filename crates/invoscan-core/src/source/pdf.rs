//! PDF adapters: embedded text, per-page OCR, and automatic selection.

use std::fs;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{PdfError, Result};
use crate::models::document::{DocumentKind, RawText, UploadedDocument};
use crate::ocr::OcrBackend;
use crate::pdf::{PdfAnalysis, PdfExtractor, PdfProcessor, PdfType};
use crate::scratch::Scratch;

use super::{SourceText, TextSource};

fn load(document: &UploadedDocument) -> Result<PdfExtractor> {
    let data = fs::read(&document.path)?;
    let mut extractor = PdfExtractor::new();
    extractor.load(&data)?;
    debug!(
        "Loaded {} ({} pages)",
        document.original_filename,
        extractor.page_count()
    );
    Ok(extractor)
}

/// The embedded text found during analysis, or the error that prevented it.
fn embedded(analysis: PdfAnalysis) -> Result<SourceText> {
    match analysis.text_error {
        Some(e) => Err(PdfError::TextExtraction(e).into()),
        None => Ok(SourceText::new(RawText::new(analysis.text), "pdf-text")),
    }
}

/// Embedded text via `pdf-extract`.
#[derive(Debug, Default)]
pub struct PdfTextSource;

impl PdfTextSource {
    pub fn new() -> Self {
        Self
    }
}

impl TextSource for PdfTextSource {
    fn name(&self) -> &'static str {
        "pdf-text"
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::Pdf
    }

    fn extract(&self, document: &UploadedDocument, _scratch: &Scratch) -> Result<SourceText> {
        let extractor = load(document)?;
        let text = extractor.extract_text()?;
        info!("Extracted {} chars of embedded text", text.len());
        Ok(SourceText::new(RawText::new(text), self.name()))
    }
}

/// OCR of each page's image, pages joined with a newline.
pub struct PdfOcrSource {
    ocr: Arc<dyn OcrBackend>,
    max_pages: usize,
}

impl PdfOcrSource {
    /// `max_pages` of 0 means every page.
    pub fn new(ocr: Arc<dyn OcrBackend>, max_pages: usize) -> Self {
        Self { ocr, max_pages }
    }

    fn ocr_pages(&self, extractor: &PdfExtractor, scratch: &Scratch) -> Result<RawText> {
        let page_count = extractor.page_count();
        let last = if self.max_pages == 0 {
            page_count
        } else {
            page_count.min(u32::try_from(self.max_pages).unwrap_or(u32::MAX))
        };
        if last < page_count {
            warn!("Only the first {} of {} pages will be recognized", last, page_count);
        }

        let mut pages = Vec::with_capacity(last as usize);
        for page in 1..=last {
            let image = extractor.page_image(page)?;
            let page_file = scratch.page_image(page, &image)?;
            let recognized = self.ocr.recognize_file(page_file.path());
            page_file.release();

            let text = recognized?;
            debug!("Page {}: {} chars", page, text.len());
            pages.push(text);
        }

        Ok(RawText::from_pages(pages))
    }
}

impl TextSource for PdfOcrSource {
    fn name(&self) -> &'static str {
        "pdf-ocr"
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::Pdf
    }

    fn extract(&self, document: &UploadedDocument, scratch: &Scratch) -> Result<SourceText> {
        let extractor = load(document)?;
        let text = self.ocr_pages(&extractor, scratch)?;
        info!("Recognized {} chars from {} pages", text.len(), extractor.page_count());
        Ok(SourceText::new(text, self.name()))
    }
}

/// Embedded text when there is enough of it, page OCR otherwise.
pub struct AutoPdfSource {
    ocr: PdfOcrSource,
    min_text_length: usize,
}

impl AutoPdfSource {
    pub fn new(ocr: PdfOcrSource, min_text_length: usize) -> Self {
        Self { ocr, min_text_length }
    }
}

impl TextSource for AutoPdfSource {
    fn name(&self) -> &'static str {
        "pdf-auto"
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::Pdf
    }

    fn extract(&self, document: &UploadedDocument, scratch: &Scratch) -> Result<SourceText> {
        let extractor = load(document)?;
        let analysis = extractor.analyze();
        let enough_text = analysis.text.trim().chars().count() >= self.min_text_length;

        debug!(
            "PDF type {:?}, {} chars of embedded text, {} images",
            analysis.pdf_type,
            analysis.text.len(),
            analysis.image_count
        );

        let pdf_type = analysis.pdf_type;
        match pdf_type {
            PdfType::Text => embedded(analysis),
            PdfType::Hybrid if enough_text => embedded(analysis),
            PdfType::Hybrid => match self.ocr.ocr_pages(&extractor, scratch) {
                Ok(text) => Ok(SourceText::new(text, self.ocr.name())),
                Err(e) => {
                    warn!("Page OCR failed, using embedded text instead: {}", e);
                    embedded(analysis)
                }
            },
            PdfType::Image => {
                let text = self.ocr.ocr_pages(&extractor, scratch)?;
                Ok(SourceText::new(text, self.ocr.name()))
            }
            PdfType::Empty => embedded(analysis),
        }
    }
}
