//! PDF processing module.

mod extractor;
#[cfg(test)]
pub(crate) mod fixtures;

pub use extractor::{PdfAnalysis, PdfExtractor};

use crate::error::PdfError;
use image::DynamicImage;

/// Type of PDF content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfType {
    /// Contains extractable text.
    Text,
    /// Contains only images (scanned document).
    Image,
    /// Contains both text and images.
    Hybrid,
    /// Empty or unreadable.
    Empty,
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Analyze the PDF to determine its type. Any non-blank embedded text
    /// counts as text; how much is enough is left to the caller.
    fn analyze(&self) -> PdfAnalysis;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;

    /// Image content of a page (1-indexed), ready for OCR.
    fn page_image(&self, page: u32) -> Result<DynamicImage>;
}
