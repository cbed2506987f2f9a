//! Error types for the invoscan-core library.

use thiserror::Error;

/// Main error type for the invoscan library.
#[derive(Error, Debug)]
pub enum InvoscanError {
    /// The request carried no file part.
    #[error("no file uploaded")]
    NoFile,

    /// The uploaded file's extension is not one we can extract text from.
    #[error("unsupported file type: {0:?}")]
    UnsupportedFileType(String),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Rule table error.
    #[error("rule error: {0}")]
    Rules(#[from] RuleError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Text extraction did not finish in time.
    #[error("text extraction timed out after {0}s")]
    Timeout(u64),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl InvoscanError {
    /// Whether the error was caused by the caller's input rather than by an
    /// extraction engine or the host.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NoFile | Self::UnsupportedFileType(_))
    }
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to obtain a page image.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// No OCR engine is available in this process.
    #[error("OCR engine unavailable: {0}")]
    Unavailable(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors raised while loading a rule table.
#[derive(Error, Debug)]
pub enum RuleError {
    /// A pattern failed to compile.
    #[error("invalid pattern for {rule}: {source}")]
    Pattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    /// A row pattern lacks a required named group.
    #[error("row pattern {index} is missing the named group {group:?}")]
    MissingGroup { index: usize, group: &'static str },

    /// The same payment key was configured twice.
    #[error("duplicate payment field {0:?}")]
    DuplicateField(String),

    /// The rule file could not be parsed.
    #[error("failed to parse rule file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for the invoscan library.
pub type Result<T> = std::result::Result<T, InvoscanError>;
