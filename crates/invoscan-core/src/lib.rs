//! Core library for invoice text extraction.
//!
//! This crate provides:
//! - Text sources for uploaded documents (image OCR, PDF text, PDF page OCR)
//! - A configurable rule table for line items and payment details
//! - The upload pipeline with per-request scratch storage
//! - An axum HTTP API (feature `api`)

pub mod error;
pub mod invoice;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod scratch;
pub mod source;

#[cfg(feature = "api")]
pub mod api;

pub use error::{InvoscanError, Result};
pub use invoice::{CompiledRules, InvoiceExtractor, RuleTable};
pub use models::config::InvoscanConfig;
pub use models::document::{DocumentKind, RawText, UploadedDocument};
pub use models::invoice::{ExtractionResult, FieldValue, LineItem, PaymentDetails};
pub use ocr::{OcrBackend, OcrResult, TextBox};
pub use pdf::{PdfProcessor, PdfType};
pub use pipeline::Pipeline;
pub use source::{SourceRegistry, TextSource};
