//! Uploaded documents and the text they yield.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::InvoscanError;

/// Kind of document, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// JPEG or PNG image.
    Image,
    /// PDF document.
    Pdf,
}

impl DocumentKind {
    /// Extensions accepted for upload, with the leading dot.
    pub const SUPPORTED_EXTENSIONS: [&'static str; 4] = [".jpg", ".jpeg", ".png", ".pdf"];

    /// Map a lower-cased extension (with leading dot) to a kind.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            ".jpg" | ".jpeg" | ".png" => Some(Self::Image),
            ".pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => f.write_str("image"),
            Self::Pdf => f.write_str("pdf"),
        }
    }
}

/// Lower-cased extension of a file name, with the leading dot, or an empty
/// string when there is none.
pub fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// A persisted upload inside a request's scratch space.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// Where the bytes were written.
    pub path: PathBuf,
    /// File name as sent by the client.
    pub original_filename: String,
    /// Lower-cased extension with leading dot.
    pub extension: String,
}

impl UploadedDocument {
    /// Detected kind, or an error naming the unsupported extension.
    pub fn kind(&self) -> Result<DocumentKind, InvoscanError> {
        DocumentKind::from_extension(&self.extension)
            .ok_or_else(|| InvoscanError::UnsupportedFileType(self.extension.clone()))
    }
}

/// Text recognized or extracted from one document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawText(String);

impl RawText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Join per-page texts with a newline.
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = pages
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Self(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for RawText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
