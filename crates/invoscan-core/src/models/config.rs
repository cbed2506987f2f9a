//! Configuration structures for the extraction service.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the invoscan service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoscanConfig {
    /// HTTP server configuration.
    pub server: ServerConfig,

    /// OCR configuration.
    pub ocr: OcrConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Response formatting.
    pub response: ResponseConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    pub host: String,

    /// Port to listen on.
    pub port: u16,

    /// Maximum request body size in megabytes.
    pub max_upload_mb: usize,

    /// Directory for per-request scratch space (default: system temp dir).
    pub upload_dir: Option<PathBuf>,

    /// Upper bound on text extraction per request, in seconds.
    pub extraction_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_upload_mb: 50,
            upload_dir: None,
            extraction_timeout_secs: Some(120),
        }
    }
}

impl ServerConfig {
    /// Body limit in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }

    /// Resolved scratch root.
    pub fn upload_root(&self) -> PathBuf {
        self.upload_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Language profile (Tesseract-style code, e.g. "eng").
    pub language: String,

    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name (default derived from `language`).
    pub recognition_model: Option<String>,

    /// Character dictionary file name (default derived from `language`).
    pub dictionary: Option<String>,

    /// Keep `[UNK]` tokens in recognized text instead of replacing them with spaces.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: None,
            dictionary: None,
            keep_unk: false,
        }
    }
}

impl OcrConfig {
    /// Model family for the configured language profile.
    pub fn script(&self) -> &str {
        match self.language.as_str() {
            "eng" | "en" | "deu" | "fra" | "spa" | "ita" | "pol" | "por" | "nld" => "latin",
            other => other,
        }
    }

    /// Full path to the detection model.
    pub fn detection_path(&self) -> PathBuf {
        self.model_dir.join(&self.detection_model)
    }

    /// Full path to the recognition model.
    pub fn recognition_path(&self) -> PathBuf {
        match &self.recognition_model {
            Some(name) => self.model_dir.join(name),
            None => self.model_dir.join(format!("{}_rec.onnx", self.script())),
        }
    }

    /// Full path to the character dictionary.
    pub fn dictionary_path(&self) -> PathBuf {
        match &self.dictionary {
            Some(name) => self.model_dir.join(name),
            None => self.model_dir.join(format!("{}_dict.txt", self.script())),
        }
    }
}

/// How PDF uploads are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfMode {
    /// Embedded text only.
    Text,
    /// Page images through OCR only.
    Ocr,
    /// Pick per document based on its content.
    #[default]
    Auto,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Text source used for PDFs.
    pub mode: PdfMode,

    /// Maximum pages to OCR (0 = unlimited).
    pub max_pages: usize,

    /// Minimum text length to consider PDF as text-based.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            mode: PdfMode::Auto,
            max_pages: 10,
            min_text_length: 50,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// JSON rule table; built-in rules are used when unset.
    pub rules_file: Option<PathBuf>,
}

/// Response formatting configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Replace an empty item list with a "No items found" message.
    pub empty_placeholders: bool,
}

impl InvoscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
