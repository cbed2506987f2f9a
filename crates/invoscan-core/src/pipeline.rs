//! Upload processing: persist, detect, extract text, extract fields.
//!
//! A request moves through [`Stage`]s in order and may fail at any of them.
//! Its scratch directory is released on every path out.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info};

use crate::error::{InvoscanError, Result};
use crate::invoice::{CompiledRules, InvoiceExtractor, RuleTable};
use crate::invoice::rules::DEFAULT_RULES;
use crate::models::config::InvoscanConfig;
use crate::models::document::UploadedDocument;
use crate::models::invoice::ExtractionResult;
use crate::ocr::{load_backend, OcrBackend};
use crate::scratch::Scratch;
use crate::source::SourceRegistry;

/// Where a request is in its processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    TypeDetected,
    TextExtracted,
    FieldsExtracted,
    Responded,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::TypeDetected => "type-detected",
            Self::TextExtracted => "text-extracted",
            Self::FieldsExtracted => "fields-extracted",
            Self::Responded => "responded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Everything needed to process uploads; shared read-only across requests.
#[derive(Debug)]
pub struct Pipeline {
    config: InvoscanConfig,
    sources: SourceRegistry,
    extractor: InvoiceExtractor,
}

impl Pipeline {
    pub fn new(config: InvoscanConfig, sources: SourceRegistry, rules: Arc<CompiledRules>) -> Self {
        Self {
            config,
            sources,
            extractor: InvoiceExtractor::new(rules),
        }
    }

    /// Build from configuration: rule table from `extraction.rules_file`
    /// (built-in rules when unset) and the configured OCR engine.
    pub fn from_config(config: InvoscanConfig) -> Result<Self> {
        let ocr = load_backend(&config.ocr);
        Self::with_ocr(config, ocr)
    }

    /// Like [`Pipeline::from_config`] with a given OCR backend.
    pub fn with_ocr(config: InvoscanConfig, ocr: Arc<dyn OcrBackend>) -> Result<Self> {
        let rules = load_rules(&config)?;
        let sources = SourceRegistry::from_config(&config, ocr);
        Ok(Self::new(config, sources, rules))
    }

    pub fn config(&self) -> &InvoscanConfig {
        &self.config
    }

    pub fn extractor(&self) -> &InvoiceExtractor {
        &self.extractor
    }

    /// Process uploaded bytes.
    pub fn run_upload(&self, filename: &str, data: &[u8]) -> Result<ExtractionResult> {
        let scratch = Scratch::create_in(&self.config.server.upload_root())?;
        let outcome = scratch
            .persist_upload(filename, data)
            .map_err(InvoscanError::from)
            .and_then(|document| self.process(&document, &scratch));
        scratch.close();
        outcome
    }

    /// Process a local file. The file is copied first and left untouched.
    pub fn run_file(&self, path: &Path) -> Result<ExtractionResult> {
        let scratch = Scratch::create_in(&self.config.server.upload_root())?;
        let outcome = scratch
            .persist_copy(path)
            .map_err(InvoscanError::from)
            .and_then(|document| self.process(&document, &scratch));
        scratch.close();
        outcome
    }

    fn process(&self, document: &UploadedDocument, scratch: &Scratch) -> Result<ExtractionResult> {
        let start = Instant::now();
        let mut stage = Stage::Received;
        info!("Processing {:?}", document.original_filename);

        let outcome = self.advance(document, scratch, &mut stage);
        match &outcome {
            Ok(result) => info!(
                "Finished {:?} via {} in {}ms",
                document.original_filename,
                result.source,
                start.elapsed().as_millis()
            ),
            Err(e) if e.is_client_error() => {
                info!("Rejected {:?} at {}: {}", document.original_filename, stage, e)
            }
            Err(e) => error!(
                "Failed {:?} after {}: {}",
                document.original_filename, stage, e
            ),
        }
        outcome
    }

    fn advance(
        &self,
        document: &UploadedDocument,
        scratch: &Scratch,
        stage: &mut Stage,
    ) -> Result<ExtractionResult> {
        let kind = document.kind()?;
        *stage = Stage::TypeDetected;
        debug!("{:?} is a {} document", document.original_filename, kind);

        let source = self.sources.for_kind(kind);
        let text = source.extract(document, scratch)?;
        *stage = Stage::TextExtracted;
        debug!("{} produced {} chars", text.source, text.text.len());

        let result = self.extractor.extract(text.text, text.source);
        *stage = Stage::FieldsExtracted;
        Ok(result)
    }
}

/// Compile the configured rule table, or share the built-in one.
pub fn load_rules(config: &InvoscanConfig) -> Result<Arc<CompiledRules>> {
    match &config.extraction.rules_file {
        Some(path) => {
            let table = RuleTable::from_file(path).map_err(|e| {
                InvoscanError::Config(format!("rules file {}: {}", path.display(), e))
            })?;
            let rules = table.compile().map_err(|e| {
                InvoscanError::Config(format!("rules file {}: {}", path.display(), e))
            })?;
            info!("Loaded {} payment rules from {}", rules.payment.len(), path.display());
            Ok(Arc::new(rules))
        }
        None => Ok(Arc::new(DEFAULT_RULES.clone())),
    }
}
