//! Rule-driven extraction of line items and payment details.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::models::document::RawText;
use crate::models::invoice::{ExtractionResult, FieldValue, LineItem, PaymentDetails};

use super::rules::{CompiledRules, FieldExtractor, DEFAULT_RULES};

/// Line items in order: pattern by pattern, text order within a pattern.
pub fn extract_line_items(rules: &CompiledRules, text: &str) -> Vec<LineItem> {
    let Some(start) = rules.item_region_start(text) else {
        debug!("No item header found, skipping line items");
        return Vec::new();
    };
    let region = &text[start..];

    let mut items: Vec<LineItem> = Vec::new();
    for row in &rules.rows {
        for item in row.extract_all(region) {
            if rules.dedupe && items.iter().any(|seen| seen.same_row(&item)) {
                continue;
            }
            items.push(item);
        }
    }

    items
}

/// Every configured key, each found or `NotFound`.
pub fn extract_payment_details(rules: &CompiledRules, text: &str) -> PaymentDetails {
    let mut details = PaymentDetails::new();
    for rule in &rules.payment {
        let value = match rule.extract(text) {
            Some(value) => FieldValue::Found(value),
            None => FieldValue::NotFound,
        };
        details.insert(rule.key.clone(), value);
    }
    details
}

/// Extractor bound to one compiled rule table.
#[derive(Debug, Clone)]
pub struct InvoiceExtractor {
    rules: Arc<CompiledRules>,
}

impl InvoiceExtractor {
    pub fn new(rules: Arc<CompiledRules>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &CompiledRules {
        &self.rules
    }

    /// Run both extractors over `text`.
    pub fn extract(&self, text: RawText, source: &'static str) -> ExtractionResult {
        let start = Instant::now();

        let items = extract_line_items(&self.rules, text.as_str());
        let payment_details = extract_payment_details(&self.rules, text.as_str());

        info!(
            "Extracted {} items and {}/{} payment fields from {} chars in {}ms",
            items.len(),
            payment_details.found_count(),
            payment_details.len(),
            text.len(),
            start.elapsed().as_millis()
        );

        ExtractionResult {
            raw_text: text.into_string(),
            items,
            payment_details,
            source,
        }
    }
}

impl Default for InvoiceExtractor {
    fn default() -> Self {
        Self::new(Arc::new(DEFAULT_RULES.clone()))
    }
}
