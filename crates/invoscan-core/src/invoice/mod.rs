//! Invoice field extraction.

mod extractor;
pub mod rules;

pub use extractor::{extract_line_items, extract_payment_details, InvoiceExtractor};
pub use rules::{CompiledRules, FieldExtractor, RuleTable, ValueShape};
