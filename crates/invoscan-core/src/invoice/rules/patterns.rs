//! Built-in rule table for English-language invoices.
//!
//! These are template heuristics: each pattern matches the invoices it was
//! written against and nothing more general is promised.

use lazy_static::lazy_static;

use super::{CompiledRules, ItemRules, PaymentRule, RuleTable, ValueShape};

/// Column header row: description, price, quantity, amount, in that order.
pub const ITEM_HEADER: &str = r"(?im)^[^\n]*\bdescription\b[^\n]*\b(?:unit\s*cost|unit\s*price|price|rate)\b[^\n]*\b(?:qty|quantity)\b[^\n]*\b(?:amount|total)\b[^\n]*$";

/// `1 Website design $500.00 2 $1,000.00`
pub const ITEM_ROW_INDEXED: &str = r"(?P<index>\d+)\s+(?P<description>.+?)\s+\$(?P<price>[\d,\.]+)\s+(?P<quantity>\d+)\s+\$(?P<amount>[\d,\.]+)";

/// `1 Widget A 10.00 3 30.00`, one row per line, no currency markers.
pub const ITEM_ROW_INDEXED_PLAIN: &str = r"(?m)^[ \t]*(?P<index>\d+)[ \t]+(?P<description>[A-Za-z][^\n$]*?)[ \t]+(?P<price>\d[\d,]*(?:\.\d+)?)[ \t]+(?P<quantity>\d+)[ \t]+(?P<amount>\d[\d,]*(?:\.\d+)?)[ \t]*$";

/// `Widget A 10.00 3 30.00`, one row per line, currency marker optional.
pub const ITEM_ROW_PLAIN: &str = r"(?m)^[ \t]*(?P<description>[A-Za-z][^\n$]*?)[ \t]+\$?(?P<price>\d[\d,]*(?:\.\d+)?)[ \t]+(?P<quantity>\d+)[ \t]+\$?(?P<amount>\d[\d,]*(?:\.\d+)?)[ \t]*$";

pub const TOTAL: &str = r"\b(?:Total Amount|Total Due|Grand Total|Total Payable|Total)\s*[:\-]?\s*\$?([\d,\.]+)";
pub const SUBTOTAL: &str = r"\b(?:Sub-?Total|Item Total|Amount Before Tax|Pre-Tax Total)\s*[:\-]?\s*\$?([\d,\.]+)";
pub const DISCOUNT: &str = r"\b(?:Discount|Rebate|Promotional Discount|Savings)\s*[:\-]?\s*\$?([\d,\.]+)";
pub const TAX: &str = r"\b(?:Tax|Sales Tax|VAT|GST|Tax Rate)\s*[:\-]?\s*\$?([\d,\.]+)";
pub const ACCOUNT_NUMBER: &str = r"\b(?:Account\s*#|A/C\s*#|Account\s*Number)\s*[:\-]?\s*([\d\s]+)";
pub const ACCOUNT_NAME: &str = r"\b(?:Account Name|A/C Name|Acc Holder|Account Holder)\s*[:\-]?\s*(.+)";
pub const DATE: &str = r"\b(?:Date\s*Issued|Invoice\s*Date|Date)\s*[:\-]?\s*([\d/\-]+)";

/// Everything between the terms label and the next section label.
pub const TERMS_AND_CONDITIONS: &str = r"(?s)\bTerms\s*(?:and|&)\s*Conditions\b\s*[:\-]?\s*(?P<value>.*?)\s*(?:\bSub-?total\b|\bPayment\s+Info\b|\bShipping\b|\z)";

impl Default for RuleTable {
    fn default() -> Self {
        Self {
            items: ItemRules {
                header: Some(ITEM_HEADER.to_string()),
                require_header: false,
                rows: vec![
                    ITEM_ROW_INDEXED.to_string(),
                    ITEM_ROW_INDEXED_PLAIN.to_string(),
                    ITEM_ROW_PLAIN.to_string(),
                ],
                dedupe: false,
            },
            payment: vec![
                PaymentRule::new("total", TOTAL, ValueShape::Amount),
                PaymentRule::new("subtotal", SUBTOTAL, ValueShape::Amount),
                PaymentRule::new("discount", DISCOUNT, ValueShape::Amount),
                PaymentRule::new("tax", TAX, ValueShape::Amount),
                PaymentRule::new("accountNumber", ACCOUNT_NUMBER, ValueShape::Digits),
                PaymentRule::new("accountName", ACCOUNT_NAME, ValueShape::Text),
                PaymentRule::new("date", DATE, ValueShape::Date),
                PaymentRule::new("termsAndConditions", TERMS_AND_CONDITIONS, ValueShape::Text)
                    .collapse_whitespace(),
            ],
        }
    }
}

lazy_static! {
    /// The built-in table, compiled once.
    pub static ref DEFAULT_RULES: CompiledRules = RuleTable::default()
        .compile()
        .unwrap();
}
