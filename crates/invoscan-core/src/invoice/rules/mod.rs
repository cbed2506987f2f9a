//! Rule table for field extraction.
//!
//! A [`RuleTable`] is plain data (loaded from JSON or taken from
//! [`patterns`]); [`RuleTable::compile`] turns it into [`CompiledRules`],
//! whose rules implement [`FieldExtractor`].

pub mod amounts;
pub mod dates;
pub mod patterns;

pub use amounts::parse_amount;
pub use dates::{is_date_like, parse_date};
pub use patterns::DEFAULT_RULES;

use std::path::Path;

use regex::{Captures, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RuleError;
use crate::models::invoice::LineItem;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// What a captured value must look like to be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueShape {
    /// A money amount, e.g. `1,234.56` or `$99`.
    Amount,
    /// Digit groups separated by `/`, `-` or `.`.
    Date,
    /// Digits, optionally grouped by spaces.
    Digits,
    /// Any non-empty text.
    #[default]
    Text,
}

impl ValueShape {
    /// Whether `value` has this shape.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::Amount => parse_amount(value).is_some(),
            Self::Date => is_date_like(value),
            Self::Digits => {
                value.chars().any(|c| c.is_ascii_digit())
                    && value.chars().all(|c| c.is_ascii_digit() || c.is_whitespace())
            }
            Self::Text => !value.is_empty(),
        }
    }
}

/// Line-item rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemRules {
    /// Pattern locating the item table's column header.
    pub header: Option<String>,

    /// Without a header match, report no items instead of scanning the whole text.
    pub require_header: bool,

    /// Row patterns, tried in order. Named groups: `index` (optional),
    /// `description`, `price`, `quantity`, `amount`.
    pub rows: Vec<String>,

    /// Drop rows identical to an earlier row.
    pub dedupe: bool,
}

impl Default for ItemRules {
    fn default() -> Self {
        Self {
            header: None,
            require_header: false,
            rows: Vec::new(),
            dedupe: false,
        }
    }
}

/// One payment-detail field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRule {
    /// Output key, e.g. `total`.
    pub key: String,

    /// Label synonyms followed by the value capture (group `value` or group 1).
    pub pattern: String,

    /// Accepted value shape.
    #[serde(default)]
    pub shape: ValueShape,

    #[serde(default = "default_true")]
    pub case_insensitive: bool,

    /// Collapse whitespace runs (including newlines) to single spaces.
    #[serde(default)]
    pub collapse_whitespace: bool,
}

fn default_true() -> bool {
    true
}

impl PaymentRule {
    pub fn new(key: impl Into<String>, pattern: impl Into<String>, shape: ValueShape) -> Self {
        Self {
            key: key.into(),
            pattern: pattern.into(),
            shape,
            case_insensitive: true,
            collapse_whitespace: false,
        }
    }

    pub fn collapse_whitespace(mut self) -> Self {
        self.collapse_whitespace = true;
        self
    }
}

/// Externally configurable extraction rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleTable {
    pub items: ItemRules,
    pub payment: Vec<PaymentRule>,
}

impl RuleTable {
    /// Parse a rule table from JSON.
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a rule table from a JSON file.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> Result<String, RuleError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Compile every pattern, validating row groups and key uniqueness.
    pub fn compile(&self) -> Result<CompiledRules, RuleError> {
        let header = self
            .items
            .header
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| RuleError::Pattern {
                    rule: "items.header".to_string(),
                    source,
                })
            })
            .transpose()?;

        let rows = self
            .items
            .rows
            .iter()
            .enumerate()
            .map(|(index, pattern)| RowRule::compile(index, pattern))
            .collect::<Result<Vec<_>, _>>()?;

        let mut payment: Vec<PaymentFieldRule> = Vec::with_capacity(self.payment.len());
        for rule in &self.payment {
            if payment.iter().any(|p| p.key == rule.key) {
                return Err(RuleError::DuplicateField(rule.key.clone()));
            }
            payment.push(PaymentFieldRule::compile(rule)?);
        }

        debug!(
            "Compiled rule table: {} row patterns, {} payment fields",
            rows.len(),
            payment.len()
        );

        Ok(CompiledRules {
            header,
            require_header: self.items.require_header,
            rows,
            dedupe: self.items.dedupe,
            payment,
        })
    }
}

/// A compiled row pattern.
#[derive(Debug, Clone)]
pub struct RowRule {
    regex: Regex,
}

impl RowRule {
    const REQUIRED_GROUPS: [&'static str; 4] = ["description", "price", "quantity", "amount"];

    fn compile(index: usize, pattern: &str) -> Result<Self, RuleError> {
        let regex = Regex::new(pattern).map_err(|source| RuleError::Pattern {
            rule: format!("items.rows[{}]", index),
            source,
        })?;

        let names: Vec<&str> = regex.capture_names().flatten().collect();
        for group in Self::REQUIRED_GROUPS {
            if !names.contains(&group) {
                return Err(RuleError::MissingGroup { index, group });
            }
        }

        Ok(Self { regex })
    }

    fn to_item(caps: &Captures<'_>) -> LineItem {
        let group = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default()
        };

        LineItem {
            number: caps
                .name("index")
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty()),
            description: group("description"),
            unit_price: group("price"),
            quantity: group("quantity"),
            amount: group("amount"),
        }
    }
}

impl FieldExtractor for RowRule {
    type Output = LineItem;

    fn extract(&self, text: &str) -> Option<LineItem> {
        self.regex.captures(text).map(|caps| Self::to_item(&caps))
    }

    fn extract_all(&self, text: &str) -> Vec<LineItem> {
        self.regex
            .captures_iter(text)
            .map(|caps| Self::to_item(&caps))
            .collect()
    }
}

/// A compiled payment-detail rule.
#[derive(Debug, Clone)]
pub struct PaymentFieldRule {
    pub key: String,
    regex: Regex,
    shape: ValueShape,
    collapse_whitespace: bool,
}

impl PaymentFieldRule {
    fn compile(rule: &PaymentRule) -> Result<Self, RuleError> {
        let regex = RegexBuilder::new(&rule.pattern)
            .case_insensitive(rule.case_insensitive)
            .build()
            .map_err(|source| RuleError::Pattern {
                rule: format!("payment.{}", rule.key),
                source,
            })?;

        Ok(Self {
            key: rule.key.clone(),
            regex,
            shape: rule.shape,
            collapse_whitespace: rule.collapse_whitespace,
        })
    }

    pub fn shape(&self) -> ValueShape {
        self.shape
    }

    /// The value captured by one match, before shape validation.
    fn value_of(&self, caps: &Captures<'_>) -> String {
        let raw = caps
            .name("value")
            .or_else(|| caps.get(1))
            .or_else(|| caps.get(0))
            .map(|m| m.as_str())
            .unwrap_or_default();

        if self.collapse_whitespace {
            raw.split_whitespace().collect::<Vec<_>>().join(" ")
        } else {
            raw.trim().to_string()
        }
    }
}

impl FieldExtractor for PaymentFieldRule {
    type Output = String;

    /// First match only; a first match of the wrong shape means no value.
    fn extract(&self, text: &str) -> Option<String> {
        let caps = self.regex.captures(text)?;
        let value = self.value_of(&caps);
        if self.shape.accepts(&value) {
            Some(value)
        } else {
            debug!("Rejected {:?} for {}: not a {:?}", value, self.key, self.shape);
            None
        }
    }

    fn extract_all(&self, text: &str) -> Vec<String> {
        self.regex
            .captures_iter(text)
            .map(|caps| self.value_of(&caps))
            .filter(|value| self.shape.accepts(value))
            .collect()
    }
}

/// A rule table ready to run.
#[derive(Debug, Clone)]
pub struct CompiledRules {
    pub(crate) header: Option<Regex>,
    pub(crate) require_header: bool,
    pub(crate) rows: Vec<RowRule>,
    pub(crate) dedupe: bool,
    pub(crate) payment: Vec<PaymentFieldRule>,
}

impl CompiledRules {
    /// Configured payment keys, in output order.
    pub fn payment_keys(&self) -> impl Iterator<Item = &str> {
        self.payment.iter().map(|rule| rule.key.as_str())
    }

    /// Byte offset where item rows start, or `None` when a required header is missing.
    pub(crate) fn item_region_start(&self, text: &str) -> Option<usize> {
        match self.header.as_ref().and_then(|h| h.find(text)) {
            Some(m) => Some(m.end()),
            None if self.require_header => None,
            None => Some(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_table_compiles() {
        let rules = RuleTable::default().compile().unwrap();
        let keys: Vec<&str> = rules.payment_keys().collect();
        assert_eq!(
            keys,
            vec![
                "total",
                "subtotal",
                "discount",
                "tax",
                "accountNumber",
                "accountName",
                "date",
                "termsAndConditions"
            ]
        );
        assert_eq!(rules.rows.len(), 3);
    }

    #[test]
    fn test_json_round_trip() {
        let json = RuleTable::default().to_json().unwrap();
        let table = RuleTable::from_json(&json).unwrap();
        assert_eq!(table.payment.len(), 8);
        assert_eq!(table.payment[6].shape, ValueShape::Date);
        assert!(table.payment[7].collapse_whitespace);
        assert!(table.compile().is_ok());
    }

    #[test]
    fn test_invalid_pattern_reported() {
        let table = RuleTable::from_json(
            r#"{"payment": [{"key": "total", "pattern": "Total (\\d+"}]}"#,
        )
        .unwrap();

        let err = table.compile().unwrap_err();
        assert!(matches!(err, RuleError::Pattern { ref rule, .. } if rule == "payment.total"));
    }

    #[test]
    fn test_row_pattern_requires_groups() {
        let table = RuleTable {
            items: ItemRules {
                rows: vec![r"(?P<description>\w+) (?P<price>\d+)".to_string()],
                ..ItemRules::default()
            },
            payment: Vec::new(),
        };

        let err = table.compile().unwrap_err();
        assert!(matches!(err, RuleError::MissingGroup { index: 0, group: "quantity" }));
    }

    #[test]
    fn test_duplicate_payment_key_rejected() {
        let table = RuleTable {
            items: ItemRules::default(),
            payment: vec![
                PaymentRule::new("total", "Total (\\d+)", ValueShape::Amount),
                PaymentRule::new("total", "Sum (\\d+)", ValueShape::Amount),
            ],
        };

        assert!(matches!(table.compile(), Err(RuleError::DuplicateField(k)) if k == "total"));
    }

    #[test]
    fn test_payment_rule_defaults_from_json() {
        let table =
            RuleTable::from_json(r#"{"payment": [{"key": "po", "pattern": "PO: (\\w+)"}]}"#).unwrap();
        let rule = &table.payment[0];
        assert!(rule.case_insensitive);
        assert_eq!(rule.shape, ValueShape::Text);

        let rules = table.compile().unwrap();
        assert_eq!(rules.payment[0].extract("po: AB12"), Some("AB12".to_string()));
    }

    #[test]
    fn test_value_shapes() {
        assert!(ValueShape::Amount.accepts("1,234.56"));
        assert!(!ValueShape::Amount.accepts("."));
        assert!(ValueShape::Digits.accepts("1234 5678"));
        assert!(!ValueShape::Digits.accepts("12a4"));
        assert!(ValueShape::Date.accepts("01/15/2024"));
        assert!(ValueShape::Date.accepts("2024"));
        assert!(ValueShape::Date.accepts("2024-13-45"));
        assert!(!ValueShape::Date.accepts("-"));
        assert!(ValueShape::Text.accepts("Jane Doe"));
        assert!(!ValueShape::Text.accepts(""));
    }
}
