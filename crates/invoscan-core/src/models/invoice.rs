//! Invoice data extracted from raw document text.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Literal emitted for a payment field whose pattern did not match.
pub const NOT_FOUND: &str = "Not found";

/// One row of an invoice's itemized table.
///
/// Numeric columns stay as strings so thousands separators and currency
/// markers survive for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Leading serial number, when the row pattern has an index column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,

    /// Item description.
    pub description: String,

    /// Unit price or unit cost.
    pub unit_price: String,

    /// Quantity.
    pub quantity: String,

    /// Line total.
    pub amount: String,
}

impl LineItem {
    /// Whether two rows carry the same data, ignoring the serial number.
    pub fn same_row(&self, other: &LineItem) -> bool {
        self.description == other.description
            && self.unit_price == other.unit_price
            && self.quantity == other.quantity
            && self.amount == other.amount
    }
}

/// Value of a single payment field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// The field's pattern matched.
    Found(String),
    /// The field's pattern did not match anywhere in the text.
    NotFound,
}

impl FieldValue {
    /// The matched value, if any.
    pub fn as_found(&self) -> Option<&str> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }

    /// Display form; `NotFound` renders as the sentinel.
    pub fn as_str(&self) -> &str {
        self.as_found().unwrap_or(NOT_FOUND)
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Named summary fields of an invoice, in rule-table order.
///
/// Every configured key is present; unmatched keys hold [`FieldValue::NotFound`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentDetails {
    fields: Vec<(String, FieldValue)>,
}

impl PaymentDetails {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing an earlier value for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields whose pattern matched.
    pub fn found_count(&self) -> usize {
        self.fields.iter().filter(|(_, v)| v.is_found()).count()
    }
}

impl Serialize for PaymentDetails {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Everything extracted from one document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Raw text produced by the text source.
    pub raw_text: String,

    /// Line items in order of appearance.
    pub items: Vec<LineItem>,

    /// Payment summary fields.
    pub payment_details: PaymentDetails,

    /// Name of the text source that produced `raw_text`.
    pub source: &'static str,
}
