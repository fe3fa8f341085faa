use serde::{Deserialize, Serialize};

/// Currency used when a feed gives none, or none that is recognized.
pub const DEFAULT_CURRENCY: &str = "USD";

/// A row after field mapping but before validation.
///
/// `price` is kept as the trimmed source text so that validation can tell
/// "absent" apart from "present but not a number".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRow {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub currency: String,
    pub stock: i64,
    pub incoming_stock: i64,
    pub supplier_name: Option<String>,
}

/// A validated product row, ready for aggregation and upsert.
///
/// `sku` and `name` are non-empty, `currency` is a recognized three-letter
/// code and `price`, when present, is finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRow {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: String,
    pub stock: i64,
    pub incoming_stock: i64,
    pub supplier_name: Option<String>,
}

impl CanonicalRow {
    /// Minimal row for the given SKU and name; everything else defaulted.
    pub fn new(sku: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            description: None,
            price: None,
            currency: DEFAULT_CURRENCY.to_owned(),
            stock: 0,
            incoming_stock: 0,
            supplier_name: None,
        }
    }
}
