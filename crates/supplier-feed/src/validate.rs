use crate::product::{CanonicalRow, NormalizedRow};

/// A single reason a row was rejected. `Display` is the message reported
/// back to callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid price value")]
    InvalidPrice,
}

/// Outcome of validating one normalized row.
#[derive(Debug, Clone)]
pub struct RowValidation {
    pub valid: bool,
    pub errors: Vec<RowError>,
    pub data: NormalizedRow,
}

impl RowValidation {
    /// Convert a passing row into its canonical form.
    pub fn into_canonical(self) -> Result<CanonicalRow, Vec<RowError>> {
        if !self.valid {
            return Err(self.errors);
        }

        let data = self.data;
        let (Some(sku), Some(name)) = (data.sku, data.name) else {
            return Err(self.errors);
        };
        let price = match data.price.as_deref() {
            Some(text) => Some(parse_price(text).ok_or_else(|| vec![RowError::InvalidPrice])?),
            None => None,
        };

        Ok(CanonicalRow {
            sku,
            name,
            description: data.description,
            price,
            currency: data.currency,
            stock: data.stock,
            incoming_stock: data.incoming_stock,
            supplier_name: data.supplier_name,
        })
    }
}

/// Check required fields and the price. All rules run; errors accumulate.
pub fn validate_row(row: NormalizedRow) -> RowValidation {
    let mut errors = Vec::new();

    if is_blank(row.sku.as_deref()) {
        errors.push(RowError::MissingField("sku"));
    }
    if is_blank(row.name.as_deref()) {
        errors.push(RowError::MissingField("name"));
    }
    if let Some(price) = row.price.as_deref()
        && parse_price(price).is_none()
    {
        errors.push(RowError::InvalidPrice);
    }

    RowValidation {
        valid: errors.is_empty(),
        errors,
        data: row,
    }
}

/// Render row errors as `first; second; ...`.
pub fn join_errors(errors: &[RowError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A price is a finite, non-negative number.
fn parse_price(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
