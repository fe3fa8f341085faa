use serde_json::Value;

use crate::record::RawRecord;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Key holding the product array in an endpoint response.
pub const PRODUCTS_KEY: &str = "products";

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("{0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Lazy stream of [`RawRecord`]s over a decoded `products` array.
#[derive(Debug)]
pub struct JsonRows {
    items: std::vec::IntoIter<Value>,
}

impl JsonRows {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.len() == 0
    }
}

impl Iterator for JsonRows {
    type Item = RawRecord;

    fn next(&mut self) -> Option<RawRecord> {
        self.items.next().map(|item| to_record(&item))
    }
}

/// Decode an endpoint body and extract its `products` array.
///
/// The body is decoded as-is first; if that fails, a leading UTF-8 BOM is
/// stripped and decoding is retried. A document without a `products` array
/// yields no rows rather than an error.
pub fn decode_products(body: &[u8]) -> Result<JsonRows, DecodeError> {
    let document = match serde_json::from_slice::<Value>(body) {
        Ok(value) => value,
        Err(first_err) => match body.strip_prefix(UTF8_BOM) {
            Some(stripped) => serde_json::from_slice(stripped)?,
            None => return Err(first_err.into()),
        },
    };

    let items = match document {
        Value::Object(mut map) => match map.remove(PRODUCTS_KEY) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    Ok(JsonRows {
        items: items.into_iter(),
    })
}

/// Flatten one product object. Only scalar values are kept; `null` and
/// nested structures count as absent.
fn to_record(item: &Value) -> RawRecord {
    let Value::Object(fields) = item else {
        return RawRecord::new();
    };

    fields
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => return None,
            };
            Some((key.as_str(), text))
        })
        .collect()
}
