//! Maps arbitrary supplier field names onto the canonical product fields.
//!
//! Each canonical field has an ordered list of source keys, ending with the
//! positional key used when a CSV feed had no header row. The first key
//! holding a non-empty value wins; later keys are never consulted.

use crate::currency::sanitize_currency;
use crate::product::NormalizedRow;
use crate::record::RawRecord;

pub const SKU_KEYS: &[&str] = &[
    "sku",
    "product_sku",
    "sku_code",
    "product_code",
    "item_sku",
    "item_code",
    "code",
    "id",
    "product_id",
    "item_id",
    "customer_id",
    "col_0",
];

pub const NAME_KEYS: &[&str] = &[
    "name",
    "product_name",
    "product_title",
    "title",
    "item_name",
    "company",
    "col_1",
];

pub const DESCRIPTION_KEYS: &[&str] = &["description", "desc", "Description", "col_2"];

pub const PRICE_KEYS: &[&str] = &["price", "Price", "col_3"];

pub const CURRENCY_KEYS: &[&str] = &["currency", "Currency", "col_4"];

pub const STOCK_KEYS: &[&str] = &["stock", "Stock", "available_stock", "col_5"];

pub const INCOMING_STOCK_KEYS: &[&str] = &[
    "incoming_stock",
    "incoming",
    "incoming_qty",
    "Incoming",
    "incoming qty",
    "col_6",
];

pub const SUPPLIER_KEYS: &[&str] = &["supplier_name", "supplier", "Supplier", "col_7"];

const FIRST_NAME_KEYS: &[&str] = &["first_name", "firstname"];
const LAST_NAME_KEYS: &[&str] = &["last_name", "lastname"];
const CITY_KEYS: &[&str] = &["city"];
const COUNTRY_KEYS: &[&str] = &["country"];

/// Map one raw record onto canonical fields. Pure; never fails.
pub fn normalize_row(record: &RawRecord) -> NormalizedRow {
    let description =
        trimmed(record.first_present(DESCRIPTION_KEYS)).or_else(|| derive_description(record));

    NormalizedRow {
        sku: record.first_present(SKU_KEYS).map(|s| s.trim().to_owned()),
        name: record.first_present(NAME_KEYS).map(|s| s.trim().to_owned()),
        description,
        price: trimmed(record.first_present(PRICE_KEYS)),
        currency: sanitize_currency(record.first_present(CURRENCY_KEYS)),
        stock: parse_quantity(record.first_present(STOCK_KEYS)),
        incoming_stock: parse_quantity(record.first_present(INCOMING_STOCK_KEYS)),
        supplier_name: trimmed(record.first_present(SUPPLIER_KEYS)),
    }
}

/// Build a description from contact-style columns, e.g. `Jane Doe — Lagos, NG`.
///
/// Returns `None` when none of the person or location fields are present.
fn derive_description(record: &RawRecord) -> Option<String> {
    let person = join_present(&[FIRST_NAME_KEYS, LAST_NAME_KEYS], record, " ");
    let location = join_present(&[CITY_KEYS, COUNTRY_KEYS], record, ", ");

    let parts: Vec<String> = [person, location].into_iter().flatten().collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" — "))
    }
}

fn join_present(groups: &[&[&str]], record: &RawRecord, separator: &str) -> Option<String> {
    let parts: Vec<&str> = groups
        .iter()
        .filter_map(|keys| record.first_present(keys))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(separator))
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Lenient integer coercion for stock columns: whole numbers parse directly,
/// finite decimals truncate toward zero, anything else is 0.
pub fn parse_quantity(value: Option<&str>) -> i64 {
    let Some(value) = value.map(str::trim) else {
        return 0;
    };

    if let Ok(n) = value.parse::<i64>() {
        return n;
    }

    match value.parse::<f64>() {
        Ok(f) if f.is_finite() => f.trunc() as i64,
        _ => 0,
    }
}
