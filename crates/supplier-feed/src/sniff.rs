//! Heuristics run once against the first line of a CSV feed: which
//! delimiter it uses, and whether its first record names the columns.

/// Candidate delimiters in tie-break order.
pub const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

const UTF8_BOM: &str = "\u{feff}";

/// Tokens that mark a normalized cell as a column name rather than data.
const HEADER_TOKENS: &[&str] = &[
    // sku-like
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
    // name-like
    "name",
    "product_name",
    "product_title",
    "title",
    "item_name",
    // generic identity/contact columns seen in supplier exports
    "company",
    "first_name",
    "firstname",
    "last_name",
    "lastname",
    "customer_id",
    "index",
    "phone",
    "phone_1",
    "phone1",
    "email",
    "address",
    "city",
    "state",
    "zip",
    "country",
];

/// Pick the delimiter that occurs most often in `line`.
///
/// Ties go to the earlier candidate in [`CANDIDATE_DELIMITERS`]. When no
/// candidate occurs at all, `default` is returned.
pub fn detect_delimiter(line: &str, default: u8) -> u8 {
    let mut best = None;
    let mut best_count = 0usize;

    for candidate in CANDIDATE_DELIMITERS {
        let count = line.bytes().filter(|b| *b == candidate).count();
        if count > best_count {
            best = Some(candidate);
            best_count = count;
        }
    }

    best.unwrap_or(default)
}

/// Canonical form of a header cell: BOM stripped, trimmed, spaces, dashes
/// and dots turned into underscores, anything else non-alphanumeric dropped,
/// lower-cased.
pub fn normalize_header(cell: &str) -> String {
    strip_bom(cell)
        .trim()
        .chars()
        .filter_map(|c| match c {
            ' ' | '-' | '.' => Some('_'),
            c if c.is_ascii_alphanumeric() || c == '_' => Some(c.to_ascii_lowercase()),
            _ => None,
        })
        .collect()
}

/// True if any already-normalized cell is a known header token.
pub fn is_likely_header<S: AsRef<str>>(normalized_cells: &[S]) -> bool {
    normalized_cells
        .iter()
        .any(|cell| HEADER_TOKENS.contains(&cell.as_ref()))
}

/// Column keys used when the first record turns out to be data.
pub fn positional_keys(width: usize) -> Vec<String> {
    (0..width).map(|i| format!("col_{i}")).collect()
}

pub fn strip_bom(s: &str) -> &str {
    s.strip_prefix(UTF8_BOM).unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_semicolon_when_dominant() {
        let line = "sku;name;price;stock;currency;supplier, inc";
        assert_eq!(detect_delimiter(line, b','), b';');
    }

    #[test]
    fn detects_tab_and_pipe() {
        assert_eq!(detect_delimiter("sku\tname\tprice", b','), b'\t');
        assert_eq!(detect_delimiter("sku|name|price", b','), b'|');
    }

    #[test]
    fn ties_prefer_comma() {
        assert_eq!(detect_delimiter("a,b;c", b'|'), b',');
        assert_eq!(detect_delimiter("a;b|c", b','), b';');
    }

    #[test]
    fn falls_back_to_default_without_candidates() {
        assert_eq!(detect_delimiter("justonecolumn", b';'), b';');
        assert_eq!(detect_delimiter("", b','), b',');
    }

    #[test]
    fn normalizes_header_cells() {
        assert_eq!(normalize_header("\u{feff}SKU"), "sku");
        assert_eq!(normalize_header("  Product Name "), "product_name");
        assert_eq!(normalize_header("Phone-1"), "phone_1");
        assert_eq!(normalize_header("item.code"), "item_code");
        assert_eq!(normalize_header("Price (USD)*"), "price_usd");
        assert_eq!(normalize_header("incoming qty"), "incoming_qty");
    }

    #[test]
    fn recognizes_header_rows() {
        let cells: Vec<String> = ["sku", "name", "price"]
            .iter()
            .map(|c| normalize_header(c))
            .collect();
        assert!(is_likely_header(&cells));

        let contacts: Vec<String> = ["Index", "Customer Id", "Email"]
            .iter()
            .map(|c| normalize_header(c))
            .collect();
        assert!(is_likely_header(&contacts));
    }

    #[test]
    fn data_rows_are_not_headers() {
        let cells: Vec<String> = ["SKU-1", "Widget", "9.99"]
            .iter()
            .map(|c| normalize_header(c))
            .collect();
        assert!(!is_likely_header(&cells));
    }

    #[test]
    fn positional_keys_are_zero_based() {
        assert_eq!(positional_keys(3), vec!["col_0", "col_1", "col_2"]);
    }
}
