use crate::product::DEFAULT_CURRENCY;

/// ISO 4217 codes accepted from supplier feeds.
pub const ALLOWED_CURRENCIES: &[&str] = &[
    "USD", "EUR", "GBP", "NGN", "AED", "AUD", "CAD", "CHF", "CNY", "JPY", "INR", "ZAR", "BRL",
    "MXN", "SEK", "NOK", "DKK", "RUB", "PLN", "TRY", "SAR", "KWD", "QAR", "EGP", "KES", "SGD",
    "HKD", "NZD", "UAH", "RON", "HUF", "CZK", "MAD", "TND",
];

/// Coerce a free-form currency value to an allowed three-letter code.
///
/// The value is upper-cased and trimmed. An exact allowed code is returned
/// as-is; otherwise the first run of three consecutive letters that is an
/// allowed code wins; otherwise [`DEFAULT_CURRENCY`]. Never fails.
pub fn sanitize_currency(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return DEFAULT_CURRENCY.to_owned();
    };
    let value = raw.trim().to_uppercase();

    if is_allowed(&value) {
        return value;
    }

    value
        .as_bytes()
        .windows(3)
        .filter(|w| w.iter().all(u8::is_ascii_uppercase))
        .filter_map(|w| std::str::from_utf8(w).ok())
        .find(|candidate| is_allowed(candidate))
        .unwrap_or(DEFAULT_CURRENCY)
        .to_owned()
}

fn is_allowed(code: &str) -> bool {
    code.len() == 3 && ALLOWED_CURRENCIES.contains(&code)
}
