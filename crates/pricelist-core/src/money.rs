//! Currency token recognition and money parsing.
//!
//! Shared between the strategy selector (sufficiency test: "does this table
//! have a plausible cost column?") and the record parser (turning a cost
//! cell into a number).

use once_cell::sync::Lazy;
use regex::Regex;

/// A standalone amount: optional currency symbol, digits with optional
/// thousands separators, optional decimal part.
static CURRENCY_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[$€£]?\s*(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{1,4})?$").expect("static regex")
});

/// First symbol-marked amount inside a noisy cell, e.g. `$12.50/lb`.
static EMBEDDED_AMOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[$€£]\s*(\d{1,4}(?:\.\d{1,4})?)").expect("static regex"));

/// Whether a cell looks like a currency amount.
///
/// Used by the sufficiency test and by positional column inference; bare
/// integers count, since plenty of price lists omit the symbol and the
/// decimal part.
#[must_use]
pub fn is_currency_token(cell: &str) -> bool {
    let trimmed = cell.trim();
    !trimmed.is_empty() && CURRENCY_TOKEN_RE.is_match(trimmed)
}

/// Whether a cell carries an explicit price marker (currency symbol or
/// decimal part), as opposed to a bare integer that could be a quantity.
#[must_use]
pub fn is_marked_price(cell: &str) -> bool {
    let trimmed = cell.trim();
    is_currency_token(trimmed) && (trimmed.contains(['$', '€', '£']) || trimmed.contains('.'))
}

/// Parse a cost cell into a non-negative value.
///
/// Strips currency symbols, thousands separators and whitespace, then parses
/// the remainder as a decimal. As a second chance for noisy (typically OCR)
/// cells like `$12.50/lb`, the first symbol-marked amount is taken. Returns
/// `None` for anything else — unparseable cost cells make the row a counted
/// skip, never a guessed value.
#[must_use]
pub fn parse_money(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }

    let stripped: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | ',' | ' '))
        .collect();
    if let Ok(value) = stripped.parse::<f64>() {
        return (value.is_finite() && value >= 0.0).then_some(value);
    }

    let captures = EMBEDDED_AMOUNT_RE.captures(trimmed)?;
    captures.get(1)?.as_str().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_currency_tokens() {
        for cell in ["$12.50", "12.50", "1,234.56", "$ 3", "7", "£0.99"] {
            assert!(is_currency_token(cell), "expected currency: {cell}");
        }
        for cell in ["N/A", "", "Widget", "12.50/lb", "A100", "12,34"] {
            assert!(!is_currency_token(cell), "unexpected currency: {cell}");
        }
    }

    #[test]
    fn marked_prices_need_symbol_or_decimals() {
        assert!(is_marked_price("$12"));
        assert!(is_marked_price("12.50"));
        assert!(!is_marked_price("12"));
        assert!(!is_marked_price("N/A"));
    }

    #[test]
    fn parses_plain_and_symbol_amounts() {
        assert_eq!(parse_money("$12.50"), Some(12.50));
        assert_eq!(parse_money("  12.50 "), Some(12.50));
        assert_eq!(parse_money("1,234.56"), Some(1234.56));
        assert_eq!(parse_money("$ 1,000"), Some(1000.0));
    }

    #[test]
    fn recovers_amount_from_noisy_cells() {
        assert_eq!(parse_money("$12.50/lb"), Some(12.50));
        assert_eq!(parse_money("ea $4.25"), Some(4.25));
    }

    #[test]
    fn rejects_unparseable_and_negative_cells() {
        assert_eq!(parse_money("N/A"), None);
        assert_eq!(parse_money(""), None);
        assert_eq!(parse_money("call for price"), None);
        assert_eq!(parse_money("-4.00"), None);
        assert_eq!(parse_money("(12.50)"), None);
    }
}
