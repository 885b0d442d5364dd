//! Raw amount text normalization.

use rust_decimal::Decimal;

/// Parse raw amount text into an exact decimal.
///
/// Filings carry amounts with thousands separators and occasionally the
/// accounting convention of parentheses for negatives, e.g. `"(1,234)"`
/// meaning `-1234`. Unparseable text yields exact zero, which downstream
/// aggregation treats as "no information" — one malformed entry must not
/// abort an otherwise valid batch.
pub fn parse_amount(raw: &str) -> Decimal {
    let mut text = raw.trim().replace(',', "");
    if text.len() >= 2 && text.starts_with('(') && text.ends_with(')') {
        text = format!("-{}", &text[1..text.len() - 1]);
    }
    text.parse().unwrap_or(Decimal::ZERO)
}
