//! Money amount parsing.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse an amount as printed on an invoice (e.g. "$1,234.56", "1 234,56", "99").
///
/// Currency markers and spaces are ignored. With both separators present the
/// last one is the decimal point. A lone comma followed by exactly three
/// digits is a thousands separator.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == ',' || c == '.');

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let commas = cleaned.matches(',').count();
    let dots = cleaned.matches('.').count();

    let normalized = match (commas, dots) {
        (0, 0) => cleaned.to_string(),
        (0, 1) => cleaned.to_string(),
        (0, _) => cleaned.replace('.', ""),
        (1, 0) => {
            let decimals = cleaned.len() - cleaned.rfind(',').map_or(0, |p| p + 1);
            if decimals == 3 {
                cleaned.replace(',', "")
            } else {
                cleaned.replace(',', ".")
            }
        }
        (_, 0) => cleaned.replace(',', ""),
        _ => {
            let comma_pos = cleaned.rfind(',');
            let dot_pos = cleaned.rfind('.');
            match (comma_pos, dot_pos) {
                (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
                _ => cleaned.replace(',', ""),
            }
        }
    };

    Decimal::from_str(&normalized).ok()
}
