//! Lenient interpretation of raw custom-field values.

use time::{Date, macros::format_description};

/// Parse the numeric prefix of a raw value (`"12.50 EUR"` -> `12.5`).
///
/// Returns `None` when the value does not start with a number.
pub fn leading_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (index, ch) in trimmed.char_indices() {
        match ch {
            '+' | '-' if index == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = index + ch.len_utf8();
    }

    if !seen_digit {
        return None;
    }

    trimmed[..end].trim_end_matches('.').parse().ok()
}

/// Round a raw price to the nearest integer, half away from zero.
///
/// Non-numeric values count as zero.
pub fn rounded_price(raw: &str) -> i64 {
    leading_number(raw).map(|value| value.round() as i64).unwrap_or(0)
}

/// Parse an ISO calendar date (`YYYY-MM-DD`), ignoring any time suffix.
pub fn parse_date(raw: &str) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");
    let trimmed = raw.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    Date::parse(date_part, format).ok()
}
