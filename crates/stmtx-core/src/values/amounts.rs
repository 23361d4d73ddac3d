//! Amount parsing and formatting.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use super::patterns::{ENGLISH_NUMBER, GERMAN_NUMBER, SWISS_NUMBER};
use super::NumberLocale;

/// Parse a locale-formatted number (e.g., "1.234,56" for German).
pub fn parse_decimal(s: &str, locale: NumberLocale) -> Option<Decimal> {
    let s = s.trim();

    let shape = match locale {
        NumberLocale::German => &*GERMAN_NUMBER,
        NumberLocale::English => &*ENGLISH_NUMBER,
        NumberLocale::Swiss => &*SWISS_NUMBER,
    };
    if !shape.is_match(s) {
        return None;
    }

    let (group, decimal) = locale.separators();
    let normalized: String = s
        .chars()
        .filter(|c| *c != group)
        .map(|c| if c == decimal { '.' } else { c })
        .collect();

    Decimal::from_str(&normalized).ok()
}

/// Scale a decimal to an integer with `precision` implied fractional digits.
///
/// Extra digits are rounded half-up (away from zero).
pub fn to_scaled(value: Decimal, precision: u32) -> Option<i64> {
    let factor = Decimal::from(10i64.checked_pow(precision)?);
    let rounded = value.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
    rounded.checked_mul(factor)?.to_i64()
}

/// Decimal value of an integer with `precision` implied fractional digits.
pub fn from_scaled(value: i64, precision: u32) -> Decimal {
    Decimal::new(value, precision)
}

/// Format minor units in the given locale (e.g., 123456 -> "1.234,56").
pub fn format_amount(minor_units: i64, locale: NumberLocale) -> String {
    let (group, decimal) = locale.separators();
    let sign = if minor_units < 0 { "-" } else { "" };
    let abs = minor_units.unsigned_abs();
    let integer_part = (abs / 100).to_string();
    let fraction = abs % 100;

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(group);
        }
        formatted.push(*c);
    }

    format!("{}{}{}{:02}", sign, formatted, decimal, fraction)
}
