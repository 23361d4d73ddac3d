//! Normalization of locale-formatted statement tokens.
//!
//! Statements print amounts like `1.234,56`, share counts like `4,929`,
//! signed amounts like `100,01-` and dates like `14.01.2021`. Everything
//! here turns such tokens into fixed-precision integers, decimals or
//! calendar dates. Failures are [`ValueError`]s so a section rule can
//! decide whether a bad token is fatal for its block.

pub mod amounts;
pub mod currency;
pub mod dates;
pub mod patterns;

pub use amounts::{format_amount, from_scaled, parse_decimal, to_scaled};
pub use currency::is_known_currency;
pub use dates::parse_date;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ValueError;
use crate::models::config::ExtractionConfig;

/// Fractional digits of money amounts (minor units).
pub const AMOUNT_PRECISION: u32 = 2;

/// Fractional digits of share counts.
pub const SHARE_PRECISION: u32 = 3;

/// Fractional digits kept when inverting an exchange rate.
pub const RATE_PRECISION: u32 = 10;

/// Thousands and decimal separator conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberLocale {
    /// `1.234,56`
    #[default]
    German,
    /// `1,234.56`
    English,
    /// `1'234.56`
    Swiss,
}

impl NumberLocale {
    /// Returns `(grouping, decimal)` separators.
    pub fn separators(self) -> (char, char) {
        match self {
            Self::German => ('.', ','),
            Self::English => (',', '.'),
            Self::Swiss => ('\'', '.'),
        }
    }
}

/// Converts captured tokens into typed values.
///
/// A normalizer is configuration: it is built once per definition and
/// cloned into the assignment closures that need it.
#[derive(Debug, Clone)]
pub struct Normalizer {
    locale: NumberLocale,
    default_currency: String,
}

impl Normalizer {
    pub fn new(locale: NumberLocale) -> Self {
        Self {
            locale,
            default_currency: "EUR".to_string(),
        }
    }

    /// Currency used when a statement names an unknown code.
    pub fn with_default_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = currency.into();
        self
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.locale).with_default_currency(config.default_currency.clone())
    }

    pub fn locale(&self) -> NumberLocale {
        self.locale
    }

    pub fn default_currency(&self) -> &str {
        &self.default_currency
    }

    /// Parse an unsigned amount into minor units.
    pub fn amount(&self, token: &str) -> Result<i64, ValueError> {
        parse_decimal(token, self.locale)
            .ok_or_else(|| ValueError::Amount(token.to_string()))
            .and_then(|value| {
                to_scaled(value, AMOUNT_PRECISION).ok_or_else(|| ValueError::Overflow(token.to_string()))
            })
    }

    /// Parse an amount whose sign is a trailing `+` or `-` glyph.
    pub fn signed_amount(&self, token: &str) -> Result<i64, ValueError> {
        let token = token.trim();
        let (digits, negative) = if let Some(rest) = token.strip_suffix('-') {
            (rest, true)
        } else if let Some(rest) = token.strip_suffix('+') {
            (rest, false)
        } else {
            (token, false)
        };

        let amount = self.amount(digits)?;
        Ok(if negative { -amount } else { amount })
    }

    /// Parse a share count at [`SHARE_PRECISION`].
    pub fn shares(&self, token: &str) -> Result<i64, ValueError> {
        parse_decimal(token, self.locale)
            .ok_or_else(|| ValueError::Shares(token.to_string()))
            .and_then(|value| {
                to_scaled(value, SHARE_PRECISION).ok_or_else(|| ValueError::Overflow(token.to_string()))
            })
    }

    /// Parse an exchange rate. Rates keep all printed digits.
    pub fn exchange_rate(&self, token: &str) -> Result<Decimal, ValueError> {
        match parse_decimal(token, self.locale) {
            Some(rate) if !rate.is_zero() => Ok(rate),
            _ => Err(ValueError::ExchangeRate(token.to_string())),
        }
    }

    pub fn date(&self, token: &str) -> Result<NaiveDate, ValueError> {
        parse_date(token).ok_or_else(|| ValueError::Date(token.to_string()))
    }

    /// Resolve a currency code, falling back to the default for unknown codes.
    pub fn currency(&self, code: &str) -> String {
        let code = code.trim();
        if is_known_currency(code) {
            code.to_string()
        } else {
            warn!(
                "Unknown currency code {:?}, using {}",
                code, self.default_currency
            );
            self.default_currency.clone()
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NumberLocale::German)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_amount_to_minor_units() {
        let n = Normalizer::default();
        assert_eq!(n.amount("100,01"), Ok(10001));
        assert_eq!(n.amount("24.013,85"), Ok(2401385));
        assert_eq!(n.amount("0,79"), Ok(79));
        assert_eq!(n.amount("12"), Ok(1200));
    }

    #[test]
    fn test_shares_at_fixed_precision() {
        let n = Normalizer::default();
        assert_eq!(n.shares("4,929"), Ok(4929));
        assert_eq!(n.shares("920"), Ok(920_000));
        assert_eq!(n.shares("1.000,5"), Ok(1_000_500));
    }

    #[test]
    fn test_signed_amounts() {
        let n = Normalizer::default();
        assert_eq!(n.signed_amount("100,01-"), Ok(-10001));
        assert_eq!(n.signed_amount("68,87+"), Ok(6887));
        assert_eq!(n.signed_amount("3,00"), Ok(300));
    }

    #[test]
    fn test_malformed_tokens() {
        let n = Normalizer::default();
        assert_eq!(n.amount("abc"), Err(ValueError::Amount("abc".to_string())));
        assert_eq!(n.amount("12.34"), Err(ValueError::Amount("12.34".to_string())));
        assert!(n.shares("").is_err());
        assert!(n.exchange_rate("0,000").is_err());
        assert!(n.date("14.13.2021").is_err());
    }

    #[test]
    fn test_english_locale() {
        let n = Normalizer::new(NumberLocale::English);
        assert_eq!(n.amount("1,234.56"), Ok(123456));
        assert!(n.amount("1.234,56").is_err());
    }

    #[test]
    fn test_unknown_currency_falls_back() {
        let n = Normalizer::default().with_default_currency("CHF");
        assert_eq!(n.currency("USD"), "USD");
        assert_eq!(n.currency("XYZ"), "CHF");
    }
}
