//! Exchange rate handling shared by bank definitions.
//!
//! Rates are stored as foreign currency units per transaction currency
//! unit. A statement quoting `EUR/USD 1,141` for a EUR settlement is
//! stored as is; the same quote on a USD settlement is inverted.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

use super::context::Context;
use crate::error::ValueError;
use crate::models::{FeeCategory, Money, TaxCategory, TransactionSubject, Unit, UnitKind};
use crate::values::RATE_PRECISION;

/// Context key under which blocks share the current exchange rate.
pub const EXCHANGE_RATE_KEY: &str = "exchangeRate";

/// `1 / rate`, rounded half-down to [`RATE_PRECISION`] digits.
pub fn invert_rate(rate: Decimal) -> Result<Decimal, ValueError> {
    Decimal::ONE
        .checked_div(rate)
        .map(|inverted| inverted.round_dp_with_strategy(RATE_PRECISION, RoundingStrategy::MidpointTowardZero))
        .ok_or_else(|| ValueError::ExchangeRate(rate.to_string()))
}

/// Rate in foreign units per `tx_currency` unit, given a quote whose
/// second currency is `quoted_foreign`.
pub fn resolve_exchange_rate(
    quoted: Decimal,
    tx_currency: &str,
    quoted_foreign: &str,
) -> Result<Decimal, ValueError> {
    if tx_currency == quoted_foreign {
        invert_rate(quoted)
    } else {
        Ok(quoted)
    }
}

/// `amount * rate`, rounded half-up to whole minor units.
pub fn multiply(amount: i64, rate: Decimal) -> Result<i64, ValueError> {
    Decimal::from(amount)
        .checked_mul(rate)
        .and_then(to_minor)
        .ok_or_else(|| ValueError::Overflow(format!("{} * {}", amount, rate)))
}

/// `amount / rate`, rounded half-up to whole minor units.
pub fn divide(amount: i64, rate: Decimal) -> Result<i64, ValueError> {
    Decimal::from(amount)
        .checked_div(rate)
        .and_then(to_minor)
        .ok_or_else(|| ValueError::Overflow(format!("{} / {}", amount, rate)))
}

fn to_minor(value: Decimal) -> Option<i64> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

pub fn store_rate(ctx: &mut Context, rate: Decimal) {
    ctx.put(EXCHANGE_RATE_KEY, rate.to_string());
}

pub fn stored_rate(ctx: &Context) -> Option<Decimal> {
    ctx.get(EXCHANGE_RATE_KEY).and_then(|rate| rate.parse().ok())
}

/// Attach the gross value unit with its foreign currency equivalent.
///
/// `gross` and `fx_gross` may be passed either way round; the one in the
/// transaction currency becomes the unit amount. Nothing is attached if
/// both are in the same currency.
pub fn check_and_set_gross_unit<T: TransactionSubject>(
    gross: Money,
    fx_gross: Money,
    t: &mut T,
    ctx: &Context,
) {
    let Some(tx_currency) = t.currency().map(str::to_string) else {
        warn!("Gross value before transaction amount, ignoring");
        return;
    };

    let (gross, fx_gross) = if gross.currency == tx_currency {
        (gross, fx_gross)
    } else if fx_gross.currency == tx_currency {
        (fx_gross, gross)
    } else {
        warn!(
            "Neither {} nor {} matches transaction currency {}",
            gross.currency, fx_gross.currency, tx_currency
        );
        return;
    };

    if gross.currency == fx_gross.currency {
        return;
    }

    let Some(rate) = stored_rate(ctx) else {
        warn!("No exchange rate for gross value in {}", fx_gross.currency);
        return;
    };

    t.add_unit(Unit::new(UnitKind::GrossValue, gross).with_forex(fx_gross, rate));
}

/// Attach a tax line. Zero amounts are dropped.
pub fn add_tax<T: TransactionSubject>(t: &mut T, tax: Money, category: TaxCategory, ctx: &Context) {
    add_unit(t, tax, UnitKind::Tax(category), ctx);
}

/// Attach a fee line. Zero amounts are dropped.
pub fn add_fee<T: TransactionSubject>(t: &mut T, fee: Money, category: FeeCategory, ctx: &Context) {
    add_unit(t, fee, UnitKind::Fee(category), ctx);
}

fn add_unit<T: TransactionSubject>(t: &mut T, money: Money, kind: UnitKind, ctx: &Context) {
    if money.is_zero() {
        return;
    }

    let Some(tx_currency) = t.currency().map(str::to_string) else {
        warn!("{:?} before transaction amount, ignoring", kind);
        return;
    };

    if money.currency == tx_currency {
        t.add_unit(Unit::new(kind, money));
        return;
    }

    let Some(rate) = stored_rate(ctx) else {
        warn!("No exchange rate to convert {:?} in {}, ignoring", kind, money.currency);
        return;
    };

    match divide(money.amount, rate) {
        Ok(amount) => {
            let converted = Money::of(tx_currency, amount);
            t.add_unit(Unit::new(kind, converted).with_forex(money, rate));
        }
        Err(e) => warn!("Cannot convert {:?}: {}", kind, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountKind, AccountTransaction};
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn dividend(currency: &str) -> AccountTransaction {
        let mut t = AccountTransaction::new(AccountKind::Dividends);
        t.money = Some(Money::of(currency, 9356));
        t
    }

    #[test]
    fn test_invert_rate_rounds_half_down() {
        assert_eq!(invert_rate(dec("1.141")).unwrap(), dec("0.8764241893"));
        assert_eq!(invert_rate(dec("4")).unwrap(), dec("0.25"));
        // 1 / 0.65536 = 1.52587890625
        assert_eq!(invert_rate(dec("0.65536")).unwrap(), dec("1.5258789062"));
        assert!(invert_rate(Decimal::ZERO).is_err());
    }

    #[test]
    fn test_inverted_round_trip_within_one_unit() {
        for rate in ["1.141", "1.2095", "0.8571", "131.42", "7.4379"] {
            let rate = dec(rate);
            let inverted = invert_rate(rate).unwrap();
            for amount in [1, 99, 10_001, 2_401_183, 9_999_999] {
                let there = multiply(amount, rate).unwrap();
                let back = multiply(there, inverted).unwrap();
                assert!((back - amount).abs() <= 1, "{} at {} came back as {}", amount, rate, back);
            }
        }
    }

    #[test]
    fn test_resolve_exchange_rate() {
        assert_eq!(resolve_exchange_rate(dec("1.141"), "EUR", "USD").unwrap(), dec("1.141"));
        assert_eq!(
            resolve_exchange_rate(dec("1.141"), "USD", "USD").unwrap(),
            dec("0.8764241893")
        );
    }

    #[test]
    fn test_multiply_rounds_half_up() {
        assert_eq!(multiply(2_401_183, dec("1.141")).unwrap(), 2_739_750);
        assert_eq!(multiply(5, dec("0.5")).unwrap(), 3);
        assert_eq!(divide(11_316, dec("1.2095")).unwrap(), 9_356);
    }

    #[test]
    fn test_gross_unit_accepts_swapped_pair() {
        let mut ctx = Context::new();
        store_rate(&mut ctx, dec("1.2095"));
        let mut t = dividend("EUR");

        check_and_set_gross_unit(Money::of("USD", 11_316), Money::of("EUR", 9_356), &mut t, &ctx);

        let unit = t.gross_value_unit().unwrap();
        assert_eq!(unit.amount, Money::of("EUR", 9_356));
        assert_eq!(unit.forex, Some(Money::of("USD", 11_316)));
        assert_eq!(unit.exchange_rate, Some(dec("1.2095")));
    }

    #[test]
    fn test_gross_unit_skipped_for_unrelated_or_same_currency() {
        let mut ctx = Context::new();
        store_rate(&mut ctx, dec("1.2"));
        let mut t = dividend("EUR");

        check_and_set_gross_unit(Money::of("USD", 1), Money::of("CHF", 1), &mut t, &ctx);
        check_and_set_gross_unit(Money::of("EUR", 1), Money::of("EUR", 1), &mut t, &ctx);
        assert!(t.units.is_empty());
    }

    #[test]
    fn test_foreign_tax_is_converted() {
        let mut ctx = Context::new();
        store_rate(&mut ctx, dec("1.2095"));
        let mut t = dividend("EUR");

        add_tax(&mut t, Money::of("USD", 1_697), TaxCategory::Withholding, &ctx);
        add_fee(&mut t, Money::of("EUR", 0), FeeCategory::Commission, &ctx);

        assert_eq!(t.units.len(), 1);
        assert_eq!(t.units[0].amount, Money::of("EUR", 1_403));
        assert_eq!(t.units[0].forex, Some(Money::of("USD", 1_697)));
    }

    #[test]
    fn test_foreign_tax_without_rate_is_dropped() {
        let mut t = dividend("EUR");
        add_tax(&mut t, Money::of("USD", 100), TaxCategory::Withholding, &Context::new());
        assert!(t.units.is_empty());
    }

    #[test]
    fn test_rate_survives_context_round_trip() {
        let mut ctx = Context::new();
        store_rate(&mut ctx, dec("0.8764241893"));
        assert_eq!(stored_rate(&ctx), Some(dec("0.8764241893")));
    }
}
