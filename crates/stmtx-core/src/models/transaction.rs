//! Transaction models populated by bank definitions.
//!
//! These are plain builders: every field can be set by a section
//! assignment, and nothing is validated until the wrap step decides
//! whether an item is emitted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An amount in minor units of a currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// ISO 4217 currency code.
    pub currency: String,
    /// Amount in minor units (cents).
    pub amount: i64,
}

impl Money {
    pub fn of(currency: impl Into<String>, amount: i64) -> Self {
        Self {
            currency: currency.into(),
            amount,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

/// A security as identified on the statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Security {
    /// Display name, possibly merged from two statement lines.
    pub name: String,

    /// International Securities Identification Number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isin: Option<String>,

    /// German securities identification number (WKN).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wkn: Option<String>,

    /// Trading currency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Tax line categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxCategory {
    /// Kapitalertragsteuer.
    CapitalGains,
    /// Solidaritätszuschlag.
    SolidaritySurcharge,
    /// Kirchensteuer.
    ChurchTax,
    /// Quellensteuer.
    Withholding,
    Other,
}

/// Fee line categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeCategory {
    /// Provision.
    Commission,
    /// Ausgabeaufschlag.
    SalesLoad,
    Other,
}

/// Kind of an auxiliary unit attached to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Gross value with its foreign currency equivalent.
    GrossValue,
    Tax(TaxCategory),
    Fee(FeeCategory),
}

/// An auxiliary amount (gross value, tax or fee) of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub kind: UnitKind,

    /// Amount in the transaction currency.
    pub amount: Money,

    /// Original amount if it was stated in another currency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forex: Option<Money>,

    /// Foreign currency units per transaction currency unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<Decimal>,
}

impl Unit {
    pub fn new(kind: UnitKind, amount: Money) -> Self {
        Self {
            kind,
            amount,
            forex: None,
            exchange_rate: None,
        }
    }

    pub fn with_forex(mut self, forex: Money, exchange_rate: Decimal) -> Self {
        self.forex = Some(forex);
        self.exchange_rate = Some(exchange_rate);
        self
    }
}

/// Direction of a portfolio transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortfolioKind {
    #[default]
    Buy,
    Sell,
}

/// Kind of an account transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountKind {
    #[default]
    Dividends,
    Taxes,
    TaxRefund,
}

/// Access shared by every transaction subject, used by the FX and
/// tax/fee helpers.
pub trait TransactionSubject {
    /// Transaction currency, once an amount has been assigned.
    fn currency(&self) -> Option<&str>;

    /// Attach an auxiliary unit.
    fn add_unit(&mut self, unit: Unit);

    fn units(&self) -> &[Unit];

    /// Sum of all tax units in transaction currency.
    fn total_taxes(&self) -> i64 {
        self.units()
            .iter()
            .filter(|u| matches!(u.kind, UnitKind::Tax(_)))
            .map(|u| u.amount.amount)
            .sum()
    }

    /// Sum of all fee units in transaction currency.
    fn total_fees(&self) -> i64 {
        self.units()
            .iter()
            .filter(|u| matches!(u.kind, UnitKind::Fee(_)))
            .map(|u| u.amount.amount)
            .sum()
    }

    /// Tax amounts per category.
    fn taxes_by_category(&self) -> BTreeMap<TaxCategory, i64> {
        let mut taxes = BTreeMap::new();
        for unit in self.units() {
            if let UnitKind::Tax(category) = unit.kind {
                *taxes.entry(category).or_insert(0) += unit.amount.amount;
            }
        }
        taxes
    }

    /// The gross value unit, if the transaction was settled in a foreign currency.
    fn gross_value_unit(&self) -> Option<&Unit> {
        self.units().iter().find(|u| u.kind == UnitKind::GrossValue)
    }
}

/// A buy or sell of a security.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuySellEntry {
    pub kind: PortfolioKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Security>,

    /// Shares at [`crate::values::SHARE_PRECISION`].
    pub shares: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// Settlement amount (Ausmachender Betrag).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub money: Option<Money>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub units: Vec<Unit>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl BuySellEntry {
    pub fn new(kind: PortfolioKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn amount(&self) -> i64 {
        self.money.as_ref().map(|m| m.amount).unwrap_or(0)
    }

    /// Value of the shares before fees and taxes.
    ///
    /// Buys pay fees and taxes on top of the gross value, sells have them
    /// deducted from it.
    pub fn gross_value(&self) -> i64 {
        let charges = self.total_fees() + self.total_taxes();
        match self.kind {
            PortfolioKind::Buy => self.amount() - charges,
            PortfolioKind::Sell => self.amount() + charges,
        }
    }
}

impl TransactionSubject for BuySellEntry {
    fn currency(&self) -> Option<&str> {
        self.money.as_ref().map(|m| m.currency.as_str())
    }

    fn add_unit(&mut self, unit: Unit) {
        self.units.push(unit);
    }

    fn units(&self) -> &[Unit] {
        &self.units
    }
}

/// A cash movement on an account (dividend, tax, refund, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTransaction {
    pub kind: AccountKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Security>,

    /// Shares at [`crate::values::SHARE_PRECISION`], zero if unrelated to a position.
    pub shares: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub money: Option<Money>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub units: Vec<Unit>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl AccountTransaction {
    pub fn new(kind: AccountKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn amount(&self) -> i64 {
        self.money.as_ref().map(|m| m.amount).unwrap_or(0)
    }

    /// Value before taxes and fees were withheld.
    pub fn gross_value(&self) -> i64 {
        self.amount() + self.total_taxes() + self.total_fees()
    }
}

impl TransactionSubject for AccountTransaction {
    fn currency(&self) -> Option<&str> {
        self.money.as_ref().map(|m| m.currency.as_str())
    }

    fn add_unit(&mut self, unit: Unit) {
        self.units.push(unit);
    }

    fn units(&self) -> &[Unit] {
        &self.units
    }
}

/// A finalized extraction result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Item {
    BuySell(BuySellEntry),
    Transaction(AccountTransaction),
}

impl Item {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::BuySell(e) => e.date,
            Self::Transaction(t) => t.date,
        }
    }

    pub fn money(&self) -> Option<&Money> {
        match self {
            Self::BuySell(e) => e.money.as_ref(),
            Self::Transaction(t) => t.money.as_ref(),
        }
    }

    pub fn security(&self) -> Option<&Security> {
        match self {
            Self::BuySell(e) => e.security.as_ref(),
            Self::Transaction(t) => t.security.as_ref(),
        }
    }

    pub fn shares(&self) -> i64 {
        match self {
            Self::BuySell(e) => e.shares,
            Self::Transaction(t) => t.shares,
        }
    }

    /// Short type label, e.g. `BUY` or `DIVIDENDS`.
    pub fn type_label(&self) -> &'static str {
        match self {
            Self::BuySell(e) => match e.kind {
                PortfolioKind::Buy => "BUY",
                PortfolioKind::Sell => "SELL",
            },
            Self::Transaction(t) => match t.kind {
                AccountKind::Dividends => "DIVIDENDS",
                AccountKind::Taxes => "TAXES",
                AccountKind::TaxRefund => "TAX_REFUND",
            },
        }
    }

    pub fn note(&self) -> Option<&str> {
        match self {
            Self::BuySell(e) => e.note.as_deref(),
            Self::Transaction(t) => t.note.as_deref(),
        }
    }

    pub fn total_taxes(&self) -> i64 {
        match self {
            Self::BuySell(e) => e.total_taxes(),
            Self::Transaction(t) => t.total_taxes(),
        }
    }

    pub fn total_fees(&self) -> i64 {
        match self {
            Self::BuySell(e) => e.total_fees(),
            Self::Transaction(t) => t.total_fees(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gross_value_of_buy_and_sell() {
        let mut buy = BuySellEntry::new(PortfolioKind::Buy);
        buy.money = Some(Money::of("EUR", 10_500));
        buy.add_unit(Unit::new(UnitKind::Fee(FeeCategory::Commission), Money::of("EUR", 500)));
        assert_eq!(buy.gross_value(), 10_000);

        let mut sell = BuySellEntry::new(PortfolioKind::Sell);
        sell.money = Some(Money::of("EUR", 9_000));
        sell.add_unit(Unit::new(UnitKind::Tax(TaxCategory::CapitalGains), Money::of("EUR", 1_000)));
        assert_eq!(sell.gross_value(), 10_000);
    }

    #[test]
    fn test_taxes_by_category() {
        let mut t = AccountTransaction::new(AccountKind::Dividends);
        t.add_unit(Unit::new(UnitKind::Tax(TaxCategory::CapitalGains), Money::of("EUR", 100)));
        t.add_unit(Unit::new(UnitKind::Tax(TaxCategory::ChurchTax), Money::of("EUR", 8)));
        t.add_unit(Unit::new(UnitKind::Tax(TaxCategory::CapitalGains), Money::of("EUR", 1)));

        let taxes = t.taxes_by_category();
        assert_eq!(taxes.get(&TaxCategory::CapitalGains), Some(&101));
        assert_eq!(taxes.get(&TaxCategory::ChurchTax), Some(&8));
        assert_eq!(t.total_taxes(), 109);
    }

    #[test]
    fn test_item_serializes_with_type_tag() {
        let item = Item::BuySell(BuySellEntry::new(PortfolioKind::Sell));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "buy_sell");
        assert_eq!(json["kind"], "SELL");
    }
}
