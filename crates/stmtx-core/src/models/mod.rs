//! Data models for extracted transactions and configuration.

pub mod config;
pub mod transaction;

pub use config::{ExtractionConfig, PdfConfig, StmtxConfig};
pub use transaction::{
    AccountKind, AccountTransaction, BuySellEntry, FeeCategory, Item, Money, PortfolioKind,
    Security, TaxCategory, TransactionSubject, Unit, UnitKind,
};
