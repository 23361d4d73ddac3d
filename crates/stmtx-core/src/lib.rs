//! Core library for bank statement transaction extraction.
//!
//! This crate provides:
//! - A declarative block/section engine that turns statement text into items
//! - Locale-aware normalization of amounts, share counts, rates and dates
//! - Exchange rate, tax and fee reconciliation helpers
//! - Bank definitions (MLP Banking AG) and a registry to dispatch documents
//! - A text source seam for PDF statements

pub mod banks;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod models;
pub mod pdf;
pub mod values;

pub use engine::{
    Block, Context, DocumentMatcher, EngineLimits, Extraction, Policy, SectionRule,
    TransactionTemplate,
};
pub use error::{ConfigError, ErrorKind, ErrorRecord, ExtractionError, PdfError, ValueError};
pub use extractor::{
    BankExtractor, BatchResult, DocumentInput, DocumentResult, ExtractorRegistry,
    StatementExtractor,
};
pub use models::{AccountTransaction, BuySellEntry, Item, Money, Security, StmtxConfig};
#[cfg(feature = "pdf")]
pub use pdf::PdfTextSource;
pub use pdf::{PlainTextSource, TextSource};
pub use values::{NumberLocale, Normalizer};
