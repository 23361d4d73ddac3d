//! Per-document context and per-match capture maps.

use std::collections::HashMap;

use crate::error::ExtractionError;

/// Read access to string values by key.
///
/// Implemented by both [`Context`] and [`CaptureMap`], so helpers that
/// build a security from `name`/`isin`/`wkn` work on either.
pub trait ValueSource {
    fn value(&self, key: &str) -> Option<&str>;
}

/// Key-value store shared by all blocks of one document.
///
/// A fresh context is allocated for every document a matcher parses.
/// Values written by an earlier block are visible to later blocks of the
/// same document (the handshake between e.g. a sale and its tax
/// adjustment).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    values: HashMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Like [`Context::get`], but a missing key is an error.
    pub fn require(&self, key: &str) -> Result<&str, ExtractionError> {
        self.get(key)
            .ok_or_else(|| ExtractionError::MissingContext(key.to_string()))
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ValueSource for Context {
    fn value(&self, key: &str) -> Option<&str> {
        self.get(key)
    }
}

/// Named captures of one successful section match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureMap {
    values: HashMap<String, String>,
}

impl CaptureMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured value; a missing attribute is an error.
    pub fn get(&self, key: &str) -> Result<&str, ExtractionError> {
        self.values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ExtractionError::MissingAttribute(key.to_string()))
    }

    pub fn opt(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

impl ValueSource for CaptureMap {
    fn value(&self, key: &str) -> Option<&str> {
        self.opt(key)
    }
}
