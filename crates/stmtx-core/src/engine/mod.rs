//! Declarative block/section extraction engine.
//!
//! A [`DocumentMatcher`] recognizes one document type. It splits the text
//! into [`Block`]s at start-marker lines, and runs a
//! [`TransactionTemplate`] over every block span. Templates are lists of
//! [`SectionRule`]s; each rule finds its lines, captures named groups and
//! hands them to an assignment closure that fills the transaction.

pub mod block;
pub mod context;
pub mod document;
pub mod fx;
pub mod pattern;
pub mod rule;
pub mod template;

pub use block::Block;
pub use context::{CaptureMap, Context, ValueSource};
pub use document::DocumentMatcher;
pub use pattern::LinePattern;
pub use rule::{MatchOutcome, Policy, SectionBuilder, SectionParent, SectionRule, SectionSpec};
pub use template::{BlockTemplate, TemplateBuilder, TemplateOutcome, TransactionTemplate};

use serde::Serialize;

use crate::error::ErrorRecord;

/// Resource limits applied while compiling and running definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineLimits {
    /// Compiled size limit of a single pattern, in bytes.
    pub size_limit: usize,
    /// Upper bound on the number of lines one block may span.
    pub max_block_lines: Option<usize>,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            size_limit: 1 << 20,
            max_block_lines: None,
        }
    }
}

/// Items and error records produced from one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction<I> {
    pub items: Vec<I>,
    pub errors: Vec<ErrorRecord>,
}

impl<I> Default for Extraction<I> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<I> Extraction<I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.errors.is_empty()
    }

    /// Append the results of another extraction.
    pub fn merge(&mut self, other: Extraction<I>) {
        self.items.extend(other.items);
        self.errors.extend(other.errors);
    }
}

/// Split document text into trimmed lines.
///
/// `\r\n` and lone `\r` are treated as line breaks.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .flat_map(|line| line.strip_suffix('\r').unwrap_or(line).split('\r'))
        .map(str::trim)
        .collect()
}
