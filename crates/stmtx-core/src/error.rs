//! Error types for the stmtx-core library.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to turning a PDF into text.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF has no text layer.
    #[error("PDF contains no text")]
    NoText,
}

/// Malformed numeric, date or currency tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Token is not an amount in the expected locale.
    #[error("malformed amount: {0:?}")]
    Amount(String),

    /// Token is not a share count in the expected locale.
    #[error("malformed share count: {0:?}")]
    Shares(String),

    /// Token is not an exchange rate.
    #[error("malformed exchange rate: {0:?}")]
    ExchangeRate(String),

    /// Token is not a day.month.year date.
    #[error("malformed date: {0:?}")]
    Date(String),

    /// Value does not fit into the fixed-precision integer representation.
    #[error("value out of range: {0:?}")]
    Overflow(String),
}

/// Errors raised inside section assignments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// A captured token could not be normalized.
    #[error(transparent)]
    Value(#[from] ValueError),

    /// The assignment asked for an attribute that was not captured.
    #[error("missing attribute: {0}")]
    MissingAttribute(String),

    /// The assignment asked for a context value that no earlier block wrote.
    #[error("missing context value: {0}")]
    MissingContext(String),

    /// Captured values are inconsistent with each other.
    #[error("invalid {field}: {reason}")]
    Invalid { field: String, reason: String },
}

/// Errors in a parser definition, raised while building it.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A pattern does not compile.
    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A declared attribute is not a named group of any pattern.
    #[error("section {section:?} declares attribute {attribute:?} but no pattern captures it")]
    UndeclaredAttribute { section: String, attribute: String },

    /// A section was built without patterns.
    #[error("section {0:?} has no patterns")]
    NoPatterns(String),

    /// A section was built without an assignment.
    #[error("section {0:?} has no assignment")]
    NoAssignment(String),
}

/// Classification of a batch-scoped error record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A required field held a token that could not be parsed.
    MalformedToken,
    /// No definition recognized the document.
    Unrecognized,
    /// The input itself could not be read as text.
    Structural,
}

/// A diagnosable failure tied to one source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Label of the document (usually a file name).
    pub source: String,
    /// Error classification.
    pub kind: ErrorKind,
    /// Human readable message.
    pub message: String,
    /// Block start marker the failure happened in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    /// Section rule the failure happened in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl ErrorRecord {
    pub fn new(source: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            kind,
            message: message.into(),
            block: None,
            section: None,
        }
    }

    pub fn unrecognized(source: impl Into<String>) -> Self {
        Self::new(source, ErrorKind::Unrecognized, "document format not recognized")
    }

    pub fn with_block(mut self, block: impl Into<String>) -> Self {
        self.block = Some(block.into());
        self
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }
}

impl std::fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source, self.message)?;
        if let Some(section) = &self.section {
            write!(f, " (section {})", section)?;
        }
        Ok(())
    }
}
