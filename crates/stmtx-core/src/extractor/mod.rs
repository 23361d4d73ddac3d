//! Bank extractors: the unit a bank definition is packaged as.

mod registry;

pub use registry::{BatchResult, DocumentResult, ExtractorRegistry};

use tracing::info;

use crate::engine::{DocumentMatcher, Extraction};
use crate::error::{ErrorKind, ErrorRecord};
use crate::models::Item;

/// Text of one document plus a label for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInput {
    pub label: String,
    pub text: String,
}

impl DocumentInput {
    /// Create an input; `\r\n` and `\r` line breaks become `\n`.
    pub fn new(label: impl Into<String>, text: &str) -> Self {
        Self {
            label: label.into(),
            text: text.replace("\r\n", "\n").replace('\r', "\n"),
        }
    }
}

/// Turns statement text of one institution into items.
pub trait StatementExtractor: Send + Sync {
    /// Display name of the institution.
    fn label(&self) -> &str;

    /// Whether this extractor is responsible for `text`.
    fn accepts(&self, text: &str) -> bool;

    /// Extract all items. Never fails; problems end up as error records.
    fn extract(&self, input: &DocumentInput) -> Extraction<Item>;
}

/// A set of bank identifiers and the document matchers of that bank.
#[derive(Debug)]
pub struct BankExtractor {
    label: String,
    identifiers: Vec<String>,
    matchers: Vec<DocumentMatcher<Item>>,
}

impl BankExtractor {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            identifiers: Vec::new(),
            matchers: Vec::new(),
        }
    }

    /// Add text whose presence marks a document as issued by this bank.
    pub fn identifier(mut self, identifier: &str) -> Self {
        self.identifiers.push(identifier.to_string());
        self
    }

    pub fn matcher(mut self, matcher: DocumentMatcher<Item>) -> Self {
        self.matchers.push(matcher);
        self
    }

    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    pub fn matchers(&self) -> &[DocumentMatcher<Item>] {
        &self.matchers
    }
}

impl StatementExtractor for BankExtractor {
    fn label(&self) -> &str {
        &self.label
    }

    fn accepts(&self, text: &str) -> bool {
        self.identifiers.is_empty() || self.identifiers.iter().any(|id| text.contains(id.as_str()))
    }

    fn extract(&self, input: &DocumentInput) -> Extraction<Item> {
        info!("Extracting {} as {}", input.label, self.label);

        let mut out = Extraction::new();
        let mut recognized = false;

        for matcher in &self.matchers {
            if let Some(result) = matcher.parse(&input.label, &input.text) {
                recognized = true;
                out.merge(result);
            }
        }

        if !recognized {
            out.errors.push(ErrorRecord::new(
                &input.label,
                ErrorKind::Unrecognized,
                format!("no {} document type recognized", self.label),
            ));
        }

        info!(
            "{}: {} items, {} errors",
            input.label,
            out.items.len(),
            out.errors.len()
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_normalizes_line_breaks() {
        let input = DocumentInput::new("a.txt", "a\r\nb\rc");
        assert_eq!(input.text, "a\nb\nc");
    }

    #[test]
    fn test_bank_without_matching_document_type() {
        let bank = BankExtractor::new("Testbank").identifier("Testbank AG");
        assert!(bank.accepts("Testbank AG, Musterstraße 1"));
        assert!(!bank.accepts("Andere Bank"));

        let out = bank.extract(&DocumentInput::new("a.txt", "Testbank AG\nKontoauszug"));
        assert!(out.items.is_empty());
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].kind, ErrorKind::Unrecognized);
        assert_eq!(out.errors[0].message, "no Testbank document type recognized");
    }
}
