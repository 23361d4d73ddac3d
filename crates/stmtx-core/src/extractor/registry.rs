//! Registry of bank extractors and batch processing.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use super::{DocumentInput, StatementExtractor};
use crate::banks;
use crate::error::{ConfigError, ErrorKind, ErrorRecord};
use crate::models::{Item, StmtxConfig};
use crate::pdf::TextSource;

/// Items and errors of one source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentResult {
    /// Label of the document (usually a file name).
    pub source: String,
    /// Label of the extractor that handled the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,
    pub items: Vec<Item>,
    pub errors: Vec<ErrorRecord>,
}

impl DocumentResult {
    fn failed(source: &str, error: ErrorRecord) -> Self {
        Self {
            source: source.to_string(),
            bank: None,
            items: Vec::new(),
            errors: vec![error],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Results of a batch, one entry per input in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub documents: Vec<DocumentResult>,
}

impl BatchResult {
    pub fn item_count(&self) -> usize {
        self.documents.iter().map(|d| d.items.len()).sum()
    }

    pub fn error_count(&self) -> usize {
        self.documents.iter().map(|d| d.errors.len()).sum()
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.documents.iter().flat_map(|d| d.items.iter())
    }

    pub fn errors(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.documents.iter().flat_map(|d| d.errors.iter())
    }
}

/// Dispatches documents to the first extractor that accepts them.
#[derive(Default)]
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn StatementExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in bank definition.
    pub fn with_defaults(config: &StmtxConfig) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for bank in banks::all(config)? {
            registry.register(bank);
        }
        Ok(registry)
    }

    pub fn register<E: StatementExtractor + 'static>(&mut self, extractor: E) {
        self.extractors.push(Box::new(extractor));
    }

    pub fn extractors(&self) -> impl Iterator<Item = &dyn StatementExtractor> {
        self.extractors.iter().map(|e| e.as_ref())
    }

    /// The extractor responsible for `text`, if any.
    pub fn find(&self, text: &str) -> Option<&dyn StatementExtractor> {
        self.extractors().find(|e| e.accepts(text))
    }

    pub fn extract(&self, input: &DocumentInput) -> DocumentResult {
        let Some(extractor) = self.find(&input.text) else {
            debug!("No extractor accepts {}", input.label);
            return DocumentResult::failed(&input.label, ErrorRecord::unrecognized(&input.label));
        };

        let extraction = extractor.extract(input);
        DocumentResult {
            source: input.label.clone(),
            bank: Some(extractor.label().to_string()),
            items: extraction.items,
            errors: extraction.errors,
        }
    }

    /// Extract from raw bytes that should hold UTF-8 text.
    pub fn extract_bytes(&self, label: &str, data: &[u8]) -> DocumentResult {
        match std::str::from_utf8(data) {
            Ok(text) => self.extract(&DocumentInput::new(label, text)),
            Err(e) => {
                warn!("{} is not valid UTF-8: {}", label, e);
                DocumentResult::failed(
                    label,
                    ErrorRecord::new(label, ErrorKind::Structural, format!("invalid UTF-8: {}", e)),
                )
            }
        }
    }

    /// Extract a statement file labelled with its file name.
    ///
    /// `.pdf` files are turned into text by `pdf`; anything else must be
    /// UTF-8 text. Only a failure to read the file is an error.
    pub fn extract_file(&self, path: &Path, pdf: &dyn TextSource) -> std::io::Result<DocumentResult> {
        let label = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        let data = std::fs::read(path)?;

        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Ok(self.extract_bytes(label, &data));
        }

        match pdf.extract_text(&data) {
            Ok(text) => Ok(self.extract(&DocumentInput::new(label, &text))),
            Err(e) => {
                warn!("Cannot read text of {}: {}", label, e);
                Ok(DocumentResult::failed(
                    label,
                    ErrorRecord::new(label, ErrorKind::Structural, e.to_string()),
                ))
            }
        }
    }

    /// Extract every input; one bad document never stops the rest.
    pub fn extract_batch<T>(&self, inputs: T) -> BatchResult
    where
        T: IntoIterator<Item = DocumentInput>,
    {
        BatchResult {
            documents: inputs.into_iter().map(|input| self.extract(&input)).collect(),
        }
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.extractors().map(|e| e.label()))
            .finish()
    }
}
