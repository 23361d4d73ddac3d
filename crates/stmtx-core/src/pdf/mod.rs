//! Text layer extraction from PDF statements.

use crate::error::PdfError;
#[cfg(feature = "pdf")]
use crate::models::PdfConfig;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Turns a binary document into plain text for the extractors.
pub trait TextSource: Send + Sync {
    fn extract_text(&self, data: &[u8]) -> Result<String>;
}

/// Text source backed by `pdf-extract`.
///
/// Documents whose text layer is shorter than `min_text_length` are
/// treated as scans and rejected with [`PdfError::NoText`].
#[cfg(feature = "pdf")]
#[derive(Debug, Clone)]
pub struct PdfTextSource {
    min_text_length: usize,
}

#[cfg(feature = "pdf")]
impl PdfTextSource {
    pub fn new(config: &PdfConfig) -> Self {
        Self {
            min_text_length: config.min_text_length,
        }
    }
}

#[cfg(feature = "pdf")]
impl Default for PdfTextSource {
    fn default() -> Self {
        Self::new(&PdfConfig::default())
    }
}

#[cfg(feature = "pdf")]
impl TextSource for PdfTextSource {
    fn extract_text(&self, data: &[u8]) -> Result<String> {
        let text = pdf_extract::extract_text_from_mem(data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        let length = text.trim().chars().count();
        tracing::debug!("Extracted {} characters of text", length);
        if length < self.min_text_length {
            return Err(PdfError::NoText);
        }

        Ok(text)
    }
}

/// Passes UTF-8 text files through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextSource;

impl TextSource for PlainTextSource {
    fn extract_text(&self, data: &[u8]) -> Result<String> {
        String::from_utf8(data.to_vec()).map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_source() {
        let text = PlainTextSource.extract_text("MLP Banking AG\n".as_bytes()).unwrap();
        assert_eq!(text, "MLP Banking AG\n");
        assert!(PlainTextSource.extract_text(&[0xff, 0xfe]).is_err());
    }
}
