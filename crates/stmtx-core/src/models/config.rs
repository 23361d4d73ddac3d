//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

use crate::engine::EngineLimits;
use crate::values::NumberLocale;

/// Main configuration for stmtx.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StmtxConfig {
    /// Extraction engine configuration.
    pub extraction: ExtractionConfig,

    /// PDF text layer configuration.
    pub pdf: PdfConfig,
}

/// Extraction engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Number format used by the statements.
    pub locale: NumberLocale,

    /// Currency used when a statement names an unknown currency code.
    pub default_currency: String,

    /// Compiled size limit for a single pattern, in bytes.
    pub regex_size_limit: usize,

    /// Maximum number of lines a block may span (0 = unlimited).
    pub max_block_lines: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            locale: NumberLocale::German,
            default_currency: "EUR".to_string(),
            regex_size_limit: 1 << 20,
            max_block_lines: 0,
        }
    }
}

impl ExtractionConfig {
    /// Limits applied while building definitions.
    pub fn engine_limits(&self) -> EngineLimits {
        EngineLimits {
            size_limit: self.regex_size_limit,
            max_block_lines: (self.max_block_lines > 0).then_some(self.max_block_lines),
        }
    }
}

/// PDF text layer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum text length to consider the PDF as text-based.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 50 }
    }
}

impl StmtxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = StmtxConfig::default();
        config.extraction.locale = NumberLocale::Swiss;
        config.extraction.default_currency = "CHF".to_string();
        config.save(&path).unwrap();

        assert_eq!(StmtxConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: StmtxConfig =
            serde_json::from_str(r#"{ "extraction": { "default_currency": "USD" } }"#).unwrap();
        assert_eq!(config.extraction.default_currency, "USD");
        assert_eq!(config.extraction.locale, NumberLocale::German);
        assert_eq!(config.pdf.min_text_length, 50);
    }

    #[test]
    fn test_engine_limits() {
        let mut config = ExtractionConfig::default();
        assert_eq!(config.engine_limits().max_block_lines, None);
        config.max_block_lines = 40;
        assert_eq!(config.engine_limits().max_block_lines, Some(40));
    }
}
