//! Full-line patterns used by blocks and section rules.

use regex::{Regex, RegexBuilder};

use super::EngineLimits;
use crate::error::ConfigError;

/// A pattern that must match an entire line.
///
/// The source is wrapped in `^(?:...)$`, so `Ausf.hrungskurs [\.,\d]+ (?<currency>\w{3})`
/// does not match a line with trailing text. Patterns run on the
/// finite-automata engine of the `regex` crate, so matching time stays
/// linear in the line length.
#[derive(Debug, Clone)]
pub struct LinePattern {
    source: String,
    regex: Regex,
}

impl LinePattern {
    pub fn compile(source: &str, limits: EngineLimits) -> Result<Self, ConfigError> {
        let anchored = format!("^(?:{})$", source);
        let regex = RegexBuilder::new(&anchored)
            .size_limit(limits.size_limit)
            .build()
            .map_err(|source_err| ConfigError::Pattern {
                pattern: source.to_string(),
                source: source_err,
            })?;

        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }

    pub fn captures<'l>(&self, line: &'l str) -> Option<regex::Captures<'l>> {
        self.regex.captures(line)
    }

    /// Named groups of this pattern.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.regex.capture_names().flatten()
    }
}
