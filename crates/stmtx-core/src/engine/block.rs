//! Blocks: start-marker delimited spans of a document.

use std::ops::Range;

use tracing::debug;

use super::context::Context;
use super::pattern::LinePattern;
use super::template::{BlockTemplate, TemplateOutcome};
use super::{EngineLimits, Extraction};
use crate::error::{ConfigError, ErrorKind, ErrorRecord};

/// A start marker plus the template run over every span it opens.
///
/// A span starts at a line matching the start pattern and runs up to the
/// line before the next start line, or to the end of the document. If an
/// end pattern is set, the span stops after the first matching line
/// instead. `max_lines` caps the span length either way.
pub struct Block<I> {
    start: LinePattern,
    end: Option<LinePattern>,
    max_lines: Option<usize>,
    limits: EngineLimits,
    template: Box<dyn BlockTemplate<I>>,
}

impl<I> Block<I> {
    pub fn new<T>(start: &str, limits: EngineLimits, template: T) -> Result<Self, ConfigError>
    where
        T: BlockTemplate<I> + 'static,
    {
        Ok(Self {
            start: LinePattern::compile(start, limits)?,
            end: None,
            max_lines: limits.max_block_lines,
            limits,
            template: Box::new(template),
        })
    }

    /// Close spans at the first line matching `end`.
    pub fn with_end(mut self, end: &str) -> Result<Self, ConfigError> {
        self.end = Some(LinePattern::compile(end, self.limits)?);
        Ok(self)
    }

    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = Some(max_lines.max(1));
        self
    }

    /// Source of the start marker, used in diagnostics.
    pub fn marker(&self) -> &str {
        self.start.source()
    }

    /// Line ranges of all spans in `lines`.
    pub fn spans(&self, lines: &[&str]) -> Vec<Range<usize>> {
        let starts: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| self.start.is_match(line))
            .map(|(idx, _)| idx)
            .collect();

        starts
            .iter()
            .enumerate()
            .map(|(n, &start)| {
                let next = starts.get(n + 1).copied().unwrap_or(lines.len());
                let mut end = next;

                if let Some(pattern) = &self.end {
                    if let Some(offset) = lines[start + 1..next]
                        .iter()
                        .position(|line| pattern.is_match(line))
                    {
                        end = start + offset + 2;
                    }
                }

                if let Some(max) = self.max_lines {
                    end = end.min(start + max);
                }

                start..end
            })
            .collect()
    }

    /// Run the template over every span, appending items and error records.
    pub fn parse(&self, source: &str, lines: &[&str], ctx: &mut Context, out: &mut Extraction<I>) {
        for span in self.spans(lines) {
            match self.template.execute(&lines[span.clone()], ctx) {
                TemplateOutcome::Produced(item) => out.items.push(item),
                TemplateOutcome::Discarded => {
                    debug!("Block {:?} at lines {:?} produced no item", self.marker(), span);
                }
                TemplateOutcome::Skipped { section } => {
                    debug!(
                        "Block {:?} at lines {:?} skipped, section {:?} not found",
                        self.marker(),
                        span,
                        section
                    );
                }
                TemplateOutcome::Failed { section, error } => {
                    out.errors.push(
                        ErrorRecord::new(source, ErrorKind::MalformedToken, error.to_string())
                            .with_block(self.marker())
                            .with_section(section),
                    );
                }
            }
        }
    }
}

impl<I> std::fmt::Debug for Block<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Block")
            .field("start", &self.start.source())
            .field("end", &self.end.as_ref().map(LinePattern::source))
            .field("max_lines", &self.max_lines)
            .finish()
    }
}
