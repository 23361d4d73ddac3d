//! Document matchers: one recognized document type and its blocks.

use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use super::block::Block;
use super::context::Context;
use super::rule::{MatchOutcome, SectionBuilder, SectionParent, SectionRule, SectionSpec};
use super::{split_lines, EngineLimits, Extraction};
use crate::error::{ConfigError, ErrorKind, ErrorRecord};

/// Recognizes one document type and extracts its items.
///
/// The identifier is searched anywhere in the text. Document-level
/// sections run over the whole text before any block and may only write
/// to the context. Blocks then run in declaration order, all sharing one
/// context that is created fresh for every document.
pub struct DocumentMatcher<I> {
    name: String,
    identifier: Regex,
    sections: Vec<SectionRule<()>>,
    blocks: Vec<Block<I>>,
}

impl<I> DocumentMatcher<I> {
    pub fn builder(name: &str, identifier: &str) -> DocumentBuilder<I> {
        DocumentBuilder {
            name: name.to_string(),
            identifier: identifier.to_string(),
            limits: EngineLimits::default(),
            specs: Vec::new(),
            blocks: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the identifier occurs in `text`.
    pub fn accepts(&self, text: &str) -> bool {
        self.identifier.is_match(text)
    }

    /// Extract all items from `text`, or `None` if the document is not of
    /// this type.
    pub fn parse(&self, source: &str, text: &str) -> Option<Extraction<I>> {
        if !self.accepts(text) {
            return None;
        }

        debug!("Parsing {} as {}", source, self.name);
        let lines = split_lines(text);
        let mut ctx = Context::new();
        let mut out = Extraction::new();

        for rule in &self.sections {
            match rule.find(&lines) {
                MatchOutcome::Found { mut values, .. } => {
                    if let Err(error) = rule.apply(&mut (), &mut values, &mut ctx) {
                        if rule.is_required() {
                            out.errors.push(
                                ErrorRecord::new(source, ErrorKind::MalformedToken, error.to_string())
                                    .with_section(rule.name()),
                            );
                            return Some(out);
                        }
                        warn!("Ignoring document section {:?}: {}", rule.name(), error);
                    }
                }
                MatchOutcome::NotFound if rule.is_required() => {
                    debug!("Document section {:?} not found in {}", rule.name(), source);
                    return Some(out);
                }
                MatchOutcome::NotFound => {}
            }
        }

        for block in &self.blocks {
            block.parse(source, &lines, &mut ctx, &mut out);
        }

        Some(out)
    }
}

impl<I> std::fmt::Debug for DocumentMatcher<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentMatcher")
            .field("name", &self.name)
            .field("identifier", &self.identifier.as_str())
            .field("sections", &self.sections)
            .field("blocks", &self.blocks)
            .finish()
    }
}

/// Collects the document sections and blocks of a [`DocumentMatcher`].
pub struct DocumentBuilder<I> {
    name: String,
    identifier: String,
    limits: EngineLimits,
    specs: Vec<SectionSpec<()>>,
    blocks: Vec<Block<I>>,
}

impl<I> DocumentBuilder<I> {
    pub fn limits(mut self, limits: EngineLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Start a document-level section that fills the context.
    pub fn section(self, attributes: &[&str]) -> SectionBuilder<Self, ()> {
        SectionBuilder::new(self, attributes)
    }

    pub fn block(mut self, block: Block<I>) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn build(self) -> Result<DocumentMatcher<I>, ConfigError> {
        let identifier = RegexBuilder::new(&self.identifier)
            .size_limit(self.limits.size_limit)
            .build()
            .map_err(|source| ConfigError::Pattern {
                pattern: self.identifier.clone(),
                source,
            })?;

        let limits = self.limits;
        let sections = self
            .specs
            .into_iter()
            .map(|spec| SectionRule::new(spec, limits))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DocumentMatcher {
            name: self.name,
            identifier,
            sections,
            blocks: self.blocks,
        })
    }
}

impl<I> SectionParent<()> for DocumentBuilder<I> {
    fn push_section(mut self, spec: SectionSpec<()>) -> Self {
        self.specs.push(spec);
        self
    }
}
