//! Transaction templates: ordered sections that fill one transaction.

use tracing::{debug, trace, warn};

use super::context::Context;
use super::rule::{MatchOutcome, SectionBuilder, SectionParent, SectionRule, SectionSpec};
use super::EngineLimits;
use crate::error::{ConfigError, ExtractionError};

type FactoryFn<S> = Box<dyn Fn() -> S + Send + Sync>;
type WrapFn<S, I> = Box<dyn Fn(S, &Context) -> Option<I> + Send + Sync>;

/// What running a template over one block span produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateOutcome<I> {
    /// The wrap step emitted an item.
    Produced(I),
    /// All required sections matched but the wrap step emitted nothing.
    Discarded,
    /// A required section was not found.
    Skipped { section: String },
    /// A required section matched but its assignment failed.
    Failed {
        section: String,
        error: ExtractionError,
    },
}

/// Anything a block can run over its spans.
pub trait BlockTemplate<I>: Send + Sync {
    /// Run over the lines of one block span.
    ///
    /// Context writes only become visible to `ctx` if the outcome is
    /// [`TemplateOutcome::Produced`] or [`TemplateOutcome::Discarded`].
    fn execute(&self, lines: &[&str], ctx: &mut Context) -> TemplateOutcome<I>;
}

/// Builds a subject `S` from a block span and wraps it into an item `I`.
pub struct TransactionTemplate<S, I> {
    factory: FactoryFn<S>,
    sections: Vec<SectionRule<S>>,
    wrap: WrapFn<S, I>,
}

impl<S: 'static> TransactionTemplate<S, ()> {
    /// Start a template whose subjects are created by `factory`.
    pub fn builder<F>(factory: F) -> TemplateBuilder<S>
    where
        F: Fn() -> S + Send + Sync + 'static,
    {
        TemplateBuilder {
            factory: Box::new(factory),
            limits: EngineLimits::default(),
            specs: Vec::new(),
        }
    }
}

impl<S, I> BlockTemplate<I> for TransactionTemplate<S, I> {
    fn execute(&self, lines: &[&str], ctx: &mut Context) -> TemplateOutcome<I> {
        let mut subject = (self.factory)();
        let mut staged = ctx.clone();

        for rule in &self.sections {
            match rule.find(lines) {
                MatchOutcome::NotFound if rule.is_required() => {
                    debug!("Required section {:?} not found, skipping block", rule.name());
                    return TemplateOutcome::Skipped {
                        section: rule.name().to_string(),
                    };
                }
                MatchOutcome::NotFound => {
                    trace!("Optional section {:?} not found", rule.name());
                }
                MatchOutcome::Found { mut values, lines } => {
                    trace!("Section {:?} matched lines {:?}", rule.name(), lines);
                    if let Err(error) = rule.apply(&mut subject, &mut values, &mut staged) {
                        if rule.is_required() {
                            return TemplateOutcome::Failed {
                                section: rule.name().to_string(),
                                error,
                            };
                        }
                        warn!("Ignoring optional section {:?}: {}", rule.name(), error);
                    }
                }
            }
        }

        let outcome = match (self.wrap)(subject, &staged) {
            Some(item) => TemplateOutcome::Produced(item),
            None => TemplateOutcome::Discarded,
        };
        *ctx = staged;
        outcome
    }
}

/// Collects the sections of a [`TransactionTemplate`].
pub struct TemplateBuilder<S> {
    factory: FactoryFn<S>,
    limits: EngineLimits,
    specs: Vec<SectionSpec<S>>,
}

impl<S> TemplateBuilder<S> {
    /// Limits used when compiling the section patterns.
    pub fn limits(mut self, limits: EngineLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Start a section that captures `attributes`.
    pub fn section(self, attributes: &[&str]) -> SectionBuilder<Self, S> {
        SectionBuilder::new(self, attributes)
    }

    /// Finish the template with the function that turns a filled subject
    /// into an item, or drops it.
    pub fn wrap<I, F>(self, wrap: F) -> Result<TransactionTemplate<S, I>, ConfigError>
    where
        F: Fn(S, &Context) -> Option<I> + Send + Sync + 'static,
    {
        let limits = self.limits;
        let sections = self
            .specs
            .into_iter()
            .map(|spec| SectionRule::new(spec, limits))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TransactionTemplate {
            factory: self.factory,
            sections,
            wrap: Box::new(wrap),
        })
    }
}

impl<S> SectionParent<S> for TemplateBuilder<S> {
    fn push_section(mut self, spec: SectionSpec<S>) -> Self {
        self.specs.push(spec);
        self
    }
}
