//! Section rules: ordered line patterns plus an assignment.

use std::ops::Range;

use tracing::trace;

use super::context::{CaptureMap, Context};
use super::pattern::LinePattern;
use super::EngineLimits;
use crate::error::{ConfigError, ExtractionError};

/// Assignment callback of a section.
pub type AssignFn<S> =
    Box<dyn Fn(&mut S, &mut CaptureMap, &mut Context) -> Result<(), ExtractionError> + Send + Sync>;

/// What happens when a section does not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// The whole block match is abandoned.
    #[default]
    Required,
    /// The section is skipped.
    Optional,
}

/// Result of looking for a section inside a block span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// All patterns matched in order.
    Found {
        values: CaptureMap,
        /// Lines of the span from the first to the last matched line.
        lines: Range<usize>,
    },
    NotFound,
}

/// One extraction step of a transaction template.
pub struct SectionRule<S> {
    name: String,
    attributes: Vec<String>,
    patterns: Vec<LinePattern>,
    policy: Policy,
    assign: AssignFn<S>,
}

impl<S> SectionRule<S> {
    /// Compile and validate a section.
    pub fn new(spec: SectionSpec<S>, limits: EngineLimits) -> Result<Self, ConfigError> {
        let name = spec.name();
        if spec.patterns.is_empty() {
            return Err(ConfigError::NoPatterns(name));
        }
        let assign = spec.assign.ok_or_else(|| ConfigError::NoAssignment(name.clone()))?;

        let patterns = spec
            .patterns
            .iter()
            .map(|p| LinePattern::compile(p, limits))
            .collect::<Result<Vec<_>, _>>()?;

        for attribute in &spec.attributes {
            let captured = patterns
                .iter()
                .any(|p| p.group_names().any(|g| g == attribute));
            if !captured {
                return Err(ConfigError::UndeclaredAttribute {
                    section: name,
                    attribute: attribute.clone(),
                });
            }
        }

        Ok(Self {
            name,
            attributes: spec.attributes,
            patterns,
            policy: spec.policy,
            assign,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.policy == Policy::Required
    }

    /// Look for this section in `lines`.
    ///
    /// The first pattern is searched from the top of the span; every
    /// following pattern must match a later line. Lines in between that
    /// match nothing are skipped. The section is only found if every
    /// declared attribute was captured.
    pub fn find(&self, lines: &[&str]) -> MatchOutcome {
        let mut values = CaptureMap::new();
        let mut next = 0;
        let mut first = None;
        let mut patterns = self.patterns.iter();
        let mut pattern = patterns.next();

        for (idx, line) in lines.iter().enumerate() {
            let Some(p) = pattern else { break };

            if let Some(caps) = p.captures(line) {
                for group in p.group_names() {
                    if let Some(m) = caps.name(group) {
                        values.insert(group, m.as_str());
                    }
                }
                first.get_or_insert(idx);
                next = idx + 1;
                pattern = patterns.next();
            }
        }

        if pattern.is_some() {
            return MatchOutcome::NotFound;
        }

        if let Some(missing) = self.attributes.iter().find(|a| !values.contains_key(a)) {
            trace!("Section {:?} matched without attribute {:?}", self.name, missing);
            return MatchOutcome::NotFound;
        }

        MatchOutcome::Found {
            values,
            lines: first.unwrap_or(0)..next,
        }
    }

    /// Run the assignment on a found section.
    pub fn apply(
        &self,
        subject: &mut S,
        values: &mut CaptureMap,
        context: &mut Context,
    ) -> Result<(), ExtractionError> {
        (self.assign)(subject, values, context)
    }
}

impl<S> std::fmt::Debug for SectionRule<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionRule")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field(
                "patterns",
                &self.patterns.iter().map(LinePattern::source).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Uncompiled description of a section.
pub struct SectionSpec<S> {
    attributes: Vec<String>,
    policy: Policy,
    patterns: Vec<String>,
    assign: Option<AssignFn<S>>,
}

impl<S> SectionSpec<S> {
    pub fn new(attributes: &[&str]) -> Self {
        Self {
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
            policy: Policy::Required,
            patterns: Vec::new(),
            assign: None,
        }
    }

    /// Diagnostic name, the declared attributes joined by commas.
    pub fn name(&self) -> String {
        self.attributes.join(",")
    }
}

/// Something that collects sections: a template or a document matcher.
pub trait SectionParent<S>: Sized {
    fn push_section(self, spec: SectionSpec<S>) -> Self;
}

/// Fluent builder for one section, returning to its parent on `assign`.
pub struct SectionBuilder<P, S> {
    parent: P,
    spec: SectionSpec<S>,
}

impl<P: SectionParent<S>, S> SectionBuilder<P, S> {
    pub fn new(parent: P, attributes: &[&str]) -> Self {
        Self {
            parent,
            spec: SectionSpec::new(attributes),
        }
    }

    /// Mark the section as optional.
    pub fn optional(mut self) -> Self {
        self.spec.policy = Policy::Optional;
        self
    }

    /// Add the next line pattern.
    pub fn pattern(mut self, pattern: &str) -> Self {
        self.spec.patterns.push(pattern.to_string());
        self
    }

    /// Set the assignment and hand the section to the parent.
    pub fn assign<F>(mut self, assign: F) -> P
    where
        F: Fn(&mut S, &mut CaptureMap, &mut Context) -> Result<(), ExtractionError>
            + Send
            + Sync
            + 'static,
    {
        self.spec.assign = Some(Box::new(assign));
        self.parent.push_section(self.spec)
    }
}
