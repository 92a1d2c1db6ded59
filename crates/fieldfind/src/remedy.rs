//! Ordered fallback lookups
//!
//! A [`RemedyPlan`] holds alternative specs tried, in insertion order, after
//! a primary lookup failed. The first alternative that resolves wins and the
//! rest are never attempted. When every alternative fails the plan reports
//! the last error and forgets its alternatives.

use std::fmt;

use crate::backend::{ClassRef, ResolvedSet};
use crate::error::FinderError;
use crate::finder::Finder;
use crate::spec::{FinderSpec, FinderSpecBuilder};

type FoundCallback<'a> = Box<dyn FnOnce(&ResolvedSet) + 'a>;

/// One alternative of a [`RemedyPlan`]
pub struct Alternative<'a> {
    spec: FinderSpec,
    on_find: Option<FoundCallback<'a>>,
}

impl<'a> Alternative<'a> {
    fn new(spec: FinderSpec) -> Self {
        Self {
            spec,
            on_find: None,
        }
    }

    /// Criteria of this alternative
    pub fn spec(&self) -> &FinderSpec {
        &self.spec
    }

    /// Run `callback` with the result if this alternative is the one that succeeds
    pub fn on_find(&mut self, callback: impl FnOnce(&ResolvedSet) + 'a) -> &mut Self {
        self.on_find = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for Alternative<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alternative")
            .field("spec", &self.spec)
            .field("on_find", &self.on_find.is_some())
            .finish()
    }
}

/// Result of [`RemedyPlan::execute`]
#[derive(Debug, Clone, PartialEq)]
pub enum RemedyOutcome {
    /// Alternative number `attempt` (1-based) resolved
    Found {
        /// 1-based position of the winning alternative
        attempt: usize,
    },
    /// Every alternative failed; carries [`FinderError::RemedyExhausted`]
    Exhausted(FinderError),
    /// The plan had no alternatives
    Empty,
}

impl RemedyOutcome {
    /// Whether an alternative resolved
    pub fn is_found(&self) -> bool {
        matches!(self, RemedyOutcome::Found { .. })
    }
}

/// Ordered list of alternative specs
pub struct RemedyPlan<'a> {
    finder: Finder<'a>,
    default_class: ClassRef,
    alternatives: Vec<Alternative<'a>>,
    found: Option<FoundCallback<'a>>,
}

impl<'a> RemedyPlan<'a> {
    /// Create an empty plan whose [`RemedyPlan::field`] targets `default_class`
    pub fn new(finder: Finder<'a>, default_class: ClassRef) -> Self {
        Self {
            finder,
            default_class,
            alternatives: Vec::new(),
            found: None,
        }
    }

    /// Append an alternative
    pub fn add_alternative(&mut self, spec: FinderSpec) -> &mut Alternative<'a> {
        self.alternatives.push(Alternative::new(spec));
        let last = self.alternatives.len() - 1;
        &mut self.alternatives[last]
    }

    /// Build and append an alternative targeting the plan's default class
    pub fn field<F>(&mut self, build: F) -> Result<&mut Alternative<'a>, FinderError>
    where
        F: FnOnce(FinderSpecBuilder) -> FinderSpecBuilder,
    {
        self.field_in(self.default_class, build)
    }

    /// Build and append an alternative targeting another class
    pub fn field_in<F>(&mut self, class: ClassRef, build: F) -> Result<&mut Alternative<'a>, FinderError>
    where
        F: FnOnce(FinderSpecBuilder) -> FinderSpecBuilder,
    {
        let spec = build(FinderSpec::builder(class)).build()?;
        Ok(self.add_alternative(spec))
    }

    /// Run `callback` with the result of whichever alternative succeeds
    pub fn on_found(&mut self, callback: impl FnOnce(&ResolvedSet) + 'a) -> &mut Self {
        self.found = Some(Box::new(callback));
        self
    }

    /// Number of pending alternatives
    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    /// Check if no alternative is pending
    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// Try the alternatives in order, binding `holder` to the first success.
    ///
    /// The plan is drained either way; a second call finds it empty.
    pub fn execute(&mut self, holder: &mut ResolvedSet) -> RemedyOutcome {
        let reporter = self.finder.reporter();
        let tag = self.finder.config().tag.clone();
        let alternatives = std::mem::take(&mut self.alternatives);
        let found = self.found.take();

        if alternatives.is_empty() {
            reporter.log_warning(&format!("RemedyPlan is empty, forgot it? [{}]", tag));
            return RemedyOutcome::Empty;
        }

        let mut last = None;
        let mut attempts = 0;
        for alternative in alternatives {
            attempts += 1;
            match self.finder.resolve_logged(&alternative.spec) {
                Ok(set) => {
                    *holder = set;
                    if self.finder.config().debug_log {
                        reporter.log_info(&format!(
                            "Find field by RemedyPlan on attempt {} [{}]",
                            attempts, tag
                        ));
                    }
                    if let Some(callback) = alternative.on_find {
                        callback(&*holder);
                    }
                    if let Some(callback) = found {
                        callback(&*holder);
                    }
                    return RemedyOutcome::Found { attempt: attempts };
                }
                Err(e) => {
                    reporter.log_failure(
                        &format!("Trying {} times by RemedyPlan --> {} [{}]", attempts, e, tag),
                        Some(&e),
                        true,
                    );
                    last = Some(e);
                }
            }
        }

        holder.clear();
        match last {
            Some(last) => {
                let error = FinderError::RemedyExhausted {
                    attempts,
                    last: Box::new(last),
                };
                reporter.log_failure(
                    &format!("Trying {} times and all failure by RemedyPlan [{}]", attempts, tag),
                    Some(&error),
                    true,
                );
                RemedyOutcome::Exhausted(error)
            }
            None => RemedyOutcome::Empty,
        }
    }
}

impl fmt::Debug for RemedyPlan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemedyPlan")
            .field("default_class", &self.default_class)
            .field("alternatives", &self.alternatives)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::sync::Arc;

    use super::*;
    use crate::condition::Modifiers;
    use crate::registry::{ClassRegistry, PrimitiveKind};
    use crate::report::{RecordingReporter, ReportLevel};

    fn registry() -> (ClassRegistry, ClassRef) {
        let mut registry = ClassRegistry::new();
        let int = registry.primitive(PrimitiveKind::Int);
        let class = registry.define_class("demo.Target", None).unwrap();
        registry.add_field(class, "b", int, Modifiers::PRIVATE).unwrap();
        (registry, class)
    }

    #[test]
    fn test_first_success_wins() {
        let (registry, class) = registry();
        let recorder = Arc::new(RecordingReporter::new());
        let finder = Finder::new(&registry).with_reporter(recorder.clone());
        let hits = Cell::new(0);

        let mut plan = RemedyPlan::new(finder, class);
        plan.field(|s| s.name("a")).unwrap();
        plan.field(|s| s.name("b"))
            .unwrap()
            .on_find(|set| hits.set(hits.get() + set.len()));
        plan.field(|s| s.name("c")).unwrap();
        plan.on_found(|_| hits.set(hits.get() + 10));

        let mut holder = ResolvedSet::new();
        assert_eq!(plan.execute(&mut holder), RemedyOutcome::Found { attempt: 2 });
        assert_eq!(holder.first().map(|m| m.name.as_str()), Some("b"));
        assert_eq!(hits.get(), 11);
        assert!(plan.is_empty());

        let failures = recorder.failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].always_emit);
        assert!(failures[0].message.starts_with("Trying 1 times by RemedyPlan"));
    }

    #[test]
    fn test_exhaustion_carries_last_error() {
        let (registry, class) = registry();
        let recorder = Arc::new(RecordingReporter::new());
        let finder = Finder::new(&registry).with_reporter(recorder.clone());

        let mut plan = RemedyPlan::new(finder, class);
        plan.field(|s| s.name("x")).unwrap();
        plan.field(|s| s.order(5)).unwrap();

        let mut holder = ResolvedSet::new();
        match plan.execute(&mut holder) {
            RemedyOutcome::Exhausted(FinderError::RemedyExhausted { attempts, last }) => {
                assert_eq!(attempts, 2);
                assert!(matches!(
                    *last,
                    FinderError::NotFound {
                        reason: crate::error::MissReason::IndexOutOfRange { index: 5, len: 1 },
                        ..
                    }
                ));
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
        assert!(holder.is_empty());
        assert!(plan.is_empty());
        assert_eq!(recorder.failures().len(), 3);
    }

    #[test]
    fn test_empty_plan_warns() {
        let (registry, class) = registry();
        let recorder = Arc::new(RecordingReporter::new());
        let finder = Finder::new(&registry).with_reporter(recorder.clone());

        let mut plan = RemedyPlan::new(finder, class);
        let mut holder = ResolvedSet::new();
        assert_eq!(plan.execute(&mut holder), RemedyOutcome::Empty);
        assert!(!plan.execute(&mut holder).is_found());

        let reports = recorder.reports();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.level == ReportLevel::Warning));
    }

    #[test]
    fn test_invalid_alternative_is_rejected_at_build() {
        let (registry, class) = registry();
        let mut plan = RemedyPlan::new(Finder::new(&registry), class);
        assert!(matches!(
            plan.field(|s| s),
            Err(FinderError::InvalidSpec { .. })
        ));
        assert!(plan.is_empty());
    }
}
