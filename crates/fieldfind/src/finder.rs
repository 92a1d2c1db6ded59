//! Finder facade and lookup results
//!
//! [`Finder`] bundles a backend, a [`ResultReporter`] and a [`FinderConfig`].
//! Each lookup yields a [`FindResult`], which never fails at the call site: a
//! miss is a flag plus a cause, and the failure diagnostic is held back until
//! the result is dropped (or a remedy plan is attached). That way the caller
//! sees the result, and may call [`FindResult::ignored_error`], before the
//! failure is reported.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::accessor::{AccessorBinder, AccessorHandle};
use crate::backend::{ClassRef, InstanceRef, MemberDescriptor, ReflectiveBackend, ResolvedSet};
use crate::config::FinderConfig;
use crate::engine::ResolutionEngine;
use crate::error::FinderError;
use crate::remedy::{RemedyOutcome, RemedyPlan};
use crate::report::{ResultReporter, TracingReporter};
use crate::spec::{FinderSpec, FinderSpecBuilder, IndexSelector};
use crate::value::Value;

/// Entry point for member lookups over one backend
#[derive(Clone)]
pub struct Finder<'a> {
    backend: &'a dyn ReflectiveBackend,
    reporter: Arc<dyn ResultReporter>,
    config: Arc<FinderConfig>,
}

impl<'a> Finder<'a> {
    /// Finder reporting through `tracing` with the default config
    pub fn new(backend: &'a dyn ReflectiveBackend) -> Self {
        Self {
            backend,
            reporter: Arc::new(TracingReporter),
            config: Arc::new(FinderConfig::default()),
        }
    }

    /// Replace the reporter
    pub fn with_reporter(mut self, reporter: Arc<dyn ResultReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Replace the config
    pub fn with_config(mut self, config: FinderConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// The backend lookups run against
    pub fn backend(&self) -> &'a dyn ReflectiveBackend {
        self.backend
    }

    /// The active reporter
    pub fn reporter(&self) -> &dyn ResultReporter {
        self.reporter.as_ref()
    }

    /// The active config
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Engine over the same backend
    pub fn engine(&self) -> ResolutionEngine<'a> {
        ResolutionEngine::new(self.backend)
    }

    /// Binder over the same backend
    pub fn binder(&self) -> AccessorBinder<'a> {
        AccessorBinder::new(self.backend)
    }

    /// Build a spec for `class` and look it up.
    ///
    /// Malformed criteria fail here, before the backend is touched. A miss is
    /// not an error: it is reported through the returned [`FindResult`].
    pub fn field<F>(&self, class: ClassRef, build: F) -> Result<FindResult<'a>, FinderError>
    where
        F: FnOnce(FinderSpecBuilder) -> FinderSpecBuilder,
    {
        let spec = build(FinderSpec::builder(class)).build()?;
        Ok(self.find(spec))
    }

    /// Look up a prebuilt spec
    pub fn find(&self, spec: FinderSpec) -> FindResult<'a> {
        let (members, error) = match self.resolve_logged(&spec) {
            Ok(members) => (members, None),
            Err(e) => (ResolvedSet::new(), Some(e)),
        };
        FindResult {
            finder: self.clone(),
            report_pending: error.is_some(),
            spec,
            members,
            primary_error: error.clone(),
            error,
            ignored: false,
            using_remedy: false,
            waiters: Vec::new(),
        }
    }

    /// Resolve and emit the timing message on success
    pub(crate) fn resolve_logged(&self, spec: &FinderSpec) -> Result<ResolvedSet, FinderError> {
        let start = Instant::now();
        let members = self.engine().resolve(spec)?;
        if self.config.debug_log {
            let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
            self.reporter.log_info(&format!(
                "Find field [{}] takes {}ms [{}]",
                names.join(", "),
                start.elapsed().as_millis(),
                self.config.tag
            ));
        }
        Ok(members)
    }
}

impl fmt::Debug for Finder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Finder").field("config", &self.config).finish()
    }
}

enum Waiter<'a> {
    First(Option<InstanceRef>, Box<dyn FnOnce(AccessorHandle<'a>) + 'a>),
    All(Option<InstanceRef>, Box<dyn FnOnce(Vec<AccessorHandle<'a>>) + 'a>),
}

/// Outcome of one lookup
pub struct FindResult<'a> {
    finder: Finder<'a>,
    spec: FinderSpec,
    members: ResolvedSet,
    primary_error: Option<FinderError>,
    error: Option<FinderError>,
    ignored: bool,
    using_remedy: bool,
    report_pending: bool,
    waiters: Vec<Waiter<'a>>,
}

impl<'a> FindResult<'a> {
    /// Criteria this result was produced from
    pub fn spec(&self) -> &FinderSpec {
        &self.spec
    }

    /// Whether no member is bound
    pub fn is_not_found(&self) -> bool {
        self.members.is_empty()
    }

    /// Error of the primary lookup, if it missed and no remedy recovered
    pub fn cause(&self) -> Option<&FinderError> {
        self.error.as_ref()
    }

    /// Run `callback` with the primary lookup's error if it missed.
    ///
    /// Fires even when a remedy plan later recovered a member.
    pub fn on_not_found(self, callback: impl FnOnce(&FinderError)) -> Self {
        if let Some(e) = &self.primary_error {
            callback(e);
        }
        self
    }

    /// Treat a miss as an expected outcome: its diagnostic is dropped.
    ///
    /// Backend failures are still reported.
    pub fn ignored_error(mut self) -> Self {
        self.ignored = true;
        self
    }

    /// Attach fallback lookups, run immediately if the primary lookup missed.
    ///
    /// `configure` always runs so malformed alternatives fail loudly even when
    /// the plan is not needed.
    pub fn remedys<F>(mut self, configure: F) -> Result<Self, FinderError>
    where
        F: FnOnce(&mut RemedyPlan<'a>) -> Result<(), FinderError>,
    {
        self.using_remedy = true;
        self.flush_report();

        let mut plan = RemedyPlan::new(self.finder.clone(), self.spec.target_class());
        configure(&mut plan)?;
        if !self.is_not_found() {
            return Ok(self);
        }

        let mut holder = ResolvedSet::new();
        if let RemedyOutcome::Found { .. } = plan.execute(&mut holder) {
            self.members = holder;
            self.error = None;
            self.fire_waiters();
        }
        Ok(self)
    }

    /// First resolved member
    pub fn give(&self) -> Option<&MemberDescriptor> {
        self.members.first()
    }

    /// Every resolved member, in order
    pub fn give_all(&self) -> &ResolvedSet {
        &self.members
    }

    /// Accessor on the first member
    pub fn get(&self, instance: Option<InstanceRef>) -> Option<AccessorHandle<'a>> {
        self.give().map(|m| self.finder.binder().bind(m, instance))
    }

    /// Accessors on every member, in order
    pub fn all(&self, instance: Option<InstanceRef>) -> Vec<AccessorHandle<'a>> {
        self.finder.binder().bind_all(&self.members, instance)
    }

    /// Read the first member, `None` if nothing is bound or the read fails
    pub fn value(&self, instance: Option<InstanceRef>) -> Option<Value> {
        self.get(instance).and_then(|h| h.any())
    }

    /// Run `callback` on the first member's accessor now, or once a remedy finds one
    pub fn wait(
        mut self,
        instance: Option<InstanceRef>,
        callback: impl FnOnce(AccessorHandle<'a>) + 'a,
    ) -> Self {
        match self.get(instance) {
            Some(handle) => callback(handle),
            None => self.waiters.push(Waiter::First(instance, Box::new(callback))),
        }
        self
    }

    /// Run `callback` on every member's accessor now, or once a remedy finds them
    pub fn wait_all(
        mut self,
        instance: Option<InstanceRef>,
        callback: impl FnOnce(Vec<AccessorHandle<'a>>) + 'a,
    ) -> Self {
        if self.is_not_found() {
            self.waiters.push(Waiter::All(instance, Box::new(callback)));
        } else {
            callback(self.all(instance));
        }
        self
    }

    fn fire_waiters(&mut self) {
        for waiter in std::mem::take(&mut self.waiters) {
            match waiter {
                Waiter::First(instance, callback) => {
                    if let Some(handle) = self.get(instance) {
                        callback(handle);
                    }
                }
                Waiter::All(instance, callback) => callback(self.all(instance)),
            }
        }
    }

    fn flush_report(&mut self) {
        if !std::mem::take(&mut self.report_pending) {
            return;
        }
        let Some(error) = &self.error else {
            return;
        };

        let config = self.finder.config();
        let message = format!(
            "NoSuchField happened in [{}] {} [{}]",
            self.finder.backend().class_name(self.spec.target_class()),
            describe(&self.spec),
            config.tag
        );
        if error.is_backend_failure() {
            self.finder.reporter().log_failure(&message, Some(error), true);
        } else if !self.ignored && !self.using_remedy && config.report_not_found {
            self.finder.reporter().log_failure(&message, Some(error), false);
        }
    }
}

impl Drop for FindResult<'_> {
    fn drop(&mut self) {
        self.flush_report();
    }
}

impl fmt::Debug for FindResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FindResult")
            .field("spec", &self.spec)
            .field("members", &self.members)
            .field("error", &self.error)
            .field("ignored", &self.ignored)
            .finish()
    }
}

fn describe(spec: &FinderSpec) -> String {
    let mut parts = Vec::new();
    if let Some(name) = spec.name() {
        parts.push(format!("name:{}", name));
    }
    if spec.name_condition().is_some() {
        parts.push("name:<condition>".to_string());
    }
    if let Some(descriptor) = spec.type_descriptor() {
        parts.push(format!("type:{}", descriptor.describe()));
    }
    if spec.modifier_rule().is_some() {
        parts.push("modifiers:<rule>".to_string());
    }
    match spec.index_selector() {
        Some(IndexSelector::Order { index, from_end }) => {
            parts.push(format!("order:{}{}", index, if from_end { " from end" } else { "" }))
        }
        Some(IndexSelector::Match { index, from_end }) => {
            parts.push(format!("match:{}{}", index, if from_end { " from end" } else { "" }))
        }
        None => {}
    }
    format!("[{}]", parts.join(" "))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::condition::Modifiers;
    use crate::registry::{ClassRegistry, PrimitiveKind};
    use crate::report::RecordingReporter;

    fn registry() -> (ClassRegistry, ClassRef) {
        let mut registry = ClassRegistry::new();
        let int = registry.primitive(PrimitiveKind::Int);
        let class = registry.define_class("demo.Target", None).unwrap();
        registry
            .add_field(class, "count", int, Modifiers::STATIC)
            .unwrap();
        (registry, class)
    }

    fn finder(registry: &ClassRegistry) -> (Finder<'_>, Arc<RecordingReporter>) {
        let recorder = Arc::new(RecordingReporter::new());
        (Finder::new(registry).with_reporter(recorder.clone()), recorder)
    }

    #[test]
    fn test_hit_logs_timing() {
        let (registry, class) = registry();
        let (finder, recorder) = finder(&registry);
        let result = finder.field(class, |s| s.name("count")).unwrap();
        assert!(!result.is_not_found());
        assert_eq!(result.give().map(|m| m.name.as_str()), Some("count"));
        assert_eq!(result.value(None), Some(Value::Int(0)));
        drop(result);

        let messages = recorder.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Find field [count] takes"));
        assert!(recorder.failures().is_empty());
    }

    #[test]
    fn test_debug_log_off() {
        let (registry, class) = registry();
        let (finder, recorder) = finder(&registry);
        let finder = finder.with_config(FinderConfig {
            debug_log: false,
            ..FinderConfig::default()
        });
        finder.field(class, |s| s.name("count")).unwrap();
        assert!(recorder.reports().is_empty());
    }

    #[test]
    fn test_miss_report_is_deferred_until_drop() {
        let (registry, class) = registry();
        let (finder, recorder) = finder(&registry);
        let result = finder.field(class, |s| s.name("missing")).unwrap();
        assert!(result.is_not_found());
        assert!(recorder.reports().is_empty());

        drop(result);
        let failures = recorder.failures();
        assert_eq!(failures.len(), 1);
        assert!(!failures[0].always_emit);
        assert!(failures[0].message.contains("demo.Target"));
    }

    #[test]
    fn test_ignored_error_silences_miss() {
        let (registry, class) = registry();
        let (finder, recorder) = finder(&registry);
        let seen = RefCell::new(None);
        finder
            .field(class, |s| s.name("missing"))
            .unwrap()
            .ignored_error()
            .on_not_found(|e| *seen.borrow_mut() = Some(e.clone()));
        assert!(recorder.reports().is_empty());
        assert!(matches!(*seen.borrow(), Some(FinderError::NotFound { .. })));
    }

    #[test]
    fn test_report_not_found_off() {
        let (registry, class) = registry();
        let (finder, recorder) = finder(&registry);
        let finder = finder.with_config(FinderConfig {
            report_not_found: false,
            ..FinderConfig::default()
        });
        finder.field(class, |s| s.name("missing")).unwrap();
        assert!(recorder.failures().is_empty());
    }

    #[test]
    fn test_remedy_recovers_and_fires_waiter() {
        let (registry, class) = registry();
        let (finder, recorder) = finder(&registry);
        let seen = RefCell::new(Vec::new());
        let result = finder
            .field(class, |s| s.name("missing"))
            .unwrap()
            .wait(None, |field| seen.borrow_mut().push(field.int()))
            .remedys(|plan| {
                plan.field(|s| s.field_type("int"))?;
                Ok(())
            })
            .unwrap();

        assert!(!result.is_not_found());
        assert!(result.cause().is_none());
        drop(result);
        assert_eq!(*seen.borrow(), vec![0]);
        assert!(recorder.failures().is_empty());
    }

    #[test]
    fn test_on_not_found_sees_primary_miss_after_recovery() {
        let (registry, class) = registry();
        let (finder, _) = finder(&registry);
        let seen = RefCell::new(None);
        let result = finder
            .field(class, |s| s.name("missing"))
            .unwrap()
            .remedys(|plan| {
                plan.field(|s| s.name("count"))?;
                Ok(())
            })
            .unwrap()
            .on_not_found(|e| *seen.borrow_mut() = Some(e.clone()));

        assert!(!result.is_not_found());
        assert!(result.cause().is_none());
        assert!(matches!(*seen.borrow(), Some(FinderError::NotFound { .. })));
    }

    #[test]
    fn test_on_not_found_silent_on_hit() {
        let (registry, class) = registry();
        let (finder, _) = finder(&registry);
        let fired = std::cell::Cell::new(false);
        finder
            .field(class, |s| s.name("count"))
            .unwrap()
            .on_not_found(|_| fired.set(true));
        assert!(!fired.get());
    }

    #[test]
    fn test_invalid_spec_fails_at_call_site() {
        let (registry, class) = registry();
        let (finder, recorder) = finder(&registry);
        assert!(matches!(
            finder.field(class, |s| s),
            Err(FinderError::InvalidSpec { .. })
        ));
        assert!(recorder.reports().is_empty());
    }
}
