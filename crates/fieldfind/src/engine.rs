//! Level-by-level member resolution
//!
//! The engine scans the target class and, with ancestor search, each
//! superclass in turn, stopping before the universal root type. Every level
//! is enumerated on its own; the first level that yields a non-empty result
//! wins and results are never merged across levels.
//!
//! An `Order` selector short-circuits a level: it picks from the raw
//! declaration order and ignores every other criterion. Otherwise members are
//! filtered by name, name condition, type and modifier rule, and a `Match`
//! selector picks among the survivors.
//!
//! Backend failures end the lookup immediately and surface as
//! [`FinderError::NotFound`] carrying [`MissReason::Backend`].

use rustc_hash::FxHashSet;

use crate::backend::{ClassRef, MemberDescriptor, ReflectiveBackend, ResolvedSet, TypeId};
use crate::error::{BackendError, FinderError, MissReason};
use crate::spec::{FinderSpec, IndexSelector};

/// Executes a [`FinderSpec`] against a backend
#[derive(Clone, Copy)]
pub struct ResolutionEngine<'a> {
    backend: &'a dyn ReflectiveBackend,
}

impl<'a> ResolutionEngine<'a> {
    /// Create an engine over `backend`
    pub fn new(backend: &'a dyn ReflectiveBackend) -> Self {
        Self { backend }
    }

    /// Resolve `spec` to an ordered, non-empty member set.
    ///
    /// Fails with [`FinderError::InvalidSpec`] before touching the backend if
    /// the spec is malformed, and with [`FinderError::NotFound`] if no level
    /// produced a result.
    pub fn resolve(&self, spec: &FinderSpec) -> Result<ResolvedSet, FinderError> {
        spec.validate()?;

        let scope = self
            .scope(spec)
            .map_err(|e| self.not_found(spec, MissReason::Backend(e)))?;
        if scope.is_empty() {
            return Err(self.not_found(spec, MissReason::EmptyScope));
        }

        let order = spec.index_selector().filter(IndexSelector::is_order);
        let expected_type = match (order, spec.type_descriptor()) {
            (None, Some(descriptor)) => Some(
                descriptor
                    .resolve(self.backend)
                    .map_err(|e| self.not_found(spec, MissReason::Backend(e)))?,
            ),
            _ => None,
        };

        let mut last = MissReason::NoMembers;
        for class in scope {
            let declared = self
                .backend
                .enumerate_declared(class)
                .map_err(|e| self.not_found(spec, MissReason::Backend(e)))?;

            let outcome = match order {
                Some(selector) => pick(declared, selector),
                None => self.filter_level(spec, declared, expected_type),
            };
            match outcome {
                Ok(members) => return Ok(ResolvedSet::from(members)),
                Err(reason) => last = reason,
            }
        }

        Err(self.not_found(spec, last))
    }

    /// Ordered class levels the spec will scan.
    ///
    /// The universal root type (the class without a superclass) is never part
    /// of the scope, so a spec targeting the root has an empty scope.
    pub fn scope(&self, spec: &FinderSpec) -> Result<Vec<ClassRef>, BackendError> {
        let mut levels = Vec::new();
        let mut current = spec.target_class();
        let mut parent = self.backend.superclass_of(current)?;

        if spec.only_super() {
            if let Some(direct) = parent {
                let grandparent = self.backend.superclass_of(direct)?;
                if grandparent.is_some() {
                    current = direct;
                    parent = grandparent;
                }
            }
        }

        let mut visited = FxHashSet::default();
        while let Some(next) = parent {
            if !visited.insert(current) {
                break;
            }
            levels.push(current);
            if !spec.ancestor_search() {
                break;
            }
            current = next;
            parent = self.backend.superclass_of(current)?;
        }

        Ok(levels)
    }

    fn filter_level(
        &self,
        spec: &FinderSpec,
        declared: Vec<MemberDescriptor>,
        expected_type: Option<TypeId>,
    ) -> Result<Vec<MemberDescriptor>, MissReason> {
        if declared.is_empty() {
            return Err(MissReason::NoMembers);
        }

        let matched: Vec<MemberDescriptor> = declared
            .into_iter()
            .filter(|member| accepts(spec, member, expected_type))
            .collect();
        if matched.is_empty() {
            return Err(MissReason::Filtered);
        }

        match spec.index_selector() {
            Some(selector) => pick(matched, selector),
            None => Ok(matched),
        }
    }

    fn not_found(&self, spec: &FinderSpec, reason: MissReason) -> FinderError {
        FinderError::NotFound {
            class: self.backend.class_name(spec.target_class()),
            reason,
        }
    }
}

fn accepts(spec: &FinderSpec, member: &MemberDescriptor, expected_type: Option<TypeId>) -> bool {
    if let Some(name) = spec.name() {
        if member.name != name {
            return false;
        }
    }
    if let Some(condition) = spec.name_condition() {
        if !condition.matches(&member.name) {
            return false;
        }
    }
    if let Some(expected) = expected_type {
        if member.field_type != expected {
            return false;
        }
    }
    if let Some(rule) = spec.modifier_rule() {
        if !rule.matches(member.modifiers) {
            return false;
        }
    }
    true
}

fn pick(
    candidates: Vec<MemberDescriptor>,
    selector: IndexSelector,
) -> Result<Vec<MemberDescriptor>, MissReason> {
    let len = candidates.len();
    if len == 0 {
        return Err(MissReason::NoMembers);
    }
    match selector.position(len) {
        Some(position) => Ok(candidates.into_iter().skip(position).take(1).collect()),
        None => Err(MissReason::IndexOutOfRange {
            index: selector.index(),
            len,
        }),
    }
}
