//! Finder criteria
//!
//! A [`FinderSpec`] is built once per lookup through [`FinderSpecBuilder`]
//! and is immutable afterwards. The builder mirrors how callers describe a
//! field: a name or name condition, a declared type, a modifier rule and an
//! optional positional selector.
//!
//! ## Index selectors
//!
//! Only one [`IndexSelector`] is active per spec. Setting a selector
//! overwrites the previous one, whatever its kind: calling
//! `.order(1).first()` leaves a `Match` selector, calling `.first().order(1)`
//! leaves an `Order` selector.

use crate::backend::{ClassRef, ReflectiveBackend, TypeId};
use crate::condition::{ModifierRule, NameCondition};
use crate::error::{BackendError, FinderError};

/// Declared-type criterion, resolved lazily against the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// A type identity already issued by the backend
    Concrete(TypeId),
    /// A fully-qualified type name
    Named(String),
    /// Ordered candidates; the first one the backend resolves wins
    AnyOf(Vec<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Candidates tried in order, the first resolvable one wins
    pub fn any_of<I, T>(candidates: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeDescriptor>,
    {
        TypeDescriptor::AnyOf(candidates.into_iter().map(Into::into).collect())
    }

    /// Resolve to a comparable type identity
    pub fn resolve(&self, backend: &dyn ReflectiveBackend) -> Result<TypeId, BackendError> {
        match self {
            TypeDescriptor::AnyOf(candidates) => candidates
                .iter()
                .find_map(|candidate| candidate.resolve(backend).ok())
                .ok_or_else(|| BackendError::UnknownType {
                    name: self.describe(),
                }),
            leaf => backend.resolve_type(leaf),
        }
    }

    /// Human-readable rendering for diagnostics
    pub fn describe(&self) -> String {
        match self {
            TypeDescriptor::Concrete(id) => id.to_string(),
            TypeDescriptor::Named(name) => name.clone(),
            TypeDescriptor::AnyOf(candidates) => {
                let names: Vec<String> = candidates.iter().map(|c| c.describe()).collect();
                format!("any of [{}]", names.join(", "))
            }
        }
    }
}

impl From<TypeId> for TypeDescriptor {
    fn from(id: TypeId) -> Self {
        TypeDescriptor::Concrete(id)
    }
}

impl From<&str> for TypeDescriptor {
    fn from(name: &str) -> Self {
        TypeDescriptor::Named(name.to_string())
    }
}

impl From<String> for TypeDescriptor {
    fn from(name: String) -> Self {
        TypeDescriptor::Named(name)
    }
}

/// Positional selection over candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSelector {
    /// n-th raw declared member of the class level, ignoring every other criterion
    Order {
        /// Position, 0-based
        index: usize,
        /// Count from the last member instead of the first
        from_end: bool,
    },
    /// n-th member among those that passed the criteria
    Match {
        /// Position, 0-based
        index: usize,
        /// Count from the last match instead of the first
        from_end: bool,
    },
}

impl IndexSelector {
    /// Whether this selector bypasses the other criteria
    pub fn is_order(&self) -> bool {
        matches!(self, IndexSelector::Order { .. })
    }

    /// Requested index, as given
    pub fn index(&self) -> usize {
        match *self {
            IndexSelector::Order { index, .. } | IndexSelector::Match { index, .. } => index,
        }
    }

    /// Absolute position in a list of `len` candidates, if in range
    pub fn position(&self, len: usize) -> Option<usize> {
        let (index, from_end) = match *self {
            IndexSelector::Order { index, from_end } | IndexSelector::Match { index, from_end } => {
                (index, from_end)
            }
        };
        if index >= len {
            None
        } else if from_end {
            Some(len - 1 - index)
        } else {
            Some(index)
        }
    }
}

/// Immutable description of the member(s) sought
#[derive(Debug, Clone)]
pub struct FinderSpec {
    target_class: ClassRef,
    ancestor_search: bool,
    only_super: bool,
    name: Option<String>,
    name_condition: Option<NameCondition>,
    type_descriptor: Option<TypeDescriptor>,
    modifier_rule: Option<ModifierRule>,
    index_selector: Option<IndexSelector>,
}

impl FinderSpec {
    /// Start describing a member of `target_class`
    pub fn builder(target_class: ClassRef) -> FinderSpecBuilder {
        FinderSpecBuilder::new(target_class)
    }

    /// Class the search starts from
    pub fn target_class(&self) -> ClassRef {
        self.target_class
    }

    /// Whether ancestors are scanned after the target level
    pub fn ancestor_search(&self) -> bool {
        self.ancestor_search
    }

    /// Whether the scan starts at the direct superclass
    pub fn only_super(&self) -> bool {
        self.only_super
    }

    /// Exact name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name predicate
    pub fn name_condition(&self) -> Option<&NameCondition> {
        self.name_condition.as_ref()
    }

    /// Declared-type criterion
    pub fn type_descriptor(&self) -> Option<&TypeDescriptor> {
        self.type_descriptor.as_ref()
    }

    /// Modifier constraint
    pub fn modifier_rule(&self) -> Option<&ModifierRule> {
        self.modifier_rule.as_ref()
    }

    /// Active positional selector
    pub fn index_selector(&self) -> Option<IndexSelector> {
        self.index_selector
    }

    /// Check the well-formedness contract.
    ///
    /// A spec needs a name or name condition, or at least one of a type,
    /// modifier rule or index selector. An empty candidate list for a
    /// multi-candidate type can never resolve and is rejected too.
    pub fn validate(&self) -> Result<(), FinderError> {
        let has_name = self.name.is_some() || self.name_condition.is_some();
        let has_other = self.type_descriptor.is_some()
            || self.modifier_rule.is_some()
            || self.index_selector.is_some();
        if !has_name && !has_other {
            return Err(FinderError::invalid_spec(
                "field name is not set and no other condition was given",
            ));
        }
        if let Some(TypeDescriptor::AnyOf(candidates)) = &self.type_descriptor {
            if candidates.is_empty() {
                return Err(FinderError::invalid_spec("type candidate list is empty"));
            }
        }
        Ok(())
    }
}

/// Fluent builder for [`FinderSpec`]
#[derive(Debug, Clone)]
pub struct FinderSpecBuilder {
    spec: FinderSpec,
    error: Option<FinderError>,
}

impl FinderSpecBuilder {
    /// Create a builder with no criteria
    pub fn new(target_class: ClassRef) -> Self {
        Self {
            spec: FinderSpec {
                target_class,
                ancestor_search: false,
                only_super: false,
                name: None,
                name_condition: None,
                type_descriptor: None,
                modifier_rule: None,
                index_selector: None,
            },
            error: None,
        }
    }

    /// Exact member name. An empty name clears the criterion.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.spec.name = if name.is_empty() { None } else { Some(name) };
        self
    }

    /// Name predicate
    pub fn name_condition(mut self, condition: NameCondition) -> Self {
        self.spec.name_condition = Some(condition);
        self
    }

    /// Whole-name regular expression; a malformed pattern fails [`Self::build`]
    pub fn name_pattern(mut self, pattern: &str) -> Self {
        match NameCondition::pattern(pattern) {
            Ok(condition) => self.spec.name_condition = Some(condition),
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
        self
    }

    /// Declared type
    pub fn field_type(mut self, descriptor: impl Into<TypeDescriptor>) -> Self {
        self.spec.type_descriptor = Some(descriptor.into());
        self
    }

    /// Modifier constraint
    pub fn modifiers(mut self, rule: ModifierRule) -> Self {
        self.spec.modifier_rule = Some(rule);
        self
    }

    /// Replace the active index selector
    pub fn index(mut self, selector: IndexSelector) -> Self {
        self.spec.index_selector = Some(selector);
        self
    }

    /// n-th raw declared member, counted from the first
    pub fn order(self, index: usize) -> Self {
        self.index(IndexSelector::Order {
            index,
            from_end: false,
        })
    }

    /// n-th raw declared member, counted from the last
    pub fn order_from_end(self, index: usize) -> Self {
        self.index(IndexSelector::Order {
            index,
            from_end: true,
        })
    }

    /// n-th matching member, counted from the first
    pub fn matching(self, index: usize) -> Self {
        self.index(IndexSelector::Match {
            index,
            from_end: false,
        })
    }

    /// n-th matching member, counted from the last
    pub fn matching_from_end(self, index: usize) -> Self {
        self.index(IndexSelector::Match {
            index,
            from_end: true,
        })
    }

    /// First matching member
    pub fn first(self) -> Self {
        self.matching(0)
    }

    /// Last matching member
    pub fn last(self) -> Self {
        self.matching_from_end(0)
    }

    /// Scan the ancestor chain after the target level.
    ///
    /// With `only_super` the scan starts at the direct superclass, unless
    /// that superclass is the universal root type.
    pub fn super_class(mut self, only_super: bool) -> Self {
        self.spec.ancestor_search = true;
        self.spec.only_super = only_super;
        self
    }

    /// Toggle ancestor search without changing the starting level
    pub fn ancestors(mut self, enabled: bool) -> Self {
        self.spec.ancestor_search = enabled;
        self
    }

    /// Validate and freeze the spec
    pub fn build(self) -> Result<FinderSpec, FinderError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        self.spec.validate()?;
        Ok(self.spec)
    }
}
