//! Introspection backend contract
//!
//! The engine never enumerates type metadata itself. It asks a
//! [`ReflectiveBackend`] for the members declared at exactly one class level,
//! for the superclass of a class, and for the identity of a type descriptor.
//! Accessors go through the same backend to read and write slots.
//!
//! Implementations must be safe for concurrent read-only enumeration; the
//! engine shares a backend across independent resolutions.

use std::fmt;

use crate::condition::Modifiers;
use crate::error::BackendError;
use crate::spec::TypeDescriptor;
use crate::value::Value;

/// Opaque class identity issued by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassRef(pub usize);

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class#{}", self.0)
    }
}

/// Comparable type identity issued by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub usize);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// Opaque reference to an object owned by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceRef(pub usize);

impl fmt::Display for InstanceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance#{}", self.0)
    }
}

/// Backend-private member slot handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberHandle(u64);

impl MemberHandle {
    /// Wrap a backend-specific raw handle
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw handle bits
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

/// A resolved member: immutable once produced by the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberDescriptor {
    /// Member name
    pub name: String,
    /// Declared type identity
    pub field_type: TypeId,
    /// Declared type name (diagnostics only)
    pub type_name: String,
    /// Modifier flags
    pub modifiers: Modifiers,
    /// Class level that declares the member
    pub declaring_class: ClassRef,
    /// Backend slot handle
    pub handle: MemberHandle,
}

impl MemberDescriptor {
    /// Whether reads and writes need no instance
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }
}

impl fmt::Display for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{} {}", self.type_name, self.name)
        } else {
            write!(f, "{} {} {}", self.modifiers, self.type_name, self.name)
        }
    }
}

/// Ordered result of a resolution, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSet {
    members: Vec<MemberDescriptor>,
}

impl ResolvedSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// First member, the one single-member accessors bind to
    pub fn first(&self) -> Option<&MemberDescriptor> {
        self.members.first()
    }

    /// Iterate in resolution order
    pub fn iter(&self) -> std::slice::Iter<'_, MemberDescriptor> {
        self.members.iter()
    }

    /// Members as a slice
    pub fn as_slice(&self) -> &[MemberDescriptor] {
        &self.members
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Drop every member
    pub fn clear(&mut self) {
        self.members.clear();
    }

    /// Take the members out
    pub fn into_vec(self) -> Vec<MemberDescriptor> {
        self.members
    }
}

impl From<Vec<MemberDescriptor>> for ResolvedSet {
    fn from(members: Vec<MemberDescriptor>) -> Self {
        Self { members }
    }
}

impl<'s> IntoIterator for &'s ResolvedSet {
    type Item = &'s MemberDescriptor;
    type IntoIter = std::slice::Iter<'s, MemberDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

/// Raw introspection primitive consumed by the engine and accessors
pub trait ReflectiveBackend: Send + Sync {
    /// Members declared at exactly this class level, in declaration order
    fn enumerate_declared(&self, class: ClassRef) -> Result<Vec<MemberDescriptor>, BackendError>;

    /// Direct superclass, or `None` for the universal root type
    fn superclass_of(&self, class: ClassRef) -> Result<Option<ClassRef>, BackendError>;

    /// Identity of a concrete or named type
    ///
    /// The engine only passes [`TypeDescriptor::Concrete`] and
    /// [`TypeDescriptor::Named`]; multi-candidate descriptors are expanded by
    /// [`TypeDescriptor::resolve`] beforehand.
    fn resolve_type(&self, descriptor: &TypeDescriptor) -> Result<TypeId, BackendError>;

    /// Human-readable class name
    fn class_name(&self, class: ClassRef) -> String {
        class.to_string()
    }

    /// Class of a live instance
    fn instance_class(&self, instance: InstanceRef) -> Option<ClassRef>;

    /// Read a member slot. Non-static members require an instance.
    fn read_field(
        &self,
        member: &MemberDescriptor,
        instance: Option<InstanceRef>,
    ) -> Result<Value, BackendError>;

    /// Write a member slot. Non-static members require an instance.
    fn write_field(
        &self,
        member: &MemberDescriptor,
        instance: Option<InstanceRef>,
        value: Value,
    ) -> Result<(), BackendError>;
}
