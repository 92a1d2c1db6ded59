//! Typed reads and writes on resolved members
//!
//! An [`AccessorHandle`] pairs a [`MemberDescriptor`] with an optional
//! instance. Generic reads return `Result`; the typed convenience reads never
//! fail and fall back to a fixed zero value:
//!
//! | read        | default |
//! |-------------|---------|
//! | `int`       | `0`     |
//! | `long`      | `0`     |
//! | `short`     | `0`     |
//! | `byte`      | `0`     |
//! | `double`    | `0.0`   |
//! | `float`     | `0.0`   |
//! | `boolean`   | `false` |
//! | `char`      | `' '`   |
//! | `string`    | `""`    |
//! | `array`     | `[]`    |
//!
//! Reading a non-static member without an instance is a caller error: the
//! generic [`AccessorHandle::read`] returns [`BackendError::InstanceRequired`]
//! and the typed reads log a warning before returning their default.

use std::fmt;

use crate::backend::{InstanceRef, MemberDescriptor, ReflectiveBackend, ResolvedSet};
use crate::error::BackendError;
use crate::value::{FromValue, Value};

/// A resolved member bound to an optional instance
#[derive(Clone)]
pub struct AccessorHandle<'a> {
    backend: &'a dyn ReflectiveBackend,
    member: MemberDescriptor,
    instance: Option<InstanceRef>,
}

impl<'a> AccessorHandle<'a> {
    /// Bind a member to an instance (`None` for static members)
    pub fn bind(
        backend: &'a dyn ReflectiveBackend,
        member: MemberDescriptor,
        instance: Option<InstanceRef>,
    ) -> Self {
        Self {
            backend,
            member,
            instance,
        }
    }

    /// The bound member
    pub fn member(&self) -> &MemberDescriptor {
        &self.member
    }

    /// The bound instance
    pub fn instance(&self) -> Option<InstanceRef> {
        self.instance
    }

    /// Read the current value
    pub fn read(&self) -> Result<Value, BackendError> {
        self.backend.read_field(&self.member, self.instance)
    }

    /// Read the current value, `None` on any failure
    pub fn any(&self) -> Option<Value> {
        self.read().ok()
    }

    /// Read and extract as `T`, `None` on failure or kind mismatch
    pub fn cast<T: FromValue>(&self) -> Option<T> {
        self.any().and_then(|v| T::from_value(&v))
    }

    fn typed_or<T: FromValue>(&self, default: T) -> T {
        match self.read() {
            Ok(value) => T::from_value(&value).unwrap_or(default),
            Err(e) => {
                tracing::warn!(
                    member = %self.member.name,
                    error = %e,
                    "Field read failed, using default"
                );
                default
            }
        }
    }

    /// Read as `int`, default `0`
    pub fn int(&self) -> i32 {
        self.typed_or(0)
    }

    /// Read as `long`, default `0`
    pub fn long(&self) -> i64 {
        self.typed_or(0)
    }

    /// Read as `short`, default `0`
    pub fn short(&self) -> i16 {
        self.typed_or(0)
    }

    /// Read as `byte`, default `0`
    pub fn byte(&self) -> i8 {
        self.typed_or(0)
    }

    /// Read as `double`, default `0.0`
    pub fn double(&self) -> f64 {
        self.typed_or(0.0)
    }

    /// Read as `float`, default `0.0`
    pub fn float(&self) -> f32 {
        self.typed_or(0.0)
    }

    /// Read as `boolean`, default `false`
    pub fn boolean(&self) -> bool {
        self.typed_or(false)
    }

    /// Read as `char`, default `' '`
    pub fn char(&self) -> char {
        self.typed_or(' ')
    }

    /// Read as `String`, default empty
    pub fn string(&self) -> String {
        self.typed_or(String::new())
    }

    /// Read as an array, default empty
    pub fn array(&self) -> Vec<Value> {
        self.typed_or(Vec::new())
    }

    /// Same as [`AccessorHandle::array`]
    pub fn list(&self) -> Vec<Value> {
        self.array()
    }

    /// Store a value
    pub fn write(&self, value: impl Into<Value>) -> Result<(), BackendError> {
        self.backend
            .write_field(&self.member, self.instance, value.into())
    }

    /// Store `true`
    pub fn set_true(&self) -> Result<(), BackendError> {
        self.write(true)
    }

    /// Store `false`
    pub fn set_false(&self) -> Result<(), BackendError> {
        self.write(false)
    }

    /// Store `null`
    pub fn set_null(&self) -> Result<(), BackendError> {
        self.write(Value::Null)
    }
}

impl fmt::Debug for AccessorHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorHandle")
            .field("member", &self.member)
            .field("instance", &self.instance)
            .finish()
    }
}

impl fmt::Display for AccessorHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let owner = self.backend.class_name(self.member.declaring_class);
        match self.read() {
            Ok(value) => write!(
                f,
                "[{}] in [{}] value \"{}\"",
                self.member.type_name, owner, value
            ),
            Err(e) => write!(
                f,
                "[{}] in [{}] value unavailable ({})",
                self.member.type_name, owner, e
            ),
        }
    }
}

/// Batch binder over a [`ResolvedSet`]
#[derive(Clone, Copy)]
pub struct AccessorBinder<'a> {
    backend: &'a dyn ReflectiveBackend,
}

impl<'a> AccessorBinder<'a> {
    /// Create a binder over a backend
    pub fn new(backend: &'a dyn ReflectiveBackend) -> Self {
        Self { backend }
    }

    /// Bind a single member
    pub fn bind(&self, member: &MemberDescriptor, instance: Option<InstanceRef>) -> AccessorHandle<'a> {
        AccessorHandle::bind(self.backend, member.clone(), instance)
    }

    /// One handle per member, in set order
    pub fn bind_all(&self, set: &ResolvedSet, instance: Option<InstanceRef>) -> Vec<AccessorHandle<'a>> {
        set.iter().map(|m| self.bind(m, instance)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Modifiers;
    use crate::registry::{ClassRegistry, PrimitiveKind};

    struct Fixture {
        registry: ClassRegistry,
        label: MemberDescriptor,
        count: MemberDescriptor,
        flag: MemberDescriptor,
        instance: InstanceRef,
    }

    fn fixture() -> Fixture {
        let mut registry = ClassRegistry::new();
        let class = registry.define_class("demo.Holder", None).unwrap();
        let string = registry.string_type();
        let int = registry.primitive(PrimitiveKind::Int);
        let boolean = registry.primitive(PrimitiveKind::Boolean);
        let label = registry
            .add_field(class, "label", string, Modifiers::PRIVATE)
            .unwrap();
        let count = registry
            .add_field(class, "count", int, Modifiers::STATIC)
            .unwrap();
        let flag = registry
            .add_field(class, "flag", boolean, Modifiers::NONE)
            .unwrap();
        let instance = registry.instantiate(class).unwrap();
        Fixture {
            label: registry.member(label).cloned().unwrap(),
            count: registry.member(count).cloned().unwrap(),
            flag: registry.member(flag).cloned().unwrap(),
            instance,
            registry,
        }
    }

    #[test]
    fn test_typed_read_defaults_on_mismatch() {
        let fx = fixture();
        let handle = AccessorHandle::bind(&fx.registry, fx.label.clone(), Some(fx.instance));
        handle.write("hello").unwrap();

        assert_eq!(handle.int(), 0);
        assert_eq!(handle.long(), 0);
        assert_eq!(handle.char(), ' ');
        assert!(!handle.boolean());
        assert_eq!(handle.string(), "hello");
        assert_eq!(handle.cast::<i32>(), None);
        assert_eq!(handle.cast::<String>().as_deref(), Some("hello"));
    }

    #[test]
    fn test_list_reads_array_values() {
        let mut registry = ClassRegistry::new();
        let class = registry.define_class("demo.Bag", None).unwrap();
        let int = registry.primitive(PrimitiveKind::Int);
        let ints = registry.array_type(int).unwrap();
        let items = registry
            .add_field(class, "items", ints, Modifiers::STATIC)
            .unwrap();
        let member = registry.member(items).cloned().unwrap();
        let handle = AccessorHandle::bind(&registry, member, None);

        handle
            .write(Value::Array(vec![Value::Int(1), Value::Int(2)]))
            .unwrap();
        assert_eq!(handle.list(), vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(handle.list(), handle.array());

        let fx = fixture();
        let label = AccessorHandle::bind(&fx.registry, fx.label.clone(), Some(fx.instance));
        assert!(label.list().is_empty());
    }

    #[test]
    fn test_static_needs_no_instance() {
        let fx = fixture();
        let handle = AccessorHandle::bind(&fx.registry, fx.count.clone(), None);
        handle.write(42).unwrap();
        assert_eq!(handle.int(), 42);
        assert_eq!(handle.read().unwrap(), Value::Int(42));
    }

    #[test]
    fn test_instance_required() {
        let fx = fixture();
        let handle = AccessorHandle::bind(&fx.registry, fx.flag.clone(), None);
        assert!(matches!(
            handle.read(),
            Err(BackendError::InstanceRequired { .. })
        ));
        assert!(!handle.boolean());
        assert!(handle.set_true().is_err());
    }

    #[test]
    fn test_boolean_writers() {
        let fx = fixture();
        let handle = AccessorHandle::bind(&fx.registry, fx.flag.clone(), Some(fx.instance));
        handle.set_true().unwrap();
        assert!(handle.boolean());
        handle.set_false().unwrap();
        assert!(!handle.boolean());
        assert!(handle.set_null().is_err());
    }

    #[test]
    fn test_set_null_on_reference() {
        let fx = fixture();
        let handle = AccessorHandle::bind(&fx.registry, fx.label.clone(), Some(fx.instance));
        handle.write("x").unwrap();
        handle.set_null().unwrap();
        assert_eq!(handle.any(), Some(Value::Null));
        assert_eq!(handle.string(), "");
    }

    #[test]
    fn test_display() {
        let fx = fixture();
        let handle = AccessorHandle::bind(&fx.registry, fx.count.clone(), None);
        handle.write(5).unwrap();
        assert_eq!(handle.to_string(), "[int] in [demo.Holder] value \"5\"");
    }

    #[test]
    fn test_bind_all_preserves_order() {
        let fx = fixture();
        let set = ResolvedSet::from(vec![fx.flag.clone(), fx.label.clone()]);
        let handles = AccessorBinder::new(&fx.registry).bind_all(&set, Some(fx.instance));
        let names: Vec<_> = handles.iter().map(|h| h.member().name.as_str()).collect();
        assert_eq!(names, vec!["flag", "label"]);
        assert_eq!(handles[0].instance(), Some(fx.instance));
    }
}
