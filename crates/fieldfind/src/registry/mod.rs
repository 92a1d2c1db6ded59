//! In-memory class registry
//!
//! A self-contained [`ReflectiveBackend`] holding class metadata, declared
//! fields, live instances and static storage. It backs the CLI and the test
//! suites, and serves as a reference for hosts wiring the engine to their own
//! metadata source.
//!
//! Class `0` is always the universal root type `Object`. Every class defined
//! without an explicit parent extends it.

mod model;

pub use model::{ClassDef, ClassModel, FieldDef, ModelError};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::backend::{
    ClassRef, InstanceRef, MemberDescriptor, MemberHandle, ReflectiveBackend, TypeId,
};
use crate::condition::Modifiers;
use crate::error::BackendError;
use crate::spec::TypeDescriptor;
use crate::value::Value;

/// Name of the universal root class
pub const ROOT_CLASS: &str = "Object";

/// Name of the built-in string type
pub const STRING_TYPE: &str = "String";

/// Errors raised while populating a registry
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RegistryError {
    /// A class with this name already exists
    #[error("Duplicate class: {0}")]
    DuplicateClass(String),

    /// Class reference not issued by this registry
    #[error("Unknown class reference: {0}")]
    UnknownClass(ClassRef),

    /// Type identity not issued by this registry
    #[error("Unknown type: {0}")]
    UnknownType(TypeId),

    /// Field already declared at this class level
    #[error("Duplicate field {field} in {class}")]
    DuplicateField {
        /// Declaring class name
        class: String,
        /// Field name
        field: String,
    },
}

/// Primitive value kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// boolean
    Boolean,
    /// byte
    Byte,
    /// short
    Short,
    /// char
    Char,
    /// int
    Int,
    /// long
    Long,
    /// float
    Float,
    /// double
    Double,
}

impl PrimitiveKind {
    /// Every primitive kind
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Char,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
    ];

    /// Source-level type name
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    /// Zero value a fresh slot holds
    pub fn default_value(self) -> Value {
        match self {
            PrimitiveKind::Boolean => Value::Boolean(false),
            PrimitiveKind::Byte => Value::Byte(0),
            PrimitiveKind::Short => Value::Short(0),
            PrimitiveKind::Char => Value::Char('\0'),
            PrimitiveKind::Int => Value::Int(0),
            PrimitiveKind::Long => Value::Long(0),
            PrimitiveKind::Float => Value::Float(0.0),
            PrimitiveKind::Double => Value::Double(0.0),
        }
    }

    /// Whether `value` has exactly this kind
    pub fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (PrimitiveKind::Boolean, Value::Boolean(_))
                | (PrimitiveKind::Byte, Value::Byte(_))
                | (PrimitiveKind::Short, Value::Short(_))
                | (PrimitiveKind::Char, Value::Char(_))
                | (PrimitiveKind::Int, Value::Int(_))
                | (PrimitiveKind::Long, Value::Long(_))
                | (PrimitiveKind::Float, Value::Float(_))
                | (PrimitiveKind::Double, Value::Double(_))
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeKind {
    Primitive(PrimitiveKind),
    String,
    Class(ClassRef),
    Array(TypeId),
}

#[derive(Debug, Clone)]
struct TypeEntry {
    name: String,
    kind: TypeKind,
}

#[derive(Debug, Clone)]
struct ClassEntry {
    name: String,
    parent: Option<ClassRef>,
    fields: Vec<MemberDescriptor>,
    restricted: Option<String>,
}

#[derive(Debug)]
struct ObjectSlot {
    class: ClassRef,
    values: FxHashMap<MemberHandle, Value>,
}

/// In-memory [`ReflectiveBackend`]
#[derive(Debug)]
pub struct ClassRegistry {
    classes: Vec<ClassEntry>,
    class_indices: FxHashMap<String, ClassRef>,
    types: Vec<TypeEntry>,
    type_indices: FxHashMap<String, TypeId>,
    primitives: FxHashMap<PrimitiveKind, TypeId>,
    heap: RwLock<Vec<ObjectSlot>>,
    statics: RwLock<FxHashMap<MemberHandle, Value>>,
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassRegistry {
    /// Create a registry holding the root class, the primitives and `String`
    pub fn new() -> Self {
        let mut registry = Self {
            classes: Vec::new(),
            class_indices: FxHashMap::default(),
            types: Vec::new(),
            type_indices: FxHashMap::default(),
            primitives: FxHashMap::default(),
            heap: RwLock::new(Vec::new()),
            statics: RwLock::new(FxHashMap::default()),
        };

        let root = ClassRef(0);
        registry.classes.push(ClassEntry {
            name: ROOT_CLASS.to_string(),
            parent: None,
            fields: Vec::new(),
            restricted: None,
        });
        registry.class_indices.insert(ROOT_CLASS.to_string(), root);
        registry.intern_type(ROOT_CLASS, TypeKind::Class(root));

        for kind in PrimitiveKind::ALL {
            let id = registry.intern_type(kind.name(), TypeKind::Primitive(kind));
            registry.primitives.insert(kind, id);
        }
        registry.intern_type(STRING_TYPE, TypeKind::String);
        registry
    }

    fn intern_type(&mut self, name: &str, kind: TypeKind) -> TypeId {
        if let Some(id) = self.type_indices.get(name) {
            return *id;
        }
        let id = TypeId(self.types.len());
        self.types.push(TypeEntry {
            name: name.to_string(),
            kind,
        });
        self.type_indices.insert(name.to_string(), id);
        id
    }

    fn entry(&self, class: ClassRef) -> Result<&ClassEntry, BackendError> {
        self.classes
            .get(class.0)
            .ok_or(BackendError::UnknownClass(class))
    }

    /// The universal root class
    pub fn root(&self) -> ClassRef {
        ClassRef(0)
    }

    /// Define a class. `parent = None` extends the root class.
    pub fn define_class(
        &mut self,
        name: &str,
        parent: Option<ClassRef>,
    ) -> Result<ClassRef, RegistryError> {
        if self.class_indices.contains_key(name) || self.type_indices.contains_key(name) {
            return Err(RegistryError::DuplicateClass(name.to_string()));
        }
        let parent = parent.unwrap_or(self.root());
        if parent.0 >= self.classes.len() {
            return Err(RegistryError::UnknownClass(parent));
        }

        let class = ClassRef(self.classes.len());
        self.classes.push(ClassEntry {
            name: name.to_string(),
            parent: Some(parent),
            fields: Vec::new(),
            restricted: None,
        });
        self.class_indices.insert(name.to_string(), class);
        self.intern_type(name, TypeKind::Class(class));
        Ok(class)
    }

    /// Declare a field at the end of `class`'s declaration order.
    ///
    /// Static fields are zero-initialized immediately.
    pub fn add_field(
        &mut self,
        class: ClassRef,
        name: &str,
        field_type: TypeId,
        modifiers: Modifiers,
    ) -> Result<MemberHandle, RegistryError> {
        let type_entry = self
            .types
            .get(field_type.0)
            .ok_or(RegistryError::UnknownType(field_type))?;
        let type_name = type_entry.name.clone();
        let initial = default_for(type_entry.kind);

        let entry = self
            .classes
            .get_mut(class.0)
            .ok_or(RegistryError::UnknownClass(class))?;
        if entry.fields.iter().any(|f| f.name == name) {
            return Err(RegistryError::DuplicateField {
                class: entry.name.clone(),
                field: name.to_string(),
            });
        }

        let handle = MemberHandle::new(((class.0 as u64) << 32) | entry.fields.len() as u64);
        entry.fields.push(MemberDescriptor {
            name: name.to_string(),
            field_type,
            type_name,
            modifiers,
            declaring_class: class,
            handle,
        });

        if modifiers.contains(Modifiers::STATIC) {
            self.statics.write().insert(handle, initial);
        }
        Ok(handle)
    }

    /// Mark a class as off-limits for introspection
    pub fn restrict(&mut self, class: ClassRef, reason: &str) -> Result<(), RegistryError> {
        let entry = self
            .classes
            .get_mut(class.0)
            .ok_or(RegistryError::UnknownClass(class))?;
        entry.restricted = Some(reason.to_string());
        Ok(())
    }

    /// Type identity of a primitive kind
    pub fn primitive(&self, kind: PrimitiveKind) -> TypeId {
        // Interned for every kind in `new`
        self.primitives.get(&kind).copied().unwrap_or(TypeId(0))
    }

    /// Type identity of `String`
    pub fn string_type(&self) -> TypeId {
        self.type_indices
            .get(STRING_TYPE)
            .copied()
            .unwrap_or(TypeId(0))
    }

    /// Type identity of a class
    pub fn class_type(&self, class: ClassRef) -> Result<TypeId, RegistryError> {
        let entry = self
            .classes
            .get(class.0)
            .ok_or(RegistryError::UnknownClass(class))?;
        self.type_indices
            .get(&entry.name)
            .copied()
            .ok_or(RegistryError::UnknownClass(class))
    }

    /// Type identity of an array of `element`, interning it on first use
    pub fn array_type(&mut self, element: TypeId) -> Result<TypeId, RegistryError> {
        let name = format!(
            "{}[]",
            self.types
                .get(element.0)
                .ok_or(RegistryError::UnknownType(element))?
                .name
        );
        Ok(self.intern_type(&name, TypeKind::Array(element)))
    }

    /// Look up a type by name
    pub fn type_named(&self, name: &str) -> Option<TypeId> {
        self.type_indices.get(name).copied()
    }

    /// Name of a type
    pub fn type_name(&self, id: TypeId) -> Option<&str> {
        self.types.get(id.0).map(|t| t.name.as_str())
    }

    /// Look up a class by name
    pub fn class_named(&self, name: &str) -> Option<ClassRef> {
        self.class_indices.get(name).copied()
    }

    /// All classes, root first, in definition order
    pub fn classes(&self) -> impl Iterator<Item = ClassRef> + '_ {
        (0..self.classes.len()).map(ClassRef)
    }

    /// Fields declared at exactly this class level
    pub fn declared_fields(&self, class: ClassRef) -> &[MemberDescriptor] {
        self.classes
            .get(class.0)
            .map(|c| c.fields.as_slice())
            .unwrap_or(&[])
    }

    /// Descriptor for a handle issued by [`Self::add_field`]
    pub fn member(&self, handle: MemberHandle) -> Option<&MemberDescriptor> {
        let raw = handle.raw();
        let class = (raw >> 32) as usize;
        let slot = (raw & 0xFFFF_FFFF) as usize;
        self.classes.get(class)?.fields.get(slot)
    }

    /// Direct parent of a class
    pub fn parent(&self, class: ClassRef) -> Option<ClassRef> {
        self.classes.get(class.0).and_then(|c| c.parent)
    }

    /// Inheritance chain from `class` up to and including the root
    pub fn hierarchy(&self, class: ClassRef) -> Vec<ClassRef> {
        let mut chain = Vec::new();
        let mut current = Some(class);
        while let Some(id) = current {
            if id.0 >= self.classes.len() || chain.contains(&id) {
                break;
            }
            chain.push(id);
            current = self.parent(id);
        }
        chain
    }

    /// Check if `sub` is `sup` or inherits from it
    pub fn is_subclass_of(&self, sub: ClassRef, sup: ClassRef) -> bool {
        self.hierarchy(sub).contains(&sup)
    }

    /// Allocate an instance with every inherited instance field zeroed
    pub fn instantiate(&self, class: ClassRef) -> Result<InstanceRef, RegistryError> {
        if class.0 >= self.classes.len() {
            return Err(RegistryError::UnknownClass(class));
        }

        let mut values = FxHashMap::default();
        for level in self.hierarchy(class) {
            for field in self.declared_fields(level) {
                if field.is_static() {
                    continue;
                }
                let kind = self
                    .types
                    .get(field.field_type.0)
                    .map(|t| t.kind)
                    .ok_or(RegistryError::UnknownType(field.field_type))?;
                values.insert(field.handle, default_for(kind));
            }
        }

        let mut heap = self.heap.write();
        let instance = InstanceRef(heap.len());
        heap.push(ObjectSlot { class, values });
        Ok(instance)
    }

    fn accepts(&self, field_type: TypeId, value: &Value) -> bool {
        let Some(entry) = self.types.get(field_type.0) else {
            return false;
        };
        match (entry.kind, value) {
            (TypeKind::Primitive(kind), v) => kind.accepts(v),
            (_, Value::Null) => true,
            (TypeKind::String, Value::String(_)) => true,
            (TypeKind::Class(class), Value::Object(instance)) => self
                .instance_class(*instance)
                .is_some_and(|actual| self.is_subclass_of(actual, class)),
            (TypeKind::Array(element), Value::Array(items)) => {
                items.iter().all(|item| self.accepts(element, item))
            }
            _ => false,
        }
    }

    fn check_instance(
        &self,
        member: &MemberDescriptor,
        instance: Option<InstanceRef>,
    ) -> Result<InstanceRef, BackendError> {
        let instance = instance.ok_or_else(|| BackendError::InstanceRequired {
            member: member.name.clone(),
        })?;
        let actual = self
            .instance_class(instance)
            .ok_or(BackendError::UnknownInstance(instance))?;
        if !self.is_subclass_of(actual, member.declaring_class) {
            return Err(BackendError::IncompatibleInstance {
                member: member.name.clone(),
                expected: self.class_name(member.declaring_class),
                actual: self.class_name(actual),
            });
        }
        Ok(instance)
    }
}

fn default_for(kind: TypeKind) -> Value {
    match kind {
        TypeKind::Primitive(p) => p.default_value(),
        _ => Value::Null,
    }
}

impl ReflectiveBackend for ClassRegistry {
    fn enumerate_declared(&self, class: ClassRef) -> Result<Vec<MemberDescriptor>, BackendError> {
        let entry = self.entry(class)?;
        if let Some(reason) = &entry.restricted {
            return Err(BackendError::AccessDenied {
                class: entry.name.clone(),
                reason: reason.clone(),
            });
        }
        Ok(entry.fields.clone())
    }

    fn superclass_of(&self, class: ClassRef) -> Result<Option<ClassRef>, BackendError> {
        Ok(self.entry(class)?.parent)
    }

    fn resolve_type(&self, descriptor: &TypeDescriptor) -> Result<TypeId, BackendError> {
        match descriptor {
            TypeDescriptor::Concrete(id) if id.0 < self.types.len() => Ok(*id),
            TypeDescriptor::Named(name) => {
                self.type_named(name)
                    .ok_or_else(|| BackendError::UnknownType { name: name.clone() })
            }
            TypeDescriptor::AnyOf(_) => descriptor.resolve(self),
            other => Err(BackendError::UnknownType {
                name: other.describe(),
            }),
        }
    }

    fn class_name(&self, class: ClassRef) -> String {
        self.classes
            .get(class.0)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| class.to_string())
    }

    fn instance_class(&self, instance: InstanceRef) -> Option<ClassRef> {
        self.heap.read().get(instance.0).map(|slot| slot.class)
    }

    fn read_field(
        &self,
        member: &MemberDescriptor,
        instance: Option<InstanceRef>,
    ) -> Result<Value, BackendError> {
        if member.is_static() {
            return Ok(self
                .statics
                .read()
                .get(&member.handle)
                .cloned()
                .unwrap_or(Value::Null));
        }

        let instance = self.check_instance(member, instance)?;
        let heap = self.heap.read();
        let slot = heap
            .get(instance.0)
            .ok_or(BackendError::UnknownInstance(instance))?;
        Ok(slot
            .values
            .get(&member.handle)
            .cloned()
            .unwrap_or(Value::Null))
    }

    fn write_field(
        &self,
        member: &MemberDescriptor,
        instance: Option<InstanceRef>,
        value: Value,
    ) -> Result<(), BackendError> {
        if !self.accepts(member.field_type, &value) {
            return Err(BackendError::IncompatibleValue {
                member: member.name.clone(),
                expected: member.type_name.clone(),
                value: format!("{} ({})", value, value.type_name()),
            });
        }

        if member.is_static() {
            self.statics.write().insert(member.handle, value);
            return Ok(());
        }

        let instance = self.check_instance(member, instance)?;
        let mut heap = self.heap.write();
        let slot = heap
            .get_mut(instance.0)
            .ok_or(BackendError::UnknownInstance(instance))?;
        slot.values.insert(member.handle, value);
        Ok(())
    }
}
