//! Class model files
//!
//! A class model is a TOML description of classes and their declared fields,
//! loaded into a [`ClassRegistry`]:
//!
//! ```toml
//! [[class]]
//! name = "demo.Base"
//!
//! [[class.field]]
//! name = "count"
//! type = "int"
//! modifiers = "PRIVATE|STATIC"
//! value = 3
//!
//! [[class]]
//! name = "demo.Derived"
//! extends = "demo.Base"
//! restricted = "hidden api"
//! ```
//!
//! Parents must be declared before their subclasses. Field types may name a
//! primitive, `String`, any class of the model, or an array of those (`int[]`).
//! `value` is only allowed on static fields.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ClassRegistry, PrimitiveKind, RegistryError, STRING_TYPE};
use crate::backend::{ReflectiveBackend, TypeId};
use crate::condition::Modifiers;
use crate::value::Value;

/// Errors that can occur while loading a class model
#[derive(Debug, Error)]
pub enum ModelError {
    /// Failed to read the model file
    #[error("Failed to read class model: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse class model: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Registry rejected a definition
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Validation error
    #[error("Invalid class model: {0}")]
    ValidationError(String),
}

/// Root of a class model file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClassModel {
    /// Classes in declaration order
    #[serde(default, rename = "class")]
    pub classes: Vec<ClassDef>,
}

/// One class of the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassDef {
    /// Fully-qualified class name
    pub name: String,

    /// Parent class name (defaults to the root class)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    /// Restriction reason; enumeration of this class fails when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restricted: Option<String>,

    /// Declared fields in declaration order
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldDef>,
}

/// One declared field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDef {
    /// Field name
    pub name: String,

    /// Declared type name
    #[serde(rename = "type")]
    pub field_type: String,

    /// Modifier flags, e.g. `"PRIVATE|STATIC"`
    #[serde(default)]
    pub modifiers: String,

    /// Initial value of a static field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<toml::Value>,
}

impl ClassModel {
    /// Parse a model from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ModelError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a model file
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Build a fresh registry holding every class of the model
    pub fn build_registry(&self) -> Result<ClassRegistry, ModelError> {
        let mut registry = ClassRegistry::new();

        let mut defined = Vec::with_capacity(self.classes.len());
        for class in &self.classes {
            let parent = match &class.extends {
                Some(name) => Some(registry.class_named(name).ok_or_else(|| {
                    ModelError::ValidationError(format!(
                        "parent class {} of {} must be declared before it",
                        name, class.name
                    ))
                })?),
                None => None,
            };
            let id = registry.define_class(&class.name, parent)?;
            if let Some(reason) = &class.restricted {
                registry.restrict(id, reason)?;
            }
            defined.push(id);
        }

        for (class, id) in self.classes.iter().zip(defined) {
            for field in &class.fields {
                let field_type = resolve_type_name(&mut registry, &field.field_type)?;
                let modifiers = Modifiers::parse(&field.modifiers).ok_or_else(|| {
                    ModelError::ValidationError(format!(
                        "bad modifiers {:?} on {}.{}",
                        field.modifiers, class.name, field.name
                    ))
                })?;
                let handle = registry.add_field(id, &field.name, field_type, modifiers)?;

                let Some(raw) = &field.value else {
                    continue;
                };
                if !modifiers.contains(Modifiers::STATIC) {
                    return Err(ModelError::ValidationError(format!(
                        "initial value on non-static field {}.{}",
                        class.name, field.name
                    )));
                }
                let value = convert_value(&field.field_type, raw).ok_or_else(|| {
                    ModelError::ValidationError(format!(
                        "value {} does not fit {} for {}.{}",
                        raw, field.field_type, class.name, field.name
                    ))
                })?;
                let member = registry
                    .member(handle)
                    .cloned()
                    .ok_or_else(|| ModelError::ValidationError(format!("lost field {}", field.name)))?;
                registry
                    .write_field(&member, None, value)
                    .map_err(|e| ModelError::ValidationError(e.to_string()))?;
            }
        }

        Ok(registry)
    }
}

fn resolve_type_name(registry: &mut ClassRegistry, name: &str) -> Result<TypeId, ModelError> {
    if let Some(element) = name.strip_suffix("[]") {
        let element = resolve_type_name(registry, element)?;
        return Ok(registry.array_type(element)?);
    }
    registry
        .type_named(name)
        .ok_or_else(|| ModelError::ValidationError(format!("unknown type {}", name)))
}

fn convert_value(type_name: &str, raw: &toml::Value) -> Option<Value> {
    use toml::Value as T;

    if let Some(element) = type_name.strip_suffix("[]") {
        let T::Array(items) = raw else {
            return None;
        };
        return items
            .iter()
            .map(|item| convert_value(element, item))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array);
    }

    let kind = PrimitiveKind::ALL.into_iter().find(|k| k.name() == type_name);
    match (kind, raw) {
        (Some(PrimitiveKind::Boolean), T::Boolean(b)) => Some(Value::Boolean(*b)),
        (Some(PrimitiveKind::Byte), T::Integer(n)) => i8::try_from(*n).ok().map(Value::Byte),
        (Some(PrimitiveKind::Short), T::Integer(n)) => i16::try_from(*n).ok().map(Value::Short),
        (Some(PrimitiveKind::Int), T::Integer(n)) => i32::try_from(*n).ok().map(Value::Int),
        (Some(PrimitiveKind::Long), T::Integer(n)) => Some(Value::Long(*n)),
        (Some(PrimitiveKind::Float), T::Float(f)) => Some(Value::Float(*f as f32)),
        (Some(PrimitiveKind::Float), T::Integer(n)) => Some(Value::Float(*n as f32)),
        (Some(PrimitiveKind::Double), T::Float(f)) => Some(Value::Double(*f)),
        (Some(PrimitiveKind::Double), T::Integer(n)) => Some(Value::Double(*n as f64)),
        (Some(PrimitiveKind::Char), T::String(s)) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Value::Char(c)),
                _ => None,
            }
        }
        (None, T::String(s)) if type_name == STRING_TYPE => Some(Value::String(s.clone())),
        _ => None,
    }
}
