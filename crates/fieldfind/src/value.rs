//! Runtime values held by field slots
//!
//! [`Value`] is the currency of [`crate::AccessorHandle`] reads and writes.
//! Typed extraction goes through [`FromValue`], which never widens or coerces:
//! an `Int` slot read as `i64` yields `None`, the same way a checked cast
//! would fail on the host platform.

use std::fmt;

use crate::backend::InstanceRef;

/// A value stored in a field
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Absent reference
    #[default]
    Null,
    /// boolean
    Boolean(bool),
    /// 8-bit signed integer
    Byte(i8),
    /// 16-bit signed integer
    Short(i16),
    /// UTF-16 code unit, modeled as a Rust char
    Char(char),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// String reference
    String(String),
    /// Reference to a backend-owned object
    Object(InstanceRef),
    /// Array of values
    Array(Vec<Value>),
}

impl Value {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the runtime kind, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Byte(_) => "byte",
            Value::Short(_) => "short",
            Value::Char(_) => "char",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "String",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Byte(n) => write!(f, "{}", n),
            Value::Short(n) => write!(f, "{}", n),
            Value::Char(c) => write!(f, "{}", c),
            Value::Int(n) => write!(f, "{}", n),
            Value::Long(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Double(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Object(r) => write!(f, "{}", r),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Checked extraction of a Rust type from a [`Value`].
///
/// Implementations return `None` on any kind mismatch, including `Null`.
pub trait FromValue: Sized {
    /// Extract, or `None` if the value has a different kind
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! from_value_variant {
    ($ty:ty, $variant:ident) => {
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    };
}

from_value_variant!(bool, Boolean);
from_value_variant!(i8, Byte);
from_value_variant!(i16, Short);
from_value_variant!(char, Char);
from_value_variant!(i32, Int);
from_value_variant!(i64, Long);
from_value_variant!(f32, Float);
from_value_variant!(f64, Double);
from_value_variant!(String, String);
from_value_variant!(InstanceRef, Object);
from_value_variant!(Vec<Value>, Array);

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_value_exact_kind() {
        assert_eq!(i32::from_value(&Value::Int(7)), Some(7));
        assert_eq!(bool::from_value(&Value::Boolean(true)), Some(true));
        assert_eq!(
            String::from_value(&Value::String("x".to_string())),
            Some("x".to_string())
        );
    }

    #[test]
    fn test_from_value_never_widens() {
        assert_eq!(i64::from_value(&Value::Int(7)), None);
        assert_eq!(f64::from_value(&Value::Float(1.5)), None);
        assert_eq!(i32::from_value(&Value::Null), None);
        assert_eq!(i32::from_value(&Value::String("7".to_string())), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(
            Value::Array(vec![Value::Int(1), Value::Int(2)]).to_string(),
            "[1, 2]"
        );
        assert_eq!(Value::from("hi").to_string(), "hi");
    }

    #[test]
    fn test_default_is_null() {
        assert_eq!(Value::default(), Value::Null);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Int(0).type_name(), "int");
        assert_eq!(Value::String(String::new()).type_name(), "String");
        assert_eq!(Value::Object(InstanceRef(3)).type_name(), "object");
    }
}
