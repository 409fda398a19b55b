//! Typed property values and the enums that describe their provenance

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::schema::PropertySchema;

/// Resolves the schema of a nested element type
///
/// `registry::schema_of::<T>` is the usual implementation.
pub type SchemaSource = fn() -> Result<Arc<PropertySchema>>;

/// Scalar payload of a property
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    String(String),
    Int(i64),
    Bool(bool),
    Float(f64),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Stable hash of the value; floats hash by bit pattern.
    pub fn hash_code(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        match self {
            Value::Null => 0u8.hash(&mut hasher),
            Value::String(s) => {
                1u8.hash(&mut hasher);
                s.hash(&mut hasher);
            }
            Value::Int(i) => {
                2u8.hash(&mut hasher);
                i.hash(&mut hasher);
            }
            Value::Bool(b) => {
                3u8.hash(&mut hasher);
                b.hash(&mut hasher);
            }
            Value::Float(f) => {
                4u8.hash(&mut hasher);
                f.to_bits().hash(&mut hasher);
            }
        }
        hasher.finish()
    }

    pub(crate) fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::String(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

/// Declared type of a property
#[derive(Clone, Copy)]
pub enum ValueType {
    String,
    Int,
    Bool,
    Float,
    /// Nested element whose schema is resolved on construction
    Element(SchemaSource),
}

impl ValueType {
    pub fn is_element(&self) -> bool {
        matches!(self, ValueType::Element(_))
    }

    /// Whether `value` can be stored in a property of this type.
    ///
    /// `Null` is accepted by every scalar type. Element types accept no
    /// scalar value.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ValueType::String | ValueType::Int | ValueType::Bool | ValueType::Float, Value::Null)
                | (ValueType::String, Value::String(_))
                | (ValueType::Int, Value::Int(_))
                | (ValueType::Bool, Value::Bool(_))
                | (ValueType::Float, Value::Float(_))
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Int => "int",
            ValueType::Bool => "bool",
            ValueType::Float => "float",
            ValueType::Element(_) => "element",
        }
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Provenance of a property's current value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueOrigin {
    /// Descriptor default; nothing supplied it
    Default,
    /// Copied from the parent layer
    Inherited,
    /// Declared in this layer or assigned at runtime
    SetHere,
}

/// What to re-emit when writing a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveMode {
    /// Everything, including values equal to the parent
    Full,
    /// Explicitly declared or changed values
    Modified,
    /// Only what differs from the parent
    Minimal,
}

impl SaveMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveMode::Full => "full",
            SaveMode::Modified => "modified",
            SaveMode::Minimal => "minimal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_matching_and_null() {
        assert!(ValueType::Int.accepts(&Value::Int(3)));
        assert!(ValueType::Int.accepts(&Value::Null));
        assert!(!ValueType::Int.accepts(&Value::from("3")));
        assert!(ValueType::Bool.accepts(&Value::Bool(false)));
        assert!(!ValueType::Float.accepts(&Value::Int(1)));
    }

    #[test]
    fn test_hash_code_distinguishes_variants() {
        assert_ne!(Value::Int(1).hash_code(), Value::from("1").hash_code());
        assert_eq!(Value::Float(1.5).hash_code(), Value::Float(1.5).hash_code());
        assert_eq!(Value::Null.hash_code(), Value::default().hash_code());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Int(-4).to_string(), "-4");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn test_origin_serializes_snake_case() {
        let json = serde_json::to_string(&ValueOrigin::SetHere).unwrap();
        assert_eq!(json, "\"set_here\"");
        let mode: SaveMode = serde_json::from_str("\"minimal\"").unwrap();
        assert_eq!(mode, SaveMode::Minimal);
    }
}
