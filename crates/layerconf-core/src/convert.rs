//! String <-> value conversion for XML attributes

use crate::value::{Value, ValueType};

/// Converts attribute text to a typed value and back
///
/// Errors are plain messages; the caller wraps them into
/// `ConfigError::InvalidPropertyValue` naming the property.
pub trait Converter: Send + Sync {
    fn parse(&self, raw: &str) -> Result<Value, String>;

    fn render(&self, value: &Value) -> String;
}

/// Default converter for a scalar type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarConverter {
    kind: ScalarKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarKind {
    String,
    Int,
    Bool,
    Float,
}

impl ScalarConverter {
    pub const STRING: ScalarConverter = ScalarConverter {
        kind: ScalarKind::String,
    };
    pub const INT: ScalarConverter = ScalarConverter {
        kind: ScalarKind::Int,
    };
    pub const BOOL: ScalarConverter = ScalarConverter {
        kind: ScalarKind::Bool,
    };
    pub const FLOAT: ScalarConverter = ScalarConverter {
        kind: ScalarKind::Float,
    };

    /// Converter for `value_type`; element types fall back to strings.
    pub fn for_type(value_type: &ValueType) -> &'static ScalarConverter {
        match value_type {
            ValueType::Int => &Self::INT,
            ValueType::Bool => &Self::BOOL,
            ValueType::Float => &Self::FLOAT,
            ValueType::String | ValueType::Element(_) => &Self::STRING,
        }
    }
}

impl Converter for ScalarConverter {
    fn parse(&self, raw: &str) -> Result<Value, String> {
        match self.kind {
            ScalarKind::String => Ok(Value::String(raw.to_string())),
            ScalarKind::Int => raw
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| format!("'{}' is not a valid integer: {}", raw, e)),
            ScalarKind::Bool => {
                let trimmed = raw.trim();
                if trimmed.eq_ignore_ascii_case("true") {
                    Ok(Value::Bool(true))
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Ok(Value::Bool(false))
                } else {
                    Err(format!("'{}' is not a valid boolean", raw))
                }
            }
            ScalarKind::Float => raw
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| format!("'{}' is not a valid number: {}", raw, e)),
        }
    }

    fn render(&self, value: &Value) -> String {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_parses_trimmed() {
        assert_eq!(ScalarConverter::INT.parse(" 12 "), Ok(Value::Int(12)));
        assert!(ScalarConverter::INT.parse("twelve").is_err());
    }

    #[test]
    fn test_bool_case_insensitive_renders_lowercase() {
        assert_eq!(ScalarConverter::BOOL.parse("TRUE"), Ok(Value::Bool(true)));
        assert_eq!(ScalarConverter::BOOL.parse("False"), Ok(Value::Bool(false)));
        assert!(ScalarConverter::BOOL.parse("yes").is_err());
        assert_eq!(ScalarConverter::BOOL.render(&Value::Bool(true)), "true");
    }

    #[test]
    fn test_string_verbatim() {
        assert_eq!(
            ScalarConverter::STRING.parse("  Times New Roman "),
            Ok(Value::from("  Times New Roman "))
        );
        assert_eq!(ScalarConverter::STRING.render(&Value::Null), "");
    }

    #[test]
    fn test_for_type() {
        assert_eq!(ScalarConverter::for_type(&ValueType::Float), &ScalarConverter::FLOAT);
        assert_eq!(
            ScalarConverter::FLOAT.parse("2.5"),
            Ok(Value::Float(2.5))
        );
    }
}
