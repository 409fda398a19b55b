use std::fmt;

use thiserror::Error;

/// Result type alias using ConfigError
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Position in an XML source, 1-based.
///
/// Errors raised while reading a layer carry the location of the offending
/// node; errors raised by the programmatic API carry `Location::UNKNOWN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub const UNKNOWN: Location = Location { line: 0, column: 0 };

    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Compute the line/column of a byte offset within `source`.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let prefix = &source.as_bytes()[..offset];
        let line = prefix.iter().filter(|b| **b == b'\n').count() + 1;
        let line_start = prefix
            .iter()
            .rposition(|b| *b == b'\n')
            .map(|p| p + 1)
            .unwrap_or(0);
        let column = offset - line_start + 1;
        Self {
            line: u32::try_from(line).unwrap_or(u32::MAX),
            column: u32::try_from(column).unwrap_or(u32::MAX),
        }
    }

    pub fn is_known(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, " at line {}, column {}", self.line, self.column)
        } else {
            Ok(())
        }
    }
}

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable code used by log events and by callers that
/// need to branch on the failure class without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // Deserialization
    UnrecognizedAttribute,
    UnrecognizedElement,
    DuplicateProperty,
    RequiredPropertyMissing,
    InvalidPropertyValue,
    TypeMismatch,
    XmlSyntax,

    // Collections
    DuplicateKey,
    InvalidInsertPosition,
    ReadOnlyCollection,
    ElementNotRemovable,
    IndexOutOfRange,

    // Mutation
    ReadOnlyElement,
    LockViolation,
    UnknownProperty,

    // Schema
    SchemaError,

    // Output
    Serialization,
}

impl ErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::UnrecognizedAttribute => "ERR_UNRECOGNIZED_ATTRIBUTE",
            ErrorKind::UnrecognizedElement => "ERR_UNRECOGNIZED_ELEMENT",
            ErrorKind::DuplicateProperty => "ERR_DUPLICATE_PROPERTY",
            ErrorKind::RequiredPropertyMissing => "ERR_REQUIRED_PROPERTY_MISSING",
            ErrorKind::InvalidPropertyValue => "ERR_INVALID_PROPERTY_VALUE",
            ErrorKind::TypeMismatch => "ERR_TYPE_MISMATCH",
            ErrorKind::XmlSyntax => "ERR_XML_SYNTAX",
            ErrorKind::DuplicateKey => "ERR_DUPLICATE_KEY",
            ErrorKind::InvalidInsertPosition => "ERR_INVALID_INSERT_POSITION",
            ErrorKind::ReadOnlyCollection => "ERR_READ_ONLY_COLLECTION",
            ErrorKind::ElementNotRemovable => "ERR_ELEMENT_NOT_REMOVABLE",
            ErrorKind::IndexOutOfRange => "ERR_INDEX_OUT_OF_RANGE",
            ErrorKind::ReadOnlyElement => "ERR_READ_ONLY_ELEMENT",
            ErrorKind::LockViolation => "ERR_LOCK_VIOLATION",
            ErrorKind::UnknownProperty => "ERR_UNKNOWN_PROPERTY",
            ErrorKind::SchemaError => "ERR_SCHEMA",
            ErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for configuration element operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    // ===== Deserialization Errors =====
    /// Attribute name unknown to the schema and not claimed by a hook
    #[error("Unrecognized attribute '{name}'{location}")]
    UnrecognizedAttribute { name: String, location: Location },

    /// Child element name unknown to the schema and not claimed by a hook
    #[error("Unrecognized element '{name}'{location}")]
    UnrecognizedElement { name: String, location: Location },

    /// Same attribute or child element supplied twice in one element
    #[error("The property '{name}' may only appear once in this element{location}")]
    DuplicateProperty { name: String, location: Location },

    /// Required property absent after the full element scan
    #[error("Required attribute '{name}' not found{location}")]
    RequiredPropertyMissing { name: String, location: Location },

    /// Converter or validator rejected a value
    #[error("The value for the property '{property}' is not valid{location}. The error is: {cause}")]
    InvalidPropertyValue {
        property: String,
        cause: String,
        location: Location,
    },

    /// Scalar supplied where an element is expected, or the reverse
    #[error("Type mismatch for '{name}': {reason}{location}")]
    TypeMismatch {
        name: String,
        reason: String,
        location: Location,
    },

    /// Malformed XML input
    #[error("XML syntax error{location}: {message}")]
    XmlSyntax { message: String, location: Location },

    /// Attribute, element or item locked by a parent layer
    #[error("'{name}' is locked by a parent configuration layer{location}")]
    LockViolation { name: String, location: Location },

    // ===== Collection Errors =====
    /// Add violates key uniqueness under the throw-on-duplicate policy
    #[error("Duplicate element in collection: key '{key}'{location}")]
    DuplicateKey { key: String, location: Location },

    /// Positional insert violates the inherited/local ordering
    #[error("Can't insert at index {index}: {reason}")]
    InvalidInsertPosition { index: usize, reason: String },

    /// Mutation of a frozen collection
    #[error("Collection '{collection}' is read only")]
    ReadOnlyCollection { collection: String },

    /// Removal of a protected or inherited item
    #[error("Element '{key}' can't be removed from the collection: {reason}")]
    ElementNotRemovable { key: String, reason: String },

    /// Index past the end of a collection
    #[error("Index {index} is out of range (collection has {len} items)")]
    IndexOutOfRange { index: usize, len: usize },

    // ===== Mutation Errors =====
    /// Assignment to a frozen element
    #[error("Element '{element}' is read only")]
    ReadOnlyElement { element: String },

    /// Property name unknown to the element's schema
    #[error("Property '{name}' not found in configuration element '{element}'")]
    UnknownProperty { name: String, element: String },

    // ===== Schema Errors =====
    /// Malformed property schema
    #[error("Schema error in '{type_name}': {reason}")]
    SchemaError { type_name: String, reason: String },

    // ===== Output Errors =====
    /// Failure while producing XML output
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl ConfigError {
    /// Canonical kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::UnrecognizedAttribute { .. } => ErrorKind::UnrecognizedAttribute,
            ConfigError::UnrecognizedElement { .. } => ErrorKind::UnrecognizedElement,
            ConfigError::DuplicateProperty { .. } => ErrorKind::DuplicateProperty,
            ConfigError::RequiredPropertyMissing { .. } => ErrorKind::RequiredPropertyMissing,
            ConfigError::InvalidPropertyValue { .. } => ErrorKind::InvalidPropertyValue,
            ConfigError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            ConfigError::XmlSyntax { .. } => ErrorKind::XmlSyntax,
            ConfigError::LockViolation { .. } => ErrorKind::LockViolation,
            ConfigError::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            ConfigError::InvalidInsertPosition { .. } => ErrorKind::InvalidInsertPosition,
            ConfigError::ReadOnlyCollection { .. } => ErrorKind::ReadOnlyCollection,
            ConfigError::ElementNotRemovable { .. } => ErrorKind::ElementNotRemovable,
            ConfigError::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            ConfigError::ReadOnlyElement { .. } => ErrorKind::ReadOnlyElement,
            ConfigError::UnknownProperty { .. } => ErrorKind::UnknownProperty,
            ConfigError::SchemaError { .. } => ErrorKind::SchemaError,
            ConfigError::Serialization { .. } => ErrorKind::Serialization,
        }
    }

    /// Stable error code of this error's kind
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// Source location, when the error was raised while reading XML
    pub fn location(&self) -> Option<Location> {
        let location = match self {
            ConfigError::UnrecognizedAttribute { location, .. }
            | ConfigError::UnrecognizedElement { location, .. }
            | ConfigError::DuplicateProperty { location, .. }
            | ConfigError::RequiredPropertyMissing { location, .. }
            | ConfigError::InvalidPropertyValue { location, .. }
            | ConfigError::TypeMismatch { location, .. }
            | ConfigError::XmlSyntax { location, .. }
            | ConfigError::LockViolation { location, .. }
            | ConfigError::DuplicateKey { location, .. } => *location,
            _ => return None,
        };
        location.is_known().then_some(location)
    }

    /// Attach a location to a location-carrying error that has none yet.
    pub(crate) fn at(mut self, at: Location) -> Self {
        match &mut self {
            ConfigError::UnrecognizedAttribute { location, .. }
            | ConfigError::UnrecognizedElement { location, .. }
            | ConfigError::DuplicateProperty { location, .. }
            | ConfigError::RequiredPropertyMissing { location, .. }
            | ConfigError::InvalidPropertyValue { location, .. }
            | ConfigError::TypeMismatch { location, .. }
            | ConfigError::XmlSyntax { location, .. }
            | ConfigError::LockViolation { location, .. }
            | ConfigError::DuplicateKey { location, .. } => {
                if !location.is_known() {
                    *location = at;
                }
            }
            _ => {}
        }
        self
    }

    pub(crate) fn schema(type_name: &str, reason: impl Into<String>) -> Self {
        ConfigError::SchemaError {
            type_name: type_name.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_offset() {
        let src = "<a>\n  <b/>\n</a>";
        let offset = src.find("<b").unwrap();
        assert_eq!(Location::from_offset(src, offset), Location::new(2, 3));
        assert_eq!(Location::from_offset(src, 0), Location::new(1, 1));
    }

    #[test]
    fn test_unknown_location_not_displayed() {
        let err = ConfigError::UnrecognizedAttribute {
            name: "colour".to_string(),
            location: Location::UNKNOWN,
        };
        assert_eq!(err.to_string(), "Unrecognized attribute 'colour'");
        assert_eq!(err.location(), None);
    }

    #[test]
    fn test_at_fills_only_missing_location() {
        let err = ConfigError::UnrecognizedElement {
            name: "x".to_string(),
            location: Location::UNKNOWN,
        }
        .at(Location::new(3, 4));
        assert_eq!(err.location(), Some(Location::new(3, 4)));

        let err = err.at(Location::new(9, 9));
        assert_eq!(err.location(), Some(Location::new(3, 4)));
        assert!(err.to_string().ends_with("at line 3, column 4"));
    }

    #[test]
    fn test_kind_and_code() {
        let err = ConfigError::DuplicateKey {
            key: "1".to_string(),
            location: Location::UNKNOWN,
        };
        assert_eq!(err.kind(), ErrorKind::DuplicateKey);
        assert_eq!(err.code(), "ERR_DUPLICATE_KEY");
    }
}
