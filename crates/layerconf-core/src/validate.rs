//! Property value validators

use std::fmt;

use crate::value::{Value, ValueType};

/// Checks a converted value before it is stored
///
/// `Null` values are never passed to a validator.
pub trait Validator: Send + Sync {
    /// Whether this validator understands properties of `value_type`.
    fn can_validate(&self, value_type: &ValueType) -> bool;

    fn validate(&self, value: &Value) -> Result<(), String>;
}

/// Integer range check with optional step
///
/// With `exclusive` the value must fall outside `[min, max]` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerValidator {
    pub min: i64,
    pub max: i64,
    pub exclusive: bool,
    pub resolution: i64,
}

impl IntegerValidator {
    pub fn new(min: i64, max: i64) -> Self {
        Self {
            min,
            max,
            exclusive: false,
            resolution: 0,
        }
    }

    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    pub fn resolution(mut self, resolution: i64) -> Self {
        self.resolution = resolution;
        self
    }
}

impl Validator for IntegerValidator {
    fn can_validate(&self, value_type: &ValueType) -> bool {
        matches!(value_type, ValueType::Int)
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        let Some(v) = value.as_int() else {
            return Err(format!("expected an integer, got '{}'", value));
        };

        let in_range = v >= self.min && v <= self.max;
        if self.exclusive && in_range {
            return Err(format!(
                "The value must not be in the range {} - {}",
                self.min, self.max
            ));
        }
        if !self.exclusive && !in_range {
            return Err(format!(
                "The value must be in the range {} - {}",
                self.min, self.max
            ));
        }
        if self.resolution > 0 && v % self.resolution != 0 {
            return Err(format!(
                "The value must have a resolution of {}",
                self.resolution
            ));
        }
        Ok(())
    }
}

/// String length and character check
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringValidator {
    pub min_length: usize,
    pub max_length: Option<usize>,
    pub invalid_characters: String,
}

impl StringValidator {
    pub fn new(min_length: usize) -> Self {
        Self {
            min_length,
            ..Self::default()
        }
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn invalid_characters(mut self, chars: &str) -> Self {
        self.invalid_characters = chars.to_string();
        self
    }
}

impl Validator for StringValidator {
    fn can_validate(&self, value_type: &ValueType) -> bool {
        matches!(value_type, ValueType::String)
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        let Some(s) = value.as_str() else {
            return Err(format!("expected a string, got '{}'", value));
        };

        let len = s.chars().count();
        if len < self.min_length {
            return Err(format!(
                "The string must be at least {} characters long",
                self.min_length
            ));
        }
        if let Some(max) = self.max_length {
            if len > max {
                return Err(format!("The string must be no more than {} characters long", max));
            }
        }
        if let Some(c) = s.chars().find(|c| self.invalid_characters.contains(*c)) {
            return Err(format!("The string contains the invalid character '{}'", c));
        }
        Ok(())
    }
}

/// Delegates validation to a function
#[derive(Clone, Copy)]
pub struct CallbackValidator {
    value_type: ValueType,
    callback: fn(&Value) -> Result<(), String>,
}

impl CallbackValidator {
    pub fn new(value_type: ValueType, callback: fn(&Value) -> Result<(), String>) -> Self {
        Self {
            value_type,
            callback,
        }
    }
}

impl Validator for CallbackValidator {
    fn can_validate(&self, value_type: &ValueType) -> bool {
        std::mem::discriminant(&self.value_type) == std::mem::discriminant(value_type)
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        (self.callback)(value)
    }
}

impl fmt::Debug for CallbackValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackValidator")
            .field("value_type", &self.value_type)
            .finish_non_exhaustive()
    }
}
