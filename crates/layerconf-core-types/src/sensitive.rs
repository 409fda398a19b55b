//! Sensitive configuration values
//!
//! Connection strings, passwords and API keys routinely live in
//! configuration layers. Properties declared sensitive are wrapped in
//! [`Sensitive`] before they reach a log line or a diagnostic dump.

use std::fmt;

/// Placeholder written in place of a sensitive value.
pub const REDACTED: &str = "[REDACTED]";

/// Wrapper that renders as [`REDACTED`] in Debug and Display
///
/// # Example
///
/// ```
/// use layerconf_core_types::{Sensitive, REDACTED};
///
/// let conn = Sensitive::new("Server=db;Password=hunter2");
/// assert_eq!(format!("{}", conn), REDACTED);
/// assert_eq!(format!("{:?}", conn), REDACTED);
/// assert_eq!(*conn.expose(), "Server=db;Password=hunter2");
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the wrapped value
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Unwrap the value
    pub fn into_inner(self) -> T {
        self.0
    }

    /// Wrap `value` only when `sensitive` is set, otherwise render it as is.
    pub fn when(sensitive: bool, value: T) -> MaybeSensitive<T> {
        MaybeSensitive { value, sensitive }
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

/// A value that is redacted only if its property is flagged sensitive.
pub struct MaybeSensitive<T> {
    value: T,
    sensitive: bool,
}

impl<T: fmt::Debug> fmt::Debug for MaybeSensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sensitive {
            f.write_str(REDACTED)
        } else {
            self.value.fmt(f)
        }
    }
}

impl<T: fmt::Display> fmt::Display for MaybeSensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sensitive {
            f.write_str(REDACTED)
        } else {
            self.value.fmt(f)
        }
    }
}
