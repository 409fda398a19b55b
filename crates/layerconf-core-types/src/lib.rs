//! Core types shared across layerconf facilities
//!
//! This crate provides foundational types used by both error reporting
//! and the logging facility:
//!
//! - **Schema constants**: Canonical field keys and event names
//! - **Sensitive data**: Sensitive<T> marker for configuration secrets

pub mod schema;
pub mod sensitive;

pub use sensitive::{Sensitive, REDACTED};
