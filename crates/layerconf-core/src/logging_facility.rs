//! Structured logging facility for layerconf
//!
//! - One initialization point via `init(profile)`
//! - Operation macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! Only boundary operations (loading a layer, preparing a save) emit
//! start/end events. The element engine below them logs at `debug`/`trace`.
//!
//! # Usage
//!
//! ```rust
//! use layerconf_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
