//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names identical between the logging macros,
//! the test capture layer and downstream log consumers.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Configuration identifiers
pub const FIELD_SECTION: &str = "section";
pub const FIELD_LAYER: &str = "layer";
pub const FIELD_ELEMENT_TYPE: &str = "element_type";
pub const FIELD_PROPERTY: &str = "property";
pub const FIELD_SAVE_MODE: &str = "save_mode";

// Collection sizes
pub const FIELD_LAYER_COUNT: &str = "layer_count";
pub const FIELD_ITEM_COUNT: &str = "item_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
