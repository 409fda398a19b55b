//! Canonical logging macros
//!
//! Every boundary event carries `component`, `op` and `event`; extra
//! `key = value` fields follow the usual `tracing` field syntax.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use layerconf_core::log_op_start;
/// log_op_start!("push_layer");
/// log_op_start!("push_layer", section = "pageAppearance", layer = "machine");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)+)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = layerconf_core_types::schema::EVENT_START
            $(, $($field)+)?
        )
    };
}

/// Log the successful end of an operation, with its duration
///
/// # Example
///
/// ```
/// # use layerconf_core::log_op_end;
/// log_op_end!("prepare_save", duration_ms = 3);
/// log_op_end!("prepare_save", duration_ms = 3, has_values = true);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = layerconf_core_types::schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)+)?
        )
    };
}

/// Log an operation failure with its error kind and stable code
///
/// `$err` is borrowed, so the caller can still return it.
///
/// # Example
///
/// ```
/// # use layerconf_core::{log_op_error, errors::ConfigError};
/// let err = ConfigError::ReadOnlyElement { element: "font".to_string() };
/// log_op_error!("push_layer", err, duration_ms = 1);
/// log_op_error!("push_layer", err, duration_ms = 1, layer = "machine");
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {{
        let err: &$crate::errors::ConfigError = &$err;
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = layerconf_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?err.kind(),
            err_code = err.code(),
            error = %err
            $(, $($field)+)?
        )
    }};
}
