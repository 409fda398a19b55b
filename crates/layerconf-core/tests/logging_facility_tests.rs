#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::PageAppearance;
use layerconf_core::errors::ConfigError;
use layerconf_core::logging_facility::test_capture::{init_test_capture, CapturedEvent};
use layerconf_core::{log_op_end, log_op_error, log_op_start, LayeredSection, SaveMode};
use layerconf_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_ERR_CODE};

fn of_kind<'a>(events: &'a [CapturedEvent], event: &str) -> Vec<&'a CapturedEvent> {
    events
        .iter()
        .filter(|e| e.event.as_deref() == Some(event))
        .collect()
}

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    capture.assert_event_exists(op_name, EVENT_START);
}

#[test]
fn test_log_op_end_records_duration() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let events = capture.events();
    let end_event = events
        .iter()
        .find(|e| e.is(op_name, EVENT_END))
        .expect("Should have end event");
    assert_eq!(end_event.field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = ConfigError::ReadOnlyElement {
        element: "font".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let events = capture.events();
    let error_event = events
        .iter()
        .find(|e| e.is(op_name, EVENT_END_ERROR))
        .expect("Should have error event");
    assert_eq!(error_event.field(FIELD_ERR_CODE), Some("ERR_READ_ONLY_ELEMENT"));
    assert_eq!(error_event.level, tracing::Level::ERROR);
}

#[test]
fn test_push_layer_logs_single_start_end() {
    let capture = init_test_capture();
    let section_name = "pageAppearanceLogPush";

    let mut section = LayeredSection::of::<PageAppearance>(section_name).unwrap();
    section
        .push_layer("machine", Some("<pageAppearanceLogPush title=\"Home\"/>"))
        .unwrap();

    let events = capture.section_events("push_layer", section_name);
    let starts = of_kind(&events, EVENT_START);
    let ends = of_kind(&events, EVENT_END);

    assert_eq!(starts.len(), 1, "Should have exactly one start event");
    assert_eq!(ends.len(), 1, "Should have exactly one end event");
    assert_eq!(starts[0].field("layer"), Some("machine"));
    assert!(ends[0].fields.contains_key("duration_ms"));
}

#[test]
fn test_push_layer_failure_logs_error_code() {
    let capture = init_test_capture();
    let section_name = "pageAppearanceLogFail";

    let mut section = LayeredSection::of::<PageAppearance>(section_name).unwrap();
    let err = section.push_layer("machine", Some("<elsewhere/>")).unwrap_err();
    assert!(matches!(err, ConfigError::UnrecognizedElement { .. }));

    let events = capture.section_events("push_layer", section_name);
    let errors = of_kind(&events, EVENT_END_ERROR);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field(FIELD_ERR_CODE), Some("ERR_UNRECOGNIZED_ELEMENT"));
    assert!(of_kind(&events, EVENT_END).is_empty());
}

#[test]
fn test_prepare_save_logged() {
    let capture = init_test_capture();
    let section_name = "pageAppearanceLogSave";

    let mut section = LayeredSection::of::<PageAppearance>(section_name).unwrap();
    section.push_layer("machine", None).unwrap();
    section.prepare_save(0, SaveMode::Minimal).unwrap();
    assert!(section.prepare_save(5, SaveMode::Minimal).is_err());

    let events = capture.section_events("prepare_save", section_name);
    let ends = of_kind(&events, EVENT_END);
    assert_eq!(ends.len(), 1);
    assert_eq!(ends[0].field("has_values"), Some("false"));

    let errors = of_kind(&events, EVENT_END_ERROR);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field(FIELD_ERR_CODE), Some("ERR_INDEX_OUT_OF_RANGE"));
}

#[test]
fn test_sensitive_value_redacted_in_logs() {
    let capture = init_test_capture();

    let mut connection = layerconf_core::Element::of::<common::Connection>().unwrap();
    connection.set("password", "hunter2-unique-logging").unwrap();

    let leaked = capture
        .events()
        .iter()
        .any(|e| e.fields.values().any(|v| v.contains("hunter2-unique-logging")));
    assert!(!leaked, "sensitive value must not reach the log");
}
