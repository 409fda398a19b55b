#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;
use std::thread;

use common::{Employees, Entries, Font, PageAppearance};
use layerconf_core::{
    schema_of, CollectionDescriptor, CollectionShape, ConfigError, Element, ElementType,
    PropertyDescriptor, PropertySchema, Result, ValueType,
};

struct TwoDefaults;

impl ElementType for TwoDefaults {
    fn declare() -> Result<PropertySchema> {
        PropertySchema::builder("twoDefaults")
            .property(PropertyDescriptor::element::<Employees>("").default_collection())
            .property(PropertyDescriptor::element::<Entries>("entries").default_collection())
            .build()
    }
}

struct KeyedChild;

impl ElementType for KeyedChild {
    fn declare() -> Result<PropertySchema> {
        PropertySchema::builder("keyedChild")
            .property(PropertyDescriptor::element::<Font>("font").key())
            .build()
    }
}

struct Note;

impl ElementType for Note {
    fn declare() -> Result<PropertySchema> {
        PropertySchema::builder("note")
            .property(PropertyDescriptor::new("text", ValueType::String))
            .build()
    }
}

struct Notes;

impl ElementType for Notes {
    fn declare() -> Result<PropertySchema> {
        PropertySchema::builder("notes")
            .collection(CollectionDescriptor::of::<Note>(CollectionShape::AddRemoveClearMap))
            .build()
    }
}

/// Same type name and shape as `Font`, declared independently
struct FontTwin;

impl ElementType for FontTwin {
    fn declare() -> Result<PropertySchema> {
        PropertySchema::builder("font")
            .property(PropertyDescriptor::new("name", ValueType::String).required().key())
            .property(PropertyDescriptor::new("size", ValueType::Int).default_value(12))
            .build()
    }
}

/// Same type name as `Font` with a different property list
struct FontImpostor;

impl ElementType for FontImpostor {
    fn declare() -> Result<PropertySchema> {
        PropertySchema::builder("font")
            .property(PropertyDescriptor::new("family", ValueType::String))
            .build()
    }
}

// ===== REGISTRY =====

#[test]
fn test_concurrent_lookups_share_one_schema() {
    let handles: Vec<_> = (0..8)
        .map(|_| thread::spawn(|| schema_of::<PageAppearance>().unwrap()))
        .collect();
    let schemas: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for schema in &schemas[1..] {
        assert!(Arc::ptr_eq(&schemas[0], schema));
    }
    assert_eq!(schemas[0].type_name(), "pageAppearance");
    assert_eq!(schemas[0].properties().len(), 4);
}

#[test]
fn test_elements_share_registry_schema() {
    let a = Element::of::<Font>().unwrap();
    let b = Element::of::<Font>().unwrap();
    assert!(Arc::ptr_eq(a.schema(), b.schema()));
}

// ===== DECLARATION ERRORS =====

#[test]
fn test_two_default_collections_rejected() {
    assert!(matches!(
        schema_of::<TwoDefaults>(),
        Err(ConfigError::SchemaError { type_name, .. }) if type_name == "twoDefaults"
    ));
}

#[test]
fn test_key_on_element_property_rejected() {
    assert!(matches!(
        schema_of::<KeyedChild>(),
        Err(ConfigError::SchemaError { .. })
    ));
}

#[test]
fn test_collection_of_unkeyed_items_rejected() {
    let err = Element::of::<Notes>().unwrap_err();
    assert!(matches!(&err, ConfigError::SchemaError { reason, .. } if reason.contains("note")));
    assert_eq!(err.code(), "ERR_SCHEMA");
}

// ===== TYPE IDENTITY =====

#[test]
fn test_structurally_equal_schemas_are_same_type() {
    let font = load_font();
    let mut twin = Element::of::<FontTwin>().unwrap();
    twin.reset(Some(&font)).unwrap();
    assert_eq!(twin.get("name").unwrap(), font.get("name").unwrap());
}

#[test]
fn test_same_name_different_shape_is_type_mismatch() {
    let font = load_font();
    let mut impostor = Element::of::<FontImpostor>().unwrap();
    assert!(matches!(
        impostor.reset(Some(&font)),
        Err(ConfigError::TypeMismatch { .. })
    ));
}

fn load_font() -> Element {
    common::load::<Font>("<font name=\"Arial\"/>").unwrap()
}
