#![allow(dead_code)]

use layerconf_core::{
    CollectionDescriptor, CollectionShape, ConfigError, Element, ElementHooks, ElementType,
    IntegerValidator, PropertyDescriptor, PropertySchema, Result, Value, ValueType, XmlNode,
};

/// `<font name=".." size=".."/>`: required key plus a ranged integer
pub struct Font;

impl ElementType for Font {
    fn declare() -> Result<PropertySchema> {
        PropertySchema::builder("font")
            .property(PropertyDescriptor::new("name", ValueType::String).required().key())
            .property(
                PropertyDescriptor::new("size", ValueType::Int)
                    .default_value(12)
                    .validator(IntegerValidator::new(6, 24)),
            )
            .build()
    }
}

pub struct Color;

impl ElementType for Color {
    fn declare() -> Result<PropertySchema> {
        PropertySchema::builder("color")
            .property(PropertyDescriptor::new("background", ValueType::String).default_value("FFFFFF"))
            .property(PropertyDescriptor::new("foreground", ValueType::String).default_value("000000"))
            .build()
    }
}

/// Section with scalar and nested element properties
pub struct PageAppearance;

impl ElementType for PageAppearance {
    fn declare() -> Result<PropertySchema> {
        PropertySchema::builder("pageAppearance")
            .property(PropertyDescriptor::new("remoteOnly", ValueType::Bool).default_value(false))
            .property(PropertyDescriptor::new("title", ValueType::String))
            .property(PropertyDescriptor::element::<Font>("font"))
            .property(PropertyDescriptor::element::<Color>("color"))
            .build()
    }
}

pub struct Employee;

impl ElementType for Employee {
    fn declare() -> Result<PropertySchema> {
        PropertySchema::builder("employee")
            .property(PropertyDescriptor::new("id", ValueType::Int).required().key())
            .property(PropertyDescriptor::new("name", ValueType::String))
            .property(PropertyDescriptor::new("title", ValueType::String))
            .build()
    }
}

/// Basic collection: each `<employee>` child is an item
pub struct Employees;

impl ElementType for Employees {
    fn declare() -> Result<PropertySchema> {
        PropertySchema::builder("employees")
            .collection(
                CollectionDescriptor::of::<Employee>(CollectionShape::BasicMap)
                    .element_name("employee")
                    .element_name_filter(|name| name == "contractor"),
            )
            .build()
    }
}

pub struct EmployeesAlternate;

impl ElementType for EmployeesAlternate {
    fn declare() -> Result<PropertySchema> {
        PropertySchema::builder("employeesAlternate")
            .collection(
                CollectionDescriptor::of::<Employee>(CollectionShape::BasicMapAlternate)
                    .element_name("employee"),
            )
            .build()
    }
}

/// Section whose unnamed default collection receives `<employee>` children
pub struct Staff;

impl ElementType for Staff {
    fn declare() -> Result<PropertySchema> {
        PropertySchema::builder("staff")
            .property(PropertyDescriptor::new("department", ValueType::String))
            .property(PropertyDescriptor::element::<Employees>("").default_collection())
            .build()
    }
}

pub struct Entry;

impl ElementType for Entry {
    fn declare() -> Result<PropertySchema> {
        PropertySchema::builder("entry")
            .property(PropertyDescriptor::new("id", ValueType::String).required().key())
            .property(PropertyDescriptor::new("value", ValueType::String))
            .build()
    }
}

/// `<add>`/`<remove>`/`<clear>` collection of entries
pub struct Entries;

impl ElementType for Entries {
    fn declare() -> Result<PropertySchema> {
        PropertySchema::builder("entries")
            .collection(CollectionDescriptor::of::<Entry>(CollectionShape::AddRemoveClearMap))
            .build()
    }
}

pub struct EntriesAlternate;

impl ElementType for EntriesAlternate {
    fn declare() -> Result<PropertySchema> {
        PropertySchema::builder("entriesAlternate")
            .collection(CollectionDescriptor::of::<Entry>(
                CollectionShape::AddRemoveClearMapAlternate,
            ))
            .build()
    }
}

/// Map collection that refuses to remove the `system` entry and tolerates
/// duplicate keys
pub struct GuardedEntries;

impl ElementType for GuardedEntries {
    fn declare() -> Result<PropertySchema> {
        PropertySchema::builder("guardedEntries")
            .collection(
                CollectionDescriptor::of::<Entry>(CollectionShape::AddRemoveClearMap)
                    .removable(|item| item.get("id").ok() != Some(&Value::from("system")))
                    .throw_on_duplicate(false),
            )
            .build()
    }
}

/// Element with a secret that must never be logged or exported in clear
pub struct Connection;

impl ElementType for Connection {
    fn declare() -> Result<PropertySchema> {
        PropertySchema::builder("connection")
            .property(PropertyDescriptor::new("host", ValueType::String).default_value("localhost"))
            .property(PropertyDescriptor::new("password", ValueType::String).sensitive())
            .build()
    }
}

pub struct LegacyHooks;

impl ElementHooks for LegacyHooks {
    fn on_unrecognized_attribute(&self, element: &mut Element, name: &str, value: &str) -> Result<bool> {
        if name == "legacyMode" {
            element.set("mode", value)?;
            return Ok(true);
        }
        Ok(false)
    }

    fn on_unrecognized_element(&self, _element: &mut Element, node: &XmlNode) -> Result<bool> {
        Ok(node.name == "extension")
    }

    fn on_required_property_missing(&self, _element: &Element, name: &str) -> Result<Value> {
        if name == "owner" {
            return Ok(Value::from("admin"));
        }
        Err(ConfigError::RequiredPropertyMissing {
            name: name.to_string(),
            location: layerconf_core::Location::UNKNOWN,
        })
    }

    fn initialize_default(&self, element: &mut Element) -> Result<()> {
        element.set("level", 3)
    }
}

/// Element with every hook overridden
pub struct Legacy;

impl ElementType for Legacy {
    fn declare() -> Result<PropertySchema> {
        PropertySchema::builder("legacy")
            .property(PropertyDescriptor::new("mode", ValueType::String))
            .property(PropertyDescriptor::new("owner", ValueType::String).required())
            .property(PropertyDescriptor::new("level", ValueType::Int).default_value(0))
            .hooks(LegacyHooks)
            .build()
    }
}

/// Parse `xml` into a fresh element of type `T`
pub fn load<T: ElementType>(xml: &str) -> Result<Element> {
    let mut element = Element::of::<T>()?;
    element.reset(None)?;
    element.deserialize(&XmlNode::parse(xml)?, false)?;
    Ok(element)
}

/// Reset a fresh element of type `T` from `parent`, then overlay `xml`
pub fn load_over<T: ElementType>(parent: &Element, xml: &str) -> Result<Element> {
    let mut element = Element::of::<T>()?;
    element.reset(Some(parent))?;
    element.deserialize(&XmlNode::parse(xml)?, false)?;
    Ok(element)
}
