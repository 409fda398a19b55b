//! Per-type property schemas
//!
//! A [`PropertySchema`] is the static description of one element type: its
//! named properties in declaration order, the optional collection behavior
//! and the optional deserialization hooks. Schemas are immutable once built
//! and shared through `Arc` by every element of the type.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::collection::ElementKey;
use crate::convert::{Converter, ScalarConverter};
use crate::element::Element;
use crate::errors::{ConfigError, Location, Result};
use crate::registry::{schema_of, ElementType};
use crate::validate::Validator;
use crate::value::{SchemaSource, Value, ValueType};
use crate::xml::XmlNode;

// ========== Property descriptors ==========

/// Static description of one named property
#[derive(Clone)]
pub struct PropertyDescriptor {
    name: String,
    value_type: ValueType,
    default_value: Value,
    required: bool,
    key: bool,
    default_collection: bool,
    sensitive: bool,
    converter: Option<Arc<dyn Converter>>,
    validator: Option<Arc<dyn Validator>>,
}

impl PropertyDescriptor {
    /// Scalar or element property with a `Null` default
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            default_value: Value::Null,
            required: false,
            key: false,
            default_collection: false,
            sensitive: false,
            converter: None,
            validator: None,
        }
    }

    /// Property holding a nested element of type `T`
    pub fn element<T: ElementType>(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Element(schema_of::<T>))
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = value.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Part of the composite key used for collection membership
    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }

    /// Receives child elements no other property claims
    pub fn default_collection(mut self) -> Self {
        self.default_collection = true;
        self
    }

    /// Redact the value in diagnostic output
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn converter(mut self, converter: impl Converter + 'static) -> Self {
        self.converter = Some(Arc::new(converter));
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    pub fn default(&self) -> &Value {
        &self.default_value
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_key(&self) -> bool {
        self.key
    }

    pub fn is_default_collection(&self) -> bool {
        self.default_collection
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    pub fn is_element(&self) -> bool {
        self.value_type.is_element()
    }

    pub fn converter_ref(&self) -> &dyn Converter {
        match &self.converter {
            Some(c) => c.as_ref(),
            None => ScalarConverter::for_type(&self.value_type),
        }
    }

    pub fn validator_ref(&self) -> Option<&dyn Validator> {
        self.validator.as_deref()
    }

    /// Convert and validate attribute text.
    pub(crate) fn parse(&self, raw: &str) -> Result<Value> {
        let value = self
            .converter_ref()
            .parse(raw)
            .map_err(|cause| self.invalid(cause))?;
        self.check(&value)?;
        Ok(value)
    }

    /// Type and validator check for a value about to be stored.
    pub(crate) fn check(&self, value: &Value) -> Result<()> {
        if !self.value_type.accepts(value) {
            return Err(ConfigError::TypeMismatch {
                name: self.name.clone(),
                reason: format!(
                    "a {} property can't hold the value '{}'",
                    self.value_type.name(),
                    value
                ),
                location: Location::UNKNOWN,
            });
        }
        if value.is_null() {
            return Ok(());
        }
        match &self.validator {
            Some(v) => v.validate(value).map_err(|cause| self.invalid(cause)),
            None => Ok(()),
        }
    }

    pub(crate) fn render(&self, value: &Value) -> String {
        self.converter_ref().render(value)
    }

    fn invalid(&self, cause: String) -> ConfigError {
        ConfigError::InvalidPropertyValue {
            property: self.name.clone(),
            cause,
            location: Location::UNKNOWN,
        }
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("default_value", &self.default_value)
            .field("required", &self.required)
            .field("key", &self.key)
            .field("default_collection", &self.default_collection)
            .field("sensitive", &self.sensitive)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

// ========== Collections ==========

/// How items of a collection appear in XML and where local items go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionShape {
    /// `<add>`/`<remove>`/`<clear>` directives; local items after inherited
    AddRemoveClearMap,
    /// Directives; local items before inherited
    AddRemoveClearMapAlternate,
    /// Each child element is an item; local items after inherited
    BasicMap,
    /// Each child element is an item; local items before inherited
    BasicMapAlternate,
}

impl CollectionShape {
    pub fn is_basic(&self) -> bool {
        matches!(self, CollectionShape::BasicMap | CollectionShape::BasicMapAlternate)
    }

    pub fn is_alternate(&self) -> bool {
        matches!(
            self,
            CollectionShape::AddRemoveClearMapAlternate | CollectionShape::BasicMapAlternate
        )
    }
}

/// Collection behavior of an element type
#[derive(Clone)]
pub struct CollectionDescriptor {
    shape: CollectionShape,
    item: SchemaSource,
    add_name: String,
    remove_name: String,
    clear_name: String,
    element_name: String,
    element_name_filter: Option<fn(&str) -> bool>,
    key_comparer: Option<fn(&ElementKey, &ElementKey) -> bool>,
    removable: Option<fn(&Element) -> bool>,
    throw_on_duplicate: Option<bool>,
}

impl CollectionDescriptor {
    pub fn new(shape: CollectionShape, item: SchemaSource) -> Self {
        Self {
            shape,
            item,
            add_name: "add".to_string(),
            remove_name: "remove".to_string(),
            clear_name: "clear".to_string(),
            element_name: String::new(),
            element_name_filter: None,
            key_comparer: None,
            removable: None,
            throw_on_duplicate: None,
        }
    }

    /// Collection of items of type `T`
    pub fn of<T: ElementType>(shape: CollectionShape) -> Self {
        Self::new(shape, schema_of::<T>)
    }

    pub fn add_name(mut self, name: impl Into<String>) -> Self {
        self.add_name = name.into();
        self
    }

    pub fn remove_name(mut self, name: impl Into<String>) -> Self {
        self.remove_name = name.into();
        self
    }

    pub fn clear_name(mut self, name: impl Into<String>) -> Self {
        self.clear_name = name.into();
        self
    }

    /// Tag of each item in a basic collection
    pub fn element_name(mut self, name: impl Into<String>) -> Self {
        self.element_name = name.into();
        self
    }

    /// Additional item tags accepted by a basic collection
    pub fn element_name_filter(mut self, filter: fn(&str) -> bool) -> Self {
        self.element_name_filter = Some(filter);
        self
    }

    pub fn key_comparer(mut self, comparer: fn(&ElementKey, &ElementKey) -> bool) -> Self {
        self.key_comparer = Some(comparer);
        self
    }

    pub fn removable(mut self, predicate: fn(&Element) -> bool) -> Self {
        self.removable = Some(predicate);
        self
    }

    pub fn throw_on_duplicate(mut self, throw: bool) -> Self {
        self.throw_on_duplicate = Some(throw);
        self
    }

    pub fn shape(&self) -> CollectionShape {
        self.shape
    }

    pub fn item_schema(&self) -> Result<Arc<PropertySchema>> {
        (self.item)()
    }

    pub fn add_tag(&self) -> &str {
        &self.add_name
    }

    pub fn remove_tag(&self) -> &str {
        &self.remove_name
    }

    pub fn clear_tag(&self) -> &str {
        &self.clear_name
    }

    pub fn item_tag(&self) -> &str {
        &self.element_name
    }

    /// Map shapes reject duplicate keys unless overridden.
    pub fn throws_on_duplicate(&self) -> bool {
        self.throw_on_duplicate.unwrap_or(!self.shape.is_basic())
    }

    pub fn is_item_name(&self, name: &str) -> bool {
        (!self.element_name.is_empty() && name == self.element_name)
            || self.element_name_filter.is_some_and(|f| f(name))
    }

    pub fn keys_match(&self, a: &ElementKey, b: &ElementKey) -> bool {
        match self.key_comparer {
            Some(cmp) => cmp(a, b),
            None => a == b,
        }
    }

    pub fn is_removable(&self, item: &Element) -> bool {
        self.removable.map_or(true, |f| f(item))
    }
}

impl fmt::Debug for CollectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionDescriptor")
            .field("shape", &self.shape)
            .field("add_name", &self.add_name)
            .field("remove_name", &self.remove_name)
            .field("clear_name", &self.clear_name)
            .field("element_name", &self.element_name)
            .field("throw_on_duplicate", &self.throws_on_duplicate())
            .finish_non_exhaustive()
    }
}

// ========== Hooks ==========

/// Override points consulted while reading and resetting elements
///
/// Every method has a default that declines, so an implementation only
/// overrides what it needs.
pub trait ElementHooks: Send + Sync {
    /// Claim an attribute the schema does not know. `Ok(false)` declines.
    fn on_unrecognized_attribute(
        &self,
        _element: &mut Element,
        _name: &str,
        _value: &str,
    ) -> Result<bool> {
        Ok(false)
    }

    /// Claim a child element the schema does not know. `Ok(false)` declines.
    fn on_unrecognized_element(&self, _element: &mut Element, _node: &XmlNode) -> Result<bool> {
        Ok(false)
    }

    /// Supply a value for a required property the source omitted.
    fn on_required_property_missing(&self, _element: &Element, name: &str) -> Result<Value> {
        Err(ConfigError::RequiredPropertyMissing {
            name: name.to_string(),
            location: Location::UNKNOWN,
        })
    }

    /// Seed hard-coded defaults when an element is reset without a parent.
    fn initialize_default(&self, _element: &mut Element) -> Result<()> {
        Ok(())
    }

    /// Runs after an element finished deserializing.
    fn post_deserialize(&self, _element: &mut Element) -> Result<()> {
        Ok(())
    }
}

// ========== Schemas ==========

/// Static description of one element type
pub struct PropertySchema {
    type_name: String,
    properties: Vec<PropertyDescriptor>,
    index: HashMap<String, usize>,
    default_collection: Option<usize>,
    keys: OnceLock<Vec<usize>>,
    collection: Option<CollectionDescriptor>,
    hooks: Option<Arc<dyn ElementHooks>>,
}

impl PropertySchema {
    pub fn builder(type_name: impl Into<String>) -> PropertySchemaBuilder {
        PropertySchemaBuilder {
            type_name: type_name.into(),
            properties: Vec::new(),
            collection: None,
            hooks: None,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn resolve(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.index_of(name).map(|i| &self.properties[i])
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Properties in declaration order
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn default_collection(&self) -> Option<&PropertyDescriptor> {
        self.default_collection.map(|i| &self.properties[i])
    }

    pub(crate) fn default_collection_index(&self) -> Option<usize> {
        self.default_collection
    }

    pub fn key_properties(&self) -> Vec<&PropertyDescriptor> {
        self.key_indexes()
            .iter()
            .map(|i| &self.properties[*i])
            .collect()
    }

    pub(crate) fn key_indexes(&self) -> &[usize] {
        self.keys.get_or_init(|| {
            self.properties
                .iter()
                .enumerate()
                .filter(|(_, p)| p.is_key())
                .map(|(i, _)| i)
                .collect()
        })
    }

    pub fn collection(&self) -> Option<&CollectionDescriptor> {
        self.collection.as_ref()
    }

    pub fn hooks(&self) -> Option<&Arc<dyn ElementHooks>> {
        self.hooks.as_ref()
    }

    /// Whether two schemas describe the same element type.
    pub fn same_type(&self, other: &PropertySchema) -> bool {
        std::ptr::eq(self, other)
            || (self.type_name == other.type_name
                && self.properties.len() == other.properties.len()
                && self
                    .properties
                    .iter()
                    .zip(&other.properties)
                    .all(|(a, b)| a.name == b.name && a.is_element() == b.is_element()))
            && self.collection.is_some() == other.collection.is_some()
    }
}

impl fmt::Debug for PropertySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySchema")
            .field("type_name", &self.type_name)
            .field("properties", &self.properties)
            .field("collection", &self.collection)
            .field("hooks", &self.hooks.is_some())
            .finish()
    }
}

/// Collects descriptors and checks them on `build`
pub struct PropertySchemaBuilder {
    type_name: String,
    properties: Vec<PropertyDescriptor>,
    collection: Option<CollectionDescriptor>,
    hooks: Option<Arc<dyn ElementHooks>>,
}

impl PropertySchemaBuilder {
    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    pub fn collection(mut self, collection: CollectionDescriptor) -> Self {
        self.collection = Some(collection);
        self
    }

    pub fn hooks(mut self, hooks: impl ElementHooks + 'static) -> Self {
        self.hooks = Some(Arc::new(hooks));
        self
    }

    /// Validate the declarations and freeze them into a schema
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` for duplicate names, more than one default
    /// collection, unnamed ordinary properties, misplaced flags, validators
    /// that can't handle the property type, or invalid default values.
    pub fn build(self) -> Result<PropertySchema> {
        let type_name = self.type_name;
        let mut index = HashMap::with_capacity(self.properties.len());
        let mut default_collection = None;

        for (i, prop) in self.properties.iter().enumerate() {
            if index.insert(prop.name.clone(), i).is_some() {
                return Err(ConfigError::schema(
                    &type_name,
                    format!("property '{}' is declared more than once", prop.name),
                ));
            }

            if prop.default_collection {
                if default_collection.is_some() {
                    return Err(ConfigError::schema(
                        &type_name,
                        "only one property may be the default collection",
                    ));
                }
                if !prop.is_element() {
                    return Err(ConfigError::schema(
                        &type_name,
                        format!("default collection '{}' must be an element", prop.name),
                    ));
                }
                default_collection = Some(i);
            } else if prop.name.is_empty() {
                return Err(ConfigError::schema(
                    &type_name,
                    "only the default collection may have an empty name",
                ));
            }

            if prop.is_element() {
                if prop.key {
                    return Err(ConfigError::schema(
                        &type_name,
                        format!("element property '{}' can't be a key", prop.name),
                    ));
                }
                if !prop.default_value.is_null() {
                    return Err(ConfigError::schema(
                        &type_name,
                        format!("element property '{}' can't have a default value", prop.name),
                    ));
                }
            }

            if let Some(validator) = &prop.validator {
                if !validator.can_validate(&prop.value_type) {
                    return Err(ConfigError::schema(
                        &type_name,
                        format!(
                            "validator of '{}' does not support type {}",
                            prop.name,
                            prop.value_type.name()
                        ),
                    ));
                }
            }

            if !prop.is_element() {
                prop.check(&prop.default_value).map_err(|e| {
                    ConfigError::schema(
                        &type_name,
                        format!("invalid default for '{}': {}", prop.name, e),
                    )
                })?;
            }
        }

        Ok(PropertySchema {
            type_name,
            properties: self.properties,
            index,
            default_collection,
            keys: OnceLock::new(),
            collection: self.collection,
            hooks: self.hooks,
        })
    }
}
