//! Configuration elements
//!
//! An [`Element`] holds one [`PropertyState`] per schema property. Scalar
//! states carry a [`Value`]; element-typed states own the nested element.
//! Elements whose schema describes a collection also own an item store (see
//! `collection.rs`). Reading XML, resetting from a parent layer and
//! unmerging against a parent live here; save planning and writing live in
//! `save.rs`.

use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use layerconf_core_types::Sensitive;

use crate::collection::{ElementKey, ItemStore};
use crate::errors::{ConfigError, Location, Result};
use crate::locks::{parse_lock_item, Locks, LOCK_ITEM};
use crate::registry::{schema_of, ElementType};
use crate::schema::{PropertyDescriptor, PropertySchema};
use crate::value::{SaveMode, Value, ValueOrigin, ValueType};
use crate::xml::XmlNode;

const XMLNS: &str = "xmlns";
const CONFIG_SOURCE: &str = "configSource";

/// Current value of one property
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PropertyValue {
    Scalar(Value),
    Element(Box<Element>),
}

/// Runtime record of one property: value, provenance and modification flag
#[derive(Debug, Clone)]
pub(crate) struct PropertyState {
    pub(crate) value: PropertyValue,
    pub(crate) origin: ValueOrigin,
    pub(crate) modified: bool,
}

/// A node of the configuration tree
#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) schema: Arc<PropertySchema>,
    pub(crate) states: Vec<PropertyState>,
    pub(crate) locks: Locks,
    pub(crate) inherited_locks: Vec<Locks>,
    pub(crate) lock_item: bool,
    pub(crate) inherited_lock_item: bool,
    pub(crate) present: bool,
    pub(crate) modified: bool,
    pub(crate) read_only: bool,
    modified_memo: OnceLock<bool>,
    pub(crate) items: Option<ItemStore>,
}

impl Element {
    /// Construct an element with every property at its default
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if a nested schema fails to build or the item
    /// type of a collection declares no key properties.
    pub fn new(schema: Arc<PropertySchema>) -> Result<Self> {
        let mut states = Vec::with_capacity(schema.properties().len());
        for prop in schema.properties() {
            let value = match prop.value_type() {
                ValueType::Element(source) => {
                    PropertyValue::Element(Box::new(Element::new(source()?)?))
                }
                _ => PropertyValue::Scalar(prop.default().clone()),
            };
            states.push(PropertyState {
                value,
                origin: ValueOrigin::Default,
                modified: false,
            });
        }

        let items = match schema.collection() {
            Some(collection) => {
                let item_schema = collection.item_schema()?;
                if item_schema.key_indexes().is_empty() {
                    return Err(ConfigError::schema(
                        schema.type_name(),
                        format!(
                            "collection item type '{}' declares no key properties",
                            item_schema.type_name()
                        ),
                    ));
                }
                Some(ItemStore::new(item_schema))
            }
            None => None,
        };

        Ok(Self {
            schema,
            states,
            locks: Locks::default(),
            inherited_locks: Vec::new(),
            lock_item: false,
            inherited_lock_item: false,
            present: false,
            modified: false,
            read_only: false,
            modified_memo: OnceLock::new(),
            items,
        })
    }

    /// Construct an element of a registered type
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if the type's schema fails to build.
    pub fn of<T: ElementType>() -> Result<Self> {
        Self::new(schema_of::<T>()?)
    }

    pub fn schema(&self) -> &Arc<PropertySchema> {
        &self.schema
    }

    pub fn type_name(&self) -> &str {
        self.schema.type_name()
    }

    // ===== Property access =====

    pub(crate) fn index(&self, name: &str) -> Result<usize> {
        self.schema
            .index_of(name)
            .ok_or_else(|| ConfigError::UnknownProperty {
                name: name.to_string(),
                element: self.type_name().to_string(),
            })
    }

    /// # Errors
    ///
    /// Returns `UnknownProperty` for names outside the schema.
    pub fn descriptor(&self, name: &str) -> Result<&PropertyDescriptor> {
        let i = self.index(name)?;
        Ok(&self.schema.properties()[i])
    }

    /// Current value of a scalar property
    ///
    /// # Errors
    ///
    /// Returns `UnknownProperty` for names outside the schema and
    /// `TypeMismatch` for element-typed properties.
    pub fn get(&self, name: &str) -> Result<&Value> {
        let i = self.index(name)?;
        match &self.states[i].value {
            PropertyValue::Scalar(v) => Ok(v),
            PropertyValue::Element(_) => Err(not_scalar(name)),
        }
    }

    /// # Errors
    ///
    /// Returns `UnknownProperty` for names outside the schema.
    pub fn origin(&self, name: &str) -> Result<ValueOrigin> {
        Ok(self.states[self.index(name)?].origin)
    }

    /// # Errors
    ///
    /// Returns `UnknownProperty` for names outside the schema.
    pub fn is_property_modified(&self, name: &str) -> Result<bool> {
        Ok(self.states[self.index(name)?].modified)
    }

    /// Nested element of an element-typed property
    ///
    /// # Errors
    ///
    /// Returns `UnknownProperty` for names outside the schema and
    /// `TypeMismatch` for scalar properties.
    pub fn child(&self, name: &str) -> Result<&Element> {
        let i = self.index(name)?;
        match &self.states[i].value {
            PropertyValue::Element(e) => Ok(e.as_ref()),
            PropertyValue::Scalar(_) => Err(not_element(name)),
        }
    }

    /// Mutable access to a nested element
    ///
    /// A child still at its default becomes `Inherited`, since it may now
    /// carry data of its own.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProperty`, `TypeMismatch` for scalar properties,
    /// `ReadOnlyElement` on frozen elements and `LockViolation` when a parent
    /// layer locked the child element.
    pub fn child_mut(&mut self, name: &str) -> Result<&mut Element> {
        let i = self.index(name)?;
        if self.read_only {
            return Err(self.read_only_error());
        }
        if self.inherited_lock_item || self.is_element_locked(name) {
            return Err(lock_violation(name));
        }
        self.touch();
        let state = &mut self.states[i];
        match &mut state.value {
            PropertyValue::Element(e) => {
                if state.origin == ValueOrigin::Default {
                    state.origin = ValueOrigin::Inherited;
                }
                Ok(e.as_mut())
            }
            PropertyValue::Scalar(_) => Err(not_element(name)),
        }
    }

    /// Assign a scalar property
    ///
    /// # Errors
    ///
    /// Returns `UnknownProperty`, `ReadOnlyElement` on frozen elements,
    /// `LockViolation` when a parent layer locked the attribute or the item,
    /// `TypeMismatch` for element-typed properties or values of the wrong
    /// type, and `InvalidPropertyValue` when the validator rejects the value.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let i = self.index(name)?;
        if self.read_only {
            return Err(self.read_only_error());
        }
        if self.inherited_lock_item || self.is_attribute_locked(name) {
            return Err(lock_violation(name));
        }

        let schema = Arc::clone(&self.schema);
        let prop = &schema.properties()[i];
        if prop.is_element() {
            return Err(not_scalar(name));
        }
        let value = value.into();
        prop.check(&value)?;

        tracing::debug!(
            element_type = self.type_name(),
            property = name,
            value = %Sensitive::when(prop.is_sensitive(), &value),
            "Property assigned"
        );

        let state = &mut self.states[i];
        state.value = PropertyValue::Scalar(value);
        state.origin = ValueOrigin::SetHere;
        state.modified = true;
        self.modified = true;
        self.touch();
        Ok(())
    }

    pub(crate) fn scalar_at(&self, i: usize) -> Option<&Value> {
        match &self.states[i].value {
            PropertyValue::Scalar(v) => Some(v),
            PropertyValue::Element(_) => None,
        }
    }

    pub(crate) fn element_at(&self, i: usize) -> Option<&Element> {
        match &self.states[i].value {
            PropertyValue::Element(e) => Some(e.as_ref()),
            PropertyValue::Scalar(_) => None,
        }
    }

    /// Composite key made of the key properties, in declaration order
    pub fn key(&self) -> ElementKey {
        ElementKey::new(
            self.schema
                .key_indexes()
                .iter()
                .filter_map(|i| self.scalar_at(*i).cloned())
                .collect(),
        )
    }

    /// Copy key values from `other`, marking them inherited.
    pub(crate) fn copy_key_from(&mut self, other: &Element) {
        for &k in self.schema.key_indexes() {
            if let Some(v) = other.scalar_at(k) {
                let state = &mut self.states[k];
                state.value = PropertyValue::Scalar(v.clone());
                state.origin = ValueOrigin::Inherited;
                state.modified = false;
            }
        }
        self.touch();
    }

    // ===== Locks and flags =====

    /// Locks declared by this layer's element
    pub fn locks(&self) -> &Locks {
        &self.locks
    }

    pub fn locks_mut(&mut self) -> &mut Locks {
        self.touch();
        &mut self.locks
    }

    pub fn lock_item(&self) -> bool {
        self.lock_item
    }

    pub fn set_lock_item(&mut self, lock: bool) {
        self.lock_item = lock;
        self.touch();
    }

    /// Whether a parent layer locked the whole element
    pub fn is_item_locked(&self) -> bool {
        self.inherited_lock_item
    }

    /// Whether a parent layer locked attribute `name`
    pub fn is_attribute_locked(&self, name: &str) -> bool {
        self.inherited_locks
            .iter()
            .any(|l| l.attributes.is_locked(name))
    }

    /// Whether a parent layer locked child element `name`
    pub fn is_element_locked(&self, name: &str) -> bool {
        self.inherited_locks.iter().any(|l| l.elements.is_locked(name))
    }

    /// Whether the element appeared in the source it was last read from
    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Freeze this element, its children and its items
    pub fn set_read_only(&mut self) {
        self.read_only = true;
        for state in &mut self.states {
            if let PropertyValue::Element(e) = &mut state.value {
                e.set_read_only();
            }
        }
        if let Some(store) = &mut self.items {
            for item in &mut store.items {
                item.set_read_only();
            }
        }
    }

    pub(crate) fn read_only_error(&self) -> ConfigError {
        ConfigError::ReadOnlyElement {
            element: self.type_name().to_string(),
        }
    }

    /// Drop the memoized `is_modified` result.
    pub(crate) fn touch(&mut self) {
        self.modified_memo = OnceLock::new();
    }

    // ===== Modification tracking =====

    /// Whether anything in this subtree was set since the last
    /// `reset_modified`
    ///
    /// The answer is memoized until the element is mutated again.
    pub fn is_modified(&self) -> bool {
        *self.modified_memo.get_or_init(|| {
            self.modified
                || self.states.iter().any(|s| match &s.value {
                    PropertyValue::Scalar(_) => s.origin == ValueOrigin::SetHere && s.modified,
                    PropertyValue::Element(e) => e.is_modified(),
                })
                || self
                    .items
                    .as_ref()
                    .is_some_and(|store| store.modified || store.items.iter().any(Element::is_modified))
        })
    }

    /// Clear every modification flag in this subtree
    pub fn reset_modified(&mut self) {
        self.modified = false;
        for state in &mut self.states {
            state.modified = false;
            if let PropertyValue::Element(e) = &mut state.value {
                e.reset_modified();
            }
        }
        if let Some(store) = &mut self.items {
            store.modified = false;
            for item in &mut store.items {
                item.reset_modified();
            }
        }
        self.touch();
    }

    // ===== Reset =====

    /// Re-derive every property from `parent`, or from the defaults
    ///
    /// With a parent, properties the parent holds at a non-default origin
    /// are copied as `Inherited`; the rest return to their defaults. The
    /// parent's locks accumulate into this element's inherited locks and
    /// collections are repopulated with copies of the parent's items.
    /// Without a parent everything returns to its default and the
    /// `initialize_default` hook runs. Modification flags are cleared either
    /// way.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` when `parent` is of a different element type.
    pub fn reset(&mut self, parent: Option<&Element>) -> Result<()> {
        if let Some(p) = parent {
            self.check_same_type(p)?;
        }

        self.present = false;
        self.modified = false;
        self.locks = Locks::default();
        self.lock_item = false;

        let schema = Arc::clone(&self.schema);
        match parent {
            Some(p) => {
                self.inherited_locks = p.inherited_locks.clone();
                if !p.locks.is_empty() {
                    self.inherited_locks.push(p.locks.clone());
                }
                self.inherited_lock_item = p.lock_item || p.inherited_lock_item;

                for (i, prop) in schema.properties().iter().enumerate() {
                    let pstate = &p.states[i];
                    let state = &mut self.states[i];
                    match (&mut state.value, &pstate.value) {
                        (PropertyValue::Element(child), PropertyValue::Element(pchild)) => {
                            child.reset(Some(pchild))?;
                            state.origin = match pstate.origin {
                                ValueOrigin::Default => ValueOrigin::Default,
                                _ => ValueOrigin::Inherited,
                            };
                        }
                        (PropertyValue::Scalar(v), PropertyValue::Scalar(pv)) => {
                            if pstate.origin == ValueOrigin::Default {
                                *v = prop.default().clone();
                                state.origin = ValueOrigin::Default;
                            } else {
                                *v = pv.clone();
                                state.origin = ValueOrigin::Inherited;
                            }
                        }
                        _ => return Err(self_type_mismatch(prop.name())),
                    }
                    state.modified = false;
                }
            }
            None => {
                self.inherited_locks.clear();
                self.inherited_lock_item = false;
                for (i, prop) in schema.properties().iter().enumerate() {
                    let state = &mut self.states[i];
                    match &mut state.value {
                        PropertyValue::Element(child) => child.reset(None)?,
                        PropertyValue::Scalar(v) => *v = prop.default().clone(),
                    }
                    state.origin = ValueOrigin::Default;
                    state.modified = false;
                }
            }
        }

        self.reset_items(parent)?;
        self.touch();

        if parent.is_none() {
            if let Some(hooks) = schema.hooks().cloned() {
                hooks.initialize_default(self)?;
                self.reset_modified();
            }
        }
        Ok(())
    }

    pub(crate) fn check_same_type(&self, other: &Element) -> Result<()> {
        if self.schema.same_type(&other.schema) {
            return Ok(());
        }
        Err(ConfigError::TypeMismatch {
            name: self.type_name().to_string(),
            reason: format!(
                "can't combine with an element of type '{}'",
                other.type_name()
            ),
            location: Location::UNKNOWN,
        })
    }

    // ===== Deserialize =====

    /// Overlay the attributes and child elements of `node`
    ///
    /// With `key_only`, only key properties are recognized; this is how
    /// `<remove>` entries are read.
    ///
    /// # Errors
    ///
    /// Returns `UnrecognizedAttribute`, `UnrecognizedElement`,
    /// `DuplicateProperty`, `InvalidPropertyValue`, `TypeMismatch`,
    /// `LockViolation`, `RequiredPropertyMissing` or collection errors,
    /// carrying the location of the offending node.
    pub fn deserialize(&mut self, node: &XmlNode, key_only: bool) -> Result<()> {
        self.read_node(node, key_only)
            .map_err(|e| e.at(node.location))
    }

    fn read_node(&mut self, node: &XmlNode, key_only: bool) -> Result<()> {
        let schema = Arc::clone(&self.schema);
        let mut seen = vec![false; self.states.len()];
        self.present = true;
        self.touch();

        for (name, raw) in &node.attributes {
            let resolved = schema
                .index_of(name)
                .filter(|i| !key_only || schema.properties()[*i].is_key());
            match resolved {
                Some(i) => self.read_attribute(&schema.properties()[i], i, raw, &mut seen)?,
                None => self.read_reserved_attribute(name, raw)?,
            }
        }

        for child in &node.children {
            self.read_child(child, key_only, &mut seen)
                .map_err(|e| e.at(child.location))?;
        }

        self.modified = false;
        self.fill_required(key_only, &seen)?;

        if let Some(hooks) = schema.hooks().cloned() {
            hooks.post_deserialize(self)?;
        }
        self.touch();

        tracing::trace!(
            element_type = schema.type_name(),
            attributes = node.attributes.len(),
            children = node.children.len(),
            "Deserialized element"
        );
        Ok(())
    }

    fn read_attribute(
        &mut self,
        prop: &PropertyDescriptor,
        i: usize,
        raw: &str,
        seen: &mut [bool],
    ) -> Result<()> {
        let name = prop.name();
        if seen[i] {
            return Err(ConfigError::DuplicateProperty {
                name: name.to_string(),
                location: Location::UNKNOWN,
            });
        }
        if prop.is_element() {
            return Err(ConfigError::TypeMismatch {
                name: name.to_string(),
                reason: "an element property can't be supplied as an attribute".to_string(),
                location: Location::UNKNOWN,
            });
        }
        if self.inherited_lock_item || self.is_attribute_locked(name) {
            return Err(lock_violation(name));
        }

        let value = prop.parse(raw)?;
        let state = &mut self.states[i];
        state.value = PropertyValue::Scalar(value);
        state.origin = ValueOrigin::SetHere;
        state.modified = true;
        seen[i] = true;
        Ok(())
    }

    fn read_reserved_attribute(&mut self, name: &str, raw: &str) -> Result<()> {
        if self.locks.apply(name, raw) {
            return Ok(());
        }
        if name == LOCK_ITEM {
            self.lock_item = parse_lock_item(raw);
            return Ok(());
        }
        if name == XMLNS || name.starts_with("xmlns:") || name == CONFIG_SOURCE {
            return Ok(());
        }
        if let Some(hooks) = self.schema.hooks().cloned() {
            if hooks.on_unrecognized_attribute(self, name, raw)? {
                return Ok(());
            }
        }
        Err(ConfigError::UnrecognizedAttribute {
            name: name.to_string(),
            location: Location::UNKNOWN,
        })
    }

    fn read_child(&mut self, node: &XmlNode, key_only: bool, seen: &mut [bool]) -> Result<()> {
        if self.inherited_lock_item {
            return Err(lock_violation(&node.name));
        }

        let schema = Arc::clone(&self.schema);
        let declared = schema.index_of(&node.name);
        let resolved = declared.filter(|i| !key_only || schema.properties()[*i].is_key());

        if let Some(i) = resolved {
            let prop = &schema.properties()[i];
            if !prop.is_element() {
                return Err(ConfigError::TypeMismatch {
                    name: node.name.clone(),
                    reason: "a scalar property can't be supplied as a child element".to_string(),
                    location: Location::UNKNOWN,
                });
            }
            if seen[i] {
                return Err(ConfigError::DuplicateProperty {
                    name: node.name.clone(),
                    location: Location::UNKNOWN,
                });
            }
            if self.is_element_locked(&node.name) {
                return Err(lock_violation(&node.name));
            }

            let state = &mut self.states[i];
            if let PropertyValue::Element(child) = &mut state.value {
                child.deserialize(node, key_only)?;
            }
            state.origin = ValueOrigin::SetHere;
            seen[i] = true;
            return Ok(());
        }

        if self.read_item_directive(node)? {
            return Ok(());
        }

        if let Some(hooks) = schema.hooks().cloned() {
            if hooks.on_unrecognized_element(self, node)? {
                return Ok(());
            }
        }

        if declared.is_none() {
            if let Some(dc) = schema.default_collection_index() {
                let state = &mut self.states[dc];
                if let PropertyValue::Element(collection) = &mut state.value {
                    if collection.read_item_directive(node)? {
                        state.origin = ValueOrigin::SetHere;
                        return Ok(());
                    }
                }
            }
        }

        Err(ConfigError::UnrecognizedElement {
            name: node.name.clone(),
            location: Location::UNKNOWN,
        })
    }

    /// Required properties neither read nor inherited go through the
    /// `on_required_property_missing` hook.
    fn fill_required(&mut self, key_only: bool, seen: &[bool]) -> Result<()> {
        let schema = Arc::clone(&self.schema);
        for (i, prop) in schema.properties().iter().enumerate() {
            if prop.name().is_empty() || !prop.is_required() || seen[i] {
                continue;
            }
            if key_only && !prop.is_key() {
                continue;
            }
            if self.states[i].origin != ValueOrigin::Default {
                continue;
            }

            let value = match schema.hooks() {
                Some(hooks) => hooks.on_required_property_missing(self, prop.name())?,
                None => {
                    return Err(ConfigError::RequiredPropertyMissing {
                        name: prop.name().to_string(),
                        location: Location::UNKNOWN,
                    })
                }
            };

            if prop.is_element() || value == *prop.default() {
                continue;
            }
            prop.check(&value)?;
            let state = &mut self.states[i];
            state.value = PropertyValue::Scalar(value);
            state.origin = ValueOrigin::SetHere;
            state.modified = false;
        }
        Ok(())
    }

    // ===== Unmerge =====

    /// Fill this element with what `source` must write relative to `parent`
    ///
    /// `self` is expected to be freshly constructed. Per property of the
    /// source with a non-default origin: without a parent value the source
    /// value is copied; otherwise scalars are copied when they differ from
    /// the parent, when `mode` is `Full`, or under `Modified` when the
    /// source declared them here. Nested elements recurse, skipping
    /// unmodified subtrees under `Minimal` and `Modified`; a nested element
    /// the parent never set is copied whole unless it holds nothing to
    /// write.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` when the three elements are not of one type.
    pub fn unmerge(
        &mut self,
        source: &Element,
        parent: Option<&Element>,
        mode: SaveMode,
    ) -> Result<()> {
        self.check_same_type(source)?;
        if let Some(p) = parent {
            source.check_same_type(p)?;
        }

        for (i, sstate) in source.states.iter().enumerate() {
            if sstate.origin == ValueOrigin::Default {
                continue;
            }
            let parent_state = parent
                .map(|p| &p.states[i])
                .filter(|ps| ps.origin != ValueOrigin::Default);

            let state = &mut self.states[i];
            match (&mut state.value, &sstate.value, parent_state.map(|ps| &ps.value)) {
                (PropertyValue::Scalar(v), PropertyValue::Scalar(sv), pv) => {
                    let copy = match pv {
                        Some(PropertyValue::Scalar(pv)) => {
                            sv != pv
                                || mode == SaveMode::Full
                                || (mode == SaveMode::Modified
                                    && sstate.origin == ValueOrigin::SetHere)
                        }
                        _ => true,
                    };
                    if copy {
                        *v = sv.clone();
                        state.origin = ValueOrigin::SetHere;
                        state.modified = true;
                    }
                }
                (PropertyValue::Element(child), PropertyValue::Element(schild), None) => {
                    if mode != SaveMode::Full && !schild.has_values(None, mode) {
                        continue;
                    }
                    **child = (**schild).clone();
                    state.origin = ValueOrigin::SetHere;
                    state.modified = true;
                }
                (
                    PropertyValue::Element(child),
                    PropertyValue::Element(schild),
                    Some(PropertyValue::Element(pchild)),
                ) => {
                    if mode != SaveMode::Full && !schild.is_modified() {
                        continue;
                    }
                    child.unmerge(schild, Some(pchild), mode)?;
                    state.origin = ValueOrigin::Inherited;
                }
                _ => {
                    let name = source.schema.properties()[i].name();
                    return Err(self_type_mismatch(name));
                }
            }
        }

        self.locks = source.locks.clone();
        self.lock_item = source.lock_item;
        self.unmerge_items(source, parent, mode)?;
        self.touch();
        Ok(())
    }

    // ===== Equality and hashing =====

    /// Order-independent hash: wrapping sum of the property values' hashes
    /// plus the items' hashes
    pub fn hash_code(&self) -> u64 {
        let props = self.states.iter().fold(0u64, |acc, s| {
            let h = match &s.value {
                PropertyValue::Scalar(v) if v.is_null() => 0,
                PropertyValue::Scalar(v) => v.hash_code(),
                PropertyValue::Element(e) => e.hash_code(),
            };
            acc.wrapping_add(h)
        });
        self.items().fold(props, |acc, item| acc.wrapping_add(item.hash_code()))
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        if !self.schema.same_type(&other.schema) {
            return false;
        }
        let props_equal = self
            .states
            .iter()
            .zip(&other.states)
            .all(|(a, b)| a.value == b.value);
        let items_equal = match (&self.items, &other.items) {
            (Some(a), Some(b)) => a.items == b.items,
            (None, None) => true,
            _ => false,
        };
        props_equal && items_equal
    }
}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

fn lock_violation(name: &str) -> ConfigError {
    ConfigError::LockViolation {
        name: name.to_string(),
        location: Location::UNKNOWN,
    }
}

fn not_scalar(name: &str) -> ConfigError {
    ConfigError::TypeMismatch {
        name: name.to_string(),
        reason: "property holds an element, not a scalar value".to_string(),
        location: Location::UNKNOWN,
    }
}

fn not_element(name: &str) -> ConfigError {
    ConfigError::TypeMismatch {
        name: name.to_string(),
        reason: "property holds a scalar value, not an element".to_string(),
        location: Location::UNKNOWN,
    }
}

fn self_type_mismatch(name: &str) -> ConfigError {
    ConfigError::TypeMismatch {
        name: name.to_string(),
        reason: "property kinds differ between elements".to_string(),
        location: Location::UNKNOWN,
    }
}
