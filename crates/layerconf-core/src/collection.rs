//! Keyed item collections
//!
//! An element whose schema carries a [`CollectionDescriptor`] owns an
//! [`ItemStore`]: the ordered items, the keys the parent layer contributed,
//! and the bookkeeping needed to write `<remove>` and `<clear>` directives.
//!
//! Items are split into an inherited run and a local run. Regular shapes
//! keep inherited items first; alternate shapes put local items first.
//! `split` is the index of the boundary.

use std::fmt;
use std::sync::Arc;

use crate::element::Element;
use crate::errors::{ConfigError, Location, Result};
use crate::schema::{CollectionDescriptor, PropertySchema};
use crate::value::{SaveMode, Value};
use crate::xml::XmlNode;

/// Ordered values of an item's key properties
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementKey(Vec<Value>);

impl ElementKey {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}

impl<T: Into<Value>> From<T> for ElementKey {
    fn from(value: T) -> Self {
        Self(vec![value.into()])
    }
}

/// Items of a collection element plus inheritance bookkeeping
#[derive(Debug, Clone)]
pub(crate) struct ItemStore {
    pub(crate) item_schema: Arc<PropertySchema>,
    pub(crate) items: Vec<Element>,
    pub(crate) inherited: Vec<ElementKey>,
    pub(crate) removed: Vec<Element>,
    pub(crate) split: usize,
    pub(crate) emit_clear: bool,
    pub(crate) modified: bool,
}

impl ItemStore {
    pub(crate) fn new(item_schema: Arc<PropertySchema>) -> Self {
        Self {
            item_schema,
            items: Vec::new(),
            inherited: Vec::new(),
            removed: Vec::new(),
            split: 0,
            emit_clear: false,
            modified: false,
        }
    }
}

impl Element {
    pub fn is_collection(&self) -> bool {
        self.items.is_some()
    }

    fn store(&self) -> Result<&ItemStore> {
        self.items.as_ref().ok_or_else(|| self.not_a_collection())
    }

    fn not_a_collection(&self) -> ConfigError {
        ConfigError::TypeMismatch {
            name: self.type_name().to_string(),
            reason: "element is not a collection".to_string(),
            location: Location::UNKNOWN,
        }
    }

    fn collection_descriptor(&self) -> Result<CollectionDescriptor> {
        self.schema
            .collection()
            .cloned()
            .ok_or_else(|| self.not_a_collection())
    }

    fn check_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(ConfigError::ReadOnlyCollection {
                collection: self.type_name().to_string(),
            });
        }
        if self.inherited_lock_item {
            return Err(ConfigError::LockViolation {
                name: self.type_name().to_string(),
                location: Location::UNKNOWN,
            });
        }
        Ok(())
    }

    // ===== Reading =====

    /// Number of items; zero for non-collections
    pub fn len(&self) -> usize {
        self.items.as_ref().map_or(0, |s| s.items.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Items in emission order; empty for non-collections
    pub fn items(&self) -> std::slice::Iter<'_, Element> {
        match &self.items {
            Some(store) => store.items.iter(),
            None => [].iter(),
        }
    }

    pub fn item(&self, index: usize) -> Option<&Element> {
        self.items.as_ref().and_then(|s| s.items.get(index))
    }

    /// Mutable access to an item
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` on non-collections, `ReadOnlyCollection` when
    /// frozen and `IndexOutOfRange` for a bad index.
    pub fn item_mut(&mut self, index: usize) -> Result<&mut Element> {
        if self.read_only {
            return Err(ConfigError::ReadOnlyCollection {
                collection: self.type_name().to_string(),
            });
        }
        self.touch();
        let store = self.items.as_mut().ok_or_else(missing_store)?;
        let len = store.items.len();
        store
            .items
            .get_mut(index)
            .ok_or(ConfigError::IndexOutOfRange { index, len })
    }

    pub fn index_of_key(&self, key: &ElementKey) -> Option<usize> {
        let collection = self.schema.collection()?;
        self.items()
            .position(|item| collection.keys_match(&item.key(), key))
    }

    pub fn item_by_key(&self, key: &ElementKey) -> Option<&Element> {
        self.index_of_key(key).and_then(|i| self.item(i))
    }

    /// Keys of every item, in emission order
    pub fn keys(&self) -> Vec<ElementKey> {
        self.items().map(Element::key).collect()
    }

    /// Whether `key` was removed in this layer
    pub fn is_removed(&self, key: &ElementKey) -> bool {
        let Some(collection) = self.schema.collection() else {
            return false;
        };
        self.items.as_ref().is_some_and(|s| {
            s.removed
                .iter()
                .any(|r| collection.keys_match(&r.key(), key))
        })
    }

    pub fn removed_keys(&self) -> Vec<ElementKey> {
        self.items
            .as_ref()
            .map(|s| s.removed.iter().map(Element::key).collect())
            .unwrap_or_default()
    }

    /// Whether writing this collection starts with a `<clear/>` directive
    pub fn emits_clear(&self) -> bool {
        self.items.as_ref().is_some_and(|s| s.emit_clear)
    }

    /// Whether the item with `key` was contributed by a parent layer
    pub fn is_inherited(&self, key: &ElementKey) -> bool {
        let Some(collection) = self.schema.collection() else {
            return false;
        };
        self.items.as_ref().is_some_and(|s| {
            s.inherited
                .iter()
                .any(|k| collection.keys_match(k, key))
        })
    }

    /// Fresh item of this collection's item type
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` on non-collections and `SchemaError` if the
    /// item schema fails to build.
    pub fn new_item(&self) -> Result<Element> {
        Element::new(Arc::clone(&self.store()?.item_schema))
    }

    // ===== Mutation =====

    /// Add an item under the collection's duplicate policy
    ///
    /// # Errors
    ///
    /// See [`Element::add_item_with`].
    pub fn add_item(&mut self, item: Element) -> Result<()> {
        let throw = self.collection_descriptor()?.throws_on_duplicate();
        self.add_item_with(item, throw)
    }

    /// Add an item, replacing or rejecting an existing item with the same key
    ///
    /// An equal item already present is left alone. New items go after the
    /// inherited run, or before it for alternate shapes. A replaced
    /// inherited item moves into the local run.
    ///
    /// # Errors
    ///
    /// Returns `ReadOnlyCollection`, `TypeMismatch` for an item of the wrong
    /// type, `DuplicateKey` when `throw_if_duplicate` is set and the key is
    /// taken, and `LockViolation` when the existing item was locked by a
    /// parent layer.
    pub fn add_item_with(&mut self, item: Element, throw_if_duplicate: bool) -> Result<()> {
        let collection = self.collection_descriptor()?;
        self.check_writable()?;
        self.check_item_type(&item)?;

        let key = item.key();
        let shape = collection.shape();
        let existing = self.index_of_key(&key);
        let store = self.items.as_mut().ok_or_else(missing_store)?;

        match existing {
            Some(i) if store.items[i] == item => return Ok(()),
            Some(_) if throw_if_duplicate => {
                return Err(ConfigError::DuplicateKey {
                    key: key.to_string(),
                    location: Location::UNKNOWN,
                })
            }
            Some(i) if store.items[i].inherited_lock_item => {
                return Err(ConfigError::LockViolation {
                    name: key.to_string(),
                    location: Location::UNKNOWN,
                })
            }
            Some(i) => {
                let inherited = store.inherited.iter().any(|k| collection.keys_match(k, &key));
                if !inherited {
                    store.items[i] = item;
                } else if shape.is_alternate() {
                    store.items.remove(i);
                    store.items.insert(store.split, item);
                    store.split += 1;
                    store.inherited.retain(|k| !collection.keys_match(k, &key));
                } else {
                    store.items.remove(i);
                    if i < store.split {
                        store.split -= 1;
                    }
                    store.items.push(item);
                    store.inherited.retain(|k| !collection.keys_match(k, &key));
                }
            }
            None if shape.is_alternate() => {
                store.items.insert(store.split, item);
                store.split += 1;
            }
            None => store.items.push(item),
        }

        store.removed.retain(|r| !collection.keys_match(&r.key(), &key));
        store.modified = true;
        tracing::trace!(collection = self.type_name(), key = %key, "Item added");
        self.touch();
        Ok(())
    }

    /// Insert an item at `index`
    ///
    /// Regular shapes only accept positions at or after the inherited run;
    /// alternate shapes only accept positions before it.
    ///
    /// # Errors
    ///
    /// Returns `ReadOnlyCollection`, `IndexOutOfRange`, `DuplicateKey` when
    /// the key is taken and the collection rejects duplicates,
    /// `InvalidInsertPosition` when `index` crosses the inherited/local
    /// boundary, and `TypeMismatch` for an item of the wrong type.
    pub fn insert_item(&mut self, index: usize, item: Element) -> Result<()> {
        let collection = self.collection_descriptor()?;
        self.check_writable()?;
        self.check_item_type(&item)?;

        let len = self.len();
        if index > len {
            return Err(ConfigError::IndexOutOfRange { index, len });
        }

        let key = item.key();
        let existing = self.index_of_key(&key);
        let store = self.items.as_mut().ok_or_else(missing_store)?;
        let mut index = index;

        if let Some(j) = existing {
            if collection.throws_on_duplicate() {
                return Err(ConfigError::DuplicateKey {
                    key: key.to_string(),
                    location: Location::UNKNOWN,
                });
            }
            if store.items[j].inherited_lock_item {
                return Err(ConfigError::LockViolation {
                    name: key.to_string(),
                    location: Location::UNKNOWN,
                });
            }
            store.items.remove(j);
            if j < index {
                index -= 1;
            }
            if j < store.split {
                store.split -= 1;
            }
            store.inherited.retain(|k| !collection.keys_match(k, &key));
        }

        if collection.shape().is_alternate() {
            if index > store.split {
                return Err(ConfigError::InvalidInsertPosition {
                    index,
                    reason: "local items must precede inherited items".to_string(),
                });
            }
            store.split += 1;
        } else if index < store.split {
            return Err(ConfigError::InvalidInsertPosition {
                index,
                reason: "local items must follow inherited items".to_string(),
            });
        }

        store.items.insert(index, item);
        store.removed.retain(|r| !collection.keys_match(&r.key(), &key));
        store.modified = true;
        self.touch();
        Ok(())
    }

    /// Remove the item with `key`. Returns whether an item was removed.
    ///
    /// # Errors
    ///
    /// See [`Element::remove_item_at`].
    pub fn remove_item(&mut self, key: &ElementKey) -> Result<bool> {
        self.collection_descriptor()?;
        self.check_writable()?;
        match self.index_of_key(key) {
            Some(i) => self.remove_item_at(i).map(|_| true),
            None => Ok(false),
        }
    }

    /// Remove and return the item at `index`
    ///
    /// Removing an inherited item from a map shape records its key so the
    /// layer writes a `<remove>` directive.
    ///
    /// # Errors
    ///
    /// Returns `ReadOnlyCollection`, `IndexOutOfRange`,
    /// `ElementNotRemovable` when the collection refuses the item or the
    /// item is inherited into a basic shape, and `LockViolation` when a
    /// parent layer locked the item.
    pub fn remove_item_at(&mut self, index: usize) -> Result<Element> {
        let collection = self.collection_descriptor()?;
        self.check_writable()?;

        let store = self.items.as_mut().ok_or_else(missing_store)?;
        let len = store.items.len();
        let item = store
            .items
            .get(index)
            .ok_or(ConfigError::IndexOutOfRange { index, len })?;
        let key = item.key();
        let inherited = store.inherited.iter().any(|k| collection.keys_match(k, &key));

        if !collection.is_removable(item) {
            return Err(ConfigError::ElementNotRemovable {
                key: key.to_string(),
                reason: "the collection refuses to remove this item".to_string(),
            });
        }
        if inherited && collection.shape().is_basic() {
            return Err(ConfigError::ElementNotRemovable {
                key: key.to_string(),
                reason: "inherited items can't be removed from a basic collection".to_string(),
            });
        }
        if item.inherited_lock_item {
            return Err(ConfigError::LockViolation {
                name: key.to_string(),
                location: Location::UNKNOWN,
            });
        }

        let removed = store.items.remove(index);
        if index < store.split {
            store.split -= 1;
        }
        if inherited {
            store.inherited.retain(|k| !collection.keys_match(k, &key));
            record_removed(store, &collection, &removed)?;
        }
        store.modified = true;
        tracing::trace!(collection = self.type_name(), key = %key, "Item removed");
        self.touch();
        Ok(removed)
    }

    /// Drop items from the collection
    ///
    /// Map shapes drop every item, inherited ones included, and write a
    /// `<clear/>` directive. Basic shapes keep their inherited items.
    ///
    /// # Errors
    ///
    /// Returns `ReadOnlyCollection`, and `LockViolation` when a map shape
    /// holds an item locked by a parent layer.
    pub fn clear_items(&mut self) -> Result<()> {
        let collection = self.collection_descriptor()?;
        self.check_writable()?;
        let store = self.items.as_mut().ok_or_else(missing_store)?;

        if collection.shape().is_basic() {
            let inherited = &store.inherited;
            store
                .items
                .retain(|item| inherited.iter().any(|k| collection.keys_match(k, &item.key())));
            store.split = if collection.shape().is_alternate() {
                0
            } else {
                store.items.len()
            };
        } else {
            if let Some(locked) = store.items.iter().find(|i| i.inherited_lock_item) {
                return Err(ConfigError::LockViolation {
                    name: locked.key().to_string(),
                    location: Location::UNKNOWN,
                });
            }
            store.items.clear();
            store.inherited.clear();
            store.removed.clear();
            store.split = 0;
            store.emit_clear = true;
        }
        store.modified = true;
        self.touch();
        Ok(())
    }

    fn check_item_type(&self, item: &Element) -> Result<()> {
        let store = self.store()?;
        if store.item_schema.same_type(item.schema()) {
            return Ok(());
        }
        Err(ConfigError::TypeMismatch {
            name: item.type_name().to_string(),
            reason: format!(
                "collection '{}' holds items of type '{}'",
                self.type_name(),
                store.item_schema.type_name()
            ),
            location: Location::UNKNOWN,
        })
    }

    // ===== Layering =====

    /// Handle a child node addressed to this collection. Returns false when
    /// the node is not a directive or item of this collection.
    pub(crate) fn read_item_directive(&mut self, node: &XmlNode) -> Result<bool> {
        let Some(collection) = self.schema.collection().cloned() else {
            return Ok(false);
        };

        let handled = if collection.shape().is_basic() {
            if collection.is_item_name(&node.name) {
                let mut item = self.new_item()?;
                item.deserialize(node, false)?;
                self.add_item(item)?;
                true
            } else {
                false
            }
        } else if node.name == collection.clear_tag() {
            if let Some((name, _)) = node.attributes.first() {
                return Err(ConfigError::UnrecognizedAttribute {
                    name: name.clone(),
                    location: node.location,
                });
            }
            self.clear_items()?;
            true
        } else if node.name == collection.remove_tag() {
            let mut entry = self.new_item()?;
            entry.deserialize(node, true)?;
            self.remove_item(&entry.key())?;
            true
        } else if node.name == collection.add_tag() {
            let mut item = self.new_item()?;
            item.deserialize(node, false)?;
            self.add_item(item)?;
            true
        } else {
            false
        };

        if handled {
            if let Some(store) = self.items.as_mut() {
                store.modified = false;
            }
            self.touch();
        }
        Ok(handled)
    }

    /// Repopulate items with copies of the parent's items.
    pub(crate) fn reset_items(&mut self, parent: Option<&Element>) -> Result<()> {
        let Some(collection) = self.schema.collection().cloned() else {
            return Ok(());
        };
        let Some(store) = self.items.as_mut() else {
            return Ok(());
        };

        store.items.clear();
        store.inherited.clear();
        store.removed.clear();
        store.emit_clear = false;
        store.modified = false;

        if let Some(pstore) = parent.and_then(|p| p.items.as_ref()) {
            for pitem in &pstore.items {
                let mut item = Element::new(Arc::clone(&store.item_schema))?;
                item.reset(Some(pitem))?;
                store.inherited.push(item.key());
                store.items.push(item);
            }
        }

        store.split = if collection.shape().is_alternate() {
            0
        } else {
            store.items.len()
        };
        Ok(())
    }

    /// Collection half of [`Element::unmerge`].
    pub(crate) fn unmerge_items(
        &mut self,
        source: &Element,
        parent: Option<&Element>,
        mode: SaveMode,
    ) -> Result<()> {
        let Some(collection) = self.schema.collection().cloned() else {
            return Ok(());
        };
        let (Some(store), Some(sstore)) = (self.items.as_mut(), source.items.as_ref()) else {
            return Ok(());
        };
        let pstore = parent.and_then(|p| p.items.as_ref());
        let is_map = !collection.shape().is_basic();

        for sitem in &sstore.items {
            let skey = sitem.key();
            let pitem = pstore.and_then(|ps| {
                ps.items
                    .iter()
                    .find(|p| collection.keys_match(&p.key(), &skey))
            });
            let local = !sstore
                .inherited
                .iter()
                .any(|k| collection.keys_match(k, &skey));

            let mut item = Element::new(Arc::clone(&store.item_schema))?;
            match pitem {
                Some(_) if mode != SaveMode::Full && is_map && local => {
                    // Map shapes only accept a parent key again after a `<remove>`.
                    item.unmerge(sitem, None, mode)?;
                    if !sstore.emit_clear {
                        record_removed(store, &collection, sitem)?;
                    }
                    store.items.push(item);
                }
                Some(pitem) if mode != SaveMode::Full => {
                    item.unmerge(sitem, Some(pitem), mode)?;
                    item.copy_key_from(sitem);
                    if item.has_values(Some(pitem), mode) {
                        store.items.push(item);
                    }
                }
                _ => {
                    item.unmerge(sitem, None, mode)?;
                    store.items.push(item);
                }
            }
        }

        if mode == SaveMode::Full {
            store.emit_clear = parent.is_some() && !collection.shape().is_basic();
        } else if sstore.emit_clear {
            store.emit_clear = true;
        } else if let Some(pstore) = pstore.filter(|_| !collection.shape().is_basic()) {
            for pitem in &pstore.items {
                let pkey = pitem.key();
                let kept = sstore
                    .items
                    .iter()
                    .any(|s| collection.keys_match(&s.key(), &pkey));
                if !kept {
                    let mut entry = Element::new(Arc::clone(&store.item_schema))?;
                    entry.copy_key_from(pitem);
                    record_removed(store, &collection, &entry)?;
                }
            }
        }

        store.split = store.items.len();
        store.modified = false;
        Ok(())
    }
}

/// Record a key-only copy of `item` in `removed`, once per key.
fn record_removed(
    store: &mut ItemStore,
    collection: &CollectionDescriptor,
    item: &Element,
) -> Result<()> {
    let key = item.key();
    if store
        .removed
        .iter()
        .any(|r| collection.keys_match(&r.key(), &key))
    {
        return Ok(());
    }
    let mut entry = Element::new(Arc::clone(&store.item_schema))?;
    entry.copy_key_from(item);
    store.removed.push(entry);
    Ok(())
}

fn missing_store() -> ConfigError {
    ConfigError::TypeMismatch {
        name: String::new(),
        reason: "element is not a collection".to_string(),
        location: Location::UNKNOWN,
    }
}
