//! Save planning and XML writing
//!
//! Whether a layer has anything to write is decided once, by
//! [`Element::prepare_save`], and the resulting [`SavePlan`] is the only
//! input the writer consults. The pre-write "is there anything to save"
//! check and the write itself therefore always agree.

use crate::element::Element;
use crate::errors::Result;
use crate::locks::LOCK_ITEM;
use crate::value::{SaveMode, ValueOrigin};
use crate::xml::XmlNode;

/// Cached write decisions for one element tree
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SavePlan {
    has_values: bool,
    attributes: Vec<bool>,
    children: Vec<Option<SavePlan>>,
    items: Vec<SavePlan>,
}

impl SavePlan {
    /// Whether the element is written at all
    pub fn has_values(&self) -> bool {
        self.has_values
    }

    /// Whether the scalar property at `index` is written as an attribute
    pub fn writes_attribute(&self, index: usize) -> bool {
        self.attributes.get(index).copied().unwrap_or(false)
    }

    /// Plan of the nested element at `index`, if it is written
    pub fn child(&self, index: usize) -> Option<&SavePlan> {
        self.children.get(index).and_then(Option::as_ref)
    }

    /// Plans of the collection items, in item order
    pub fn items(&self) -> &[SavePlan] {
        &self.items
    }
}

impl Element {
    /// Compute every write decision for this tree relative to `parent`
    ///
    /// A parent of another element type is ignored.
    pub fn prepare_save(&self, parent: Option<&Element>, mode: SaveMode) -> SavePlan {
        self.plan(parent, mode, false)
    }

    /// Whether property `name` would be written relative to `parent`
    ///
    /// # Errors
    ///
    /// Returns `UnknownProperty` for names outside the schema.
    pub fn has_value(&self, parent: Option<&Element>, name: &str, mode: SaveMode) -> Result<bool> {
        let i = self.index(name)?;
        let parent = parent.filter(|p| self.schema.same_type(&p.schema));
        Ok(match self.element_at(i) {
            Some(child) => {
                let pchild = parent_child(parent, i);
                self.child_qualifies(i, &child.plan(pchild, mode, false), mode)
            }
            None => self.scalar_has_value(i, parent, mode),
        })
    }

    /// Whether anything of this element would be written relative to
    /// `parent`
    pub fn has_values(&self, parent: Option<&Element>, mode: SaveMode) -> bool {
        self.prepare_save(parent, mode).has_values()
    }

    /// Build the XML node for this element under `plan`
    ///
    /// Returns `None` when the plan has nothing to write.
    pub fn to_node(&self, name: &str, plan: &SavePlan) -> Option<XmlNode> {
        if !plan.has_values {
            return None;
        }
        let mut node = XmlNode::new(name);
        self.write_contents(&mut node, plan);
        Some(node)
    }

    /// Plan and write this element as `<name …>` relative to `parent`
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the XML writer fails.
    pub fn serialize(
        &self,
        name: &str,
        parent: Option<&Element>,
        mode: SaveMode,
    ) -> Result<Option<String>> {
        let plan = self.prepare_save(parent, mode);
        self.to_node(name, &plan).map(|n| n.to_xml()).transpose()
    }

    /// Node holding only the non-null key properties, as used by `<remove>`
    pub fn to_key_node(&self, name: &str) -> XmlNode {
        let mut node = XmlNode::new(name);
        for &k in self.schema.key_indexes() {
            if let Some(v) = self.scalar_at(k).filter(|v| !v.is_null()) {
                let prop = &self.schema.properties()[k];
                node.attributes.push((prop.name().to_string(), prop.render(v)));
            }
        }
        node
    }

    fn scalar_has_value(&self, i: usize, parent: Option<&Element>, mode: SaveMode) -> bool {
        let state = &self.states[i];
        if state.origin == ValueOrigin::Default {
            return false;
        }
        if mode == SaveMode::Modified && state.origin == ValueOrigin::SetHere && state.modified {
            return true;
        }
        let Some(value) = self.scalar_at(i) else {
            return false;
        };
        let baseline = parent
            .filter(|p| p.states[i].origin != ValueOrigin::Default)
            .and_then(|p| p.scalar_at(i))
            .unwrap_or_else(|| self.schema.properties()[i].default());
        value != baseline
    }

    fn child_qualifies(&self, i: usize, plan: &SavePlan, mode: SaveMode) -> bool {
        if mode == SaveMode::Full {
            return plan.has_values;
        }
        self.states[i].origin != ValueOrigin::Default && plan.has_values
    }

    fn plan(&self, parent: Option<&Element>, mode: SaveMode, as_item: bool) -> SavePlan {
        let parent = parent.filter(|p| self.schema.same_type(&p.schema));
        let properties = self.schema.properties();

        let mut attributes = vec![false; properties.len()];
        let mut children = Vec::with_capacity(properties.len());
        let mut any_value = false;

        for (i, prop) in properties.iter().enumerate() {
            match self.element_at(i) {
                Some(child) => {
                    let cplan = child.plan(parent_child(parent, i), mode, false);
                    let qualifies = self.child_qualifies(i, &cplan, mode);
                    any_value |= qualifies;
                    children.push(qualifies.then_some(cplan));
                }
                None => {
                    let has = self.scalar_has_value(i, parent, mode);
                    let non_null = self.scalar_at(i).is_some_and(|v| !v.is_null());
                    attributes[i] = match mode {
                        SaveMode::Full => non_null,
                        _ => has || (as_item && prop.is_key() && non_null),
                    };
                    any_value |= if mode == SaveMode::Full { non_null } else { has };
                    children.push(None);
                }
            }
        }

        let items = self.plan_items(parent, mode);
        let item_data = items.iter().any(SavePlan::has_values)
            || self.emits_clear()
            || (!self.collection_is_basic() && !self.removed_keys().is_empty());
        let lock_data = !self.locks.is_empty() || self.lock_item;

        let has_values = match mode {
            SaveMode::Full => any_value || item_data || lock_data,
            _ => (mode == SaveMode::Modified && self.modified) || any_value || item_data || lock_data,
        };

        SavePlan {
            has_values,
            attributes,
            children,
            items,
        }
    }

    fn plan_items(&self, parent: Option<&Element>, mode: SaveMode) -> Vec<SavePlan> {
        let Some(collection) = self.schema.collection() else {
            return Vec::new();
        };
        self.items()
            .map(|item| {
                let key = item.key();
                // Items written after `<clear/>` or their own `<remove>` start from scratch.
                let pitem = parent
                    .filter(|_| !self.emits_clear() && !self.is_removed(&key))
                    .and_then(|p| {
                        p.items()
                            .find(|pi| collection.keys_match(&pi.key(), &key))
                    });
                item.plan(pitem, mode, true)
            })
            .collect()
    }

    fn collection_is_basic(&self) -> bool {
        self.schema
            .collection()
            .is_some_and(|c| c.shape().is_basic())
    }

    fn write_contents(&self, node: &mut XmlNode, plan: &SavePlan) {
        let properties = self.schema.properties();

        for (i, prop) in properties.iter().enumerate() {
            if !plan.writes_attribute(i) {
                continue;
            }
            if let Some(v) = self.scalar_at(i) {
                node.attributes.push((prop.name().to_string(), prop.render(v)));
            }
        }

        for (name, value) in self.locks.to_attributes() {
            node.attributes.push((name.to_string(), value));
        }
        if self.lock_item {
            node.attributes.push((LOCK_ITEM.to_string(), "true".to_string()));
        }

        for (i, prop) in properties.iter().enumerate() {
            let (Some(cplan), Some(child)) = (plan.child(i), self.element_at(i)) else {
                continue;
            };
            if prop.name().is_empty() {
                child.write_contents(node, cplan);
            } else if let Some(cnode) = child.to_node(prop.name(), cplan) {
                node.children.push(cnode);
            }
        }

        self.write_items(node, plan);
    }

    fn write_items(&self, node: &mut XmlNode, plan: &SavePlan) {
        let Some(collection) = self.schema.collection() else {
            return;
        };

        if collection.shape().is_basic() {
            let tag = if collection.item_tag().is_empty() {
                collection.add_tag()
            } else {
                collection.item_tag()
            };
            for (item, iplan) in self.items().zip(plan.items()) {
                if let Some(inode) = item.to_node(tag, iplan) {
                    node.children.push(inode);
                }
            }
            return;
        }

        if self.emits_clear() {
            node.children.push(XmlNode::new(collection.clear_tag()));
        }
        if let Some(store) = &self.items {
            for entry in &store.removed {
                node.children.push(entry.to_key_node(collection.remove_tag()));
            }
        }
        for (item, iplan) in self.items().zip(plan.items()) {
            if let Some(inode) = item.to_node(collection.add_tag(), iplan) {
                node.children.push(inode);
            }
        }
    }
}

fn parent_child(parent: Option<&Element>, i: usize) -> Option<&Element> {
    parent
        .filter(|p| p.states[i].origin != ValueOrigin::Default)
        .and_then(|p| p.element_at(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Result;
    use crate::registry::ElementType;
    use crate::schema::{PropertyDescriptor, PropertySchema};
    use crate::value::ValueType;

    struct Font;

    impl ElementType for Font {
        fn declare() -> Result<PropertySchema> {
            PropertySchema::builder("saveFont")
                .property(PropertyDescriptor::new("name", ValueType::String))
                .property(PropertyDescriptor::new("size", ValueType::Int).default_value(12))
                .build()
        }
    }

    #[test]
    fn test_default_origin_never_written() {
        let font = Element::of::<Font>().unwrap();
        let plan = font.prepare_save(None, SaveMode::Minimal);
        assert!(!plan.has_values());
        assert!(font.to_node("font", &plan).is_none());
    }

    #[test]
    fn test_full_writes_non_null_scalars() {
        let font = Element::of::<Font>().unwrap();
        let xml = font.serialize("font", None, SaveMode::Full).unwrap();
        assert_eq!(xml.as_deref(), Some("<font size=\"12\"/>"));
    }

    #[test]
    fn test_minimal_compares_against_parent() {
        let mut parent = Element::of::<Font>().unwrap();
        parent.set("size", 10).unwrap();

        let mut child = Element::of::<Font>().unwrap();
        child.reset(Some(&parent)).unwrap();
        assert!(!child.has_value(Some(&parent), "size", SaveMode::Minimal).unwrap());

        child.set("size", 10).unwrap();
        assert!(!child.has_value(Some(&parent), "size", SaveMode::Minimal).unwrap());
        assert!(child.has_value(Some(&parent), "size", SaveMode::Modified).unwrap());

        child.set("size", 14).unwrap();
        assert!(child.has_value(Some(&parent), "size", SaveMode::Minimal).unwrap());
    }

    #[test]
    fn test_plan_accessors() {
        let mut font = Element::of::<Font>().unwrap();
        font.set("name", "Arial").unwrap();
        let plan = font.prepare_save(None, SaveMode::Minimal);
        assert!(plan.has_values());
        assert!(plan.writes_attribute(0));
        assert!(!plan.writes_attribute(1));
        assert!(plan.child(0).is_none());
        assert!(plan.items().is_empty());
    }
}
