//! Layered configuration sections
//!
//! A section is one named root element read from a stack of sources
//! (machine, application, location, ...). Each layer's element starts as a
//! copy of the layer above it and is then overlaid with that layer's XML.
//! Saving a layer unmerges it against the layer above so only what belongs
//! to it is written back.

use std::sync::Arc;
use std::time::Instant;

use crate::element::Element;
use crate::errors::{ConfigError, Result};
use crate::registry::{schema_of, ElementType};
use crate::save::SavePlan;
use crate::schema::PropertySchema;
use crate::value::SaveMode;
use crate::xml::XmlNode;
use crate::{log_op_end, log_op_error, log_op_start};

/// A named section read from an ordered stack of layers
#[derive(Debug)]
pub struct LayeredSection {
    name: String,
    schema: Arc<PropertySchema>,
    layers: Vec<(String, Element)>,
}

impl LayeredSection {
    pub fn new(name: impl Into<String>, schema: Arc<PropertySchema>) -> Self {
        Self {
            name: name.into(),
            schema,
            layers: Vec::new(),
        }
    }

    /// Section whose root element is of registered type `T`
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if the type's schema fails to build.
    pub fn of<T: ElementType>(name: impl Into<String>) -> Result<Self> {
        Ok(Self::new(name, schema_of::<T>()?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layer(&self, index: usize) -> Option<&Element> {
        self.layers.get(index).map(|(_, e)| e)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.layers.get_mut(index).map(|(_, e)| e)
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.layers.get(index).map(|(l, _)| l.as_str())
    }

    /// Element of the last layer, i.e. the merged view
    pub fn effective(&self) -> Option<&Element> {
        self.layers.last().map(|(_, e)| e)
    }

    /// Add a layer below the current ones
    ///
    /// `xml` is the layer's source for this section, or `None` when the
    /// layer does not mention the section. Returns the new layer's index.
    ///
    /// # Errors
    ///
    /// Returns `XmlSyntax` for malformed XML, `UnrecognizedElement` when the
    /// root element is not named after the section, and any deserialization
    /// error of the layer's content.
    pub fn push_layer(&mut self, label: impl Into<String>, xml: Option<&str>) -> Result<usize> {
        let label = label.into();
        log_op_start!(
            "push_layer",
            section = self.name.as_str(),
            layer = label.as_str(),
            has_source = xml.is_some()
        );
        let start = Instant::now();

        let element = self.build_layer(xml).map_err(|e| {
            log_op_error!(
                "push_layer",
                e,
                duration_ms = start.elapsed().as_millis() as u64,
                section = self.name.as_str(),
                layer = label.as_str()
            );
            e
        })?;

        self.layers.push((label, element));
        let index = self.layers.len() - 1;
        log_op_end!(
            "push_layer",
            duration_ms = start.elapsed().as_millis() as u64,
            section = self.name.as_str(),
            layer_index = index
        );
        Ok(index)
    }

    fn build_layer(&self, xml: Option<&str>) -> Result<Element> {
        let mut element = Element::new(Arc::clone(&self.schema))?;
        element.reset(self.effective())?;

        if let Some(source) = xml {
            let root = XmlNode::parse(source)?;
            if root.name != self.name {
                return Err(ConfigError::UnrecognizedElement {
                    name: root.name,
                    location: root.location,
                });
            }
            element.deserialize(&root, false)?;
        }
        Ok(element)
    }

    /// Compute what layer `index` has to write under `mode`
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` for a missing layer and `TypeMismatch` if
    /// the layers disagree on their element type.
    pub fn prepare_save(&self, index: usize, mode: SaveMode) -> Result<PreparedSave> {
        log_op_start!(
            "prepare_save",
            section = self.name.as_str(),
            layer_index = index,
            mode = mode.as_str()
        );
        let start = Instant::now();

        let prepared = self.unmerge_layer(index, mode).map_err(|e| {
            log_op_error!(
                "prepare_save",
                e,
                duration_ms = start.elapsed().as_millis() as u64,
                section = self.name.as_str()
            );
            e
        })?;

        log_op_end!(
            "prepare_save",
            duration_ms = start.elapsed().as_millis() as u64,
            section = self.name.as_str(),
            has_values = prepared.has_values()
        );
        Ok(prepared)
    }

    fn unmerge_layer(&self, index: usize, mode: SaveMode) -> Result<PreparedSave> {
        let (_, source) = self.layers.get(index).ok_or(ConfigError::IndexOutOfRange {
            index,
            len: self.layers.len(),
        })?;
        let parent = index
            .checked_sub(1)
            .and_then(|i| self.layers.get(i))
            .map(|(_, e)| e);

        let mut unmerged = Element::new(Arc::clone(&self.schema))?;
        unmerged.unmerge(source, parent, mode)?;
        let plan = unmerged.prepare_save(parent, mode);

        Ok(PreparedSave {
            section: self.name.clone(),
            unmerged,
            plan,
        })
    }

    /// Clear modification tracking on layer `index` after it was written
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` for a missing layer.
    pub fn mark_saved(&mut self, index: usize) -> Result<()> {
        let len = self.layers.len();
        let (_, element) = self
            .layers
            .get_mut(index)
            .ok_or(ConfigError::IndexOutOfRange { index, len })?;
        element.reset_modified();
        Ok(())
    }
}

/// Unmerged layer content together with its save plan
#[derive(Debug, Clone)]
pub struct PreparedSave {
    section: String,
    unmerged: Element,
    plan: SavePlan,
}

impl PreparedSave {
    /// Whether the destination needs to be written at all
    pub fn has_values(&self) -> bool {
        self.plan.has_values()
    }

    pub fn plan(&self) -> &SavePlan {
        &self.plan
    }

    pub fn element(&self) -> &Element {
        &self.unmerged
    }

    pub fn to_node(&self) -> Option<XmlNode> {
        self.unmerged.to_node(&self.section, &self.plan)
    }

    /// Write the section, or `None` when there is nothing to write
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the XML writer fails.
    pub fn to_xml(&self) -> Result<Option<String>> {
        self.to_node().map(|n| n.to_xml()).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PropertyDescriptor;
    use crate::value::{Value, ValueType};

    struct AppSettings;

    impl ElementType for AppSettings {
        fn declare() -> Result<PropertySchema> {
            PropertySchema::builder("appSettings")
                .property(PropertyDescriptor::new("mode", ValueType::String).default_value("debug"))
                .property(PropertyDescriptor::new("retries", ValueType::Int).default_value(3))
                .build()
        }
    }

    #[test]
    fn test_layers_inherit() {
        let mut section = LayeredSection::of::<AppSettings>("appSettings").unwrap();
        section
            .push_layer("machine", Some("<appSettings mode=\"release\"/>"))
            .unwrap();
        section.push_layer("app", None).unwrap();

        let app = section.effective().unwrap();
        assert_eq!(app.get("mode").unwrap(), &Value::from("release"));
        assert_eq!(section.label(1), Some("app"));
        assert_eq!(section.len(), 2);
    }

    #[test]
    fn test_root_name_must_match() {
        let mut section = LayeredSection::of::<AppSettings>("appSettings").unwrap();
        let err = section
            .push_layer("machine", Some("<other/>"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnrecognizedElement { .. }));
        assert!(section.is_empty());
    }

    #[test]
    fn test_untouched_layer_has_nothing_to_save() {
        let mut section = LayeredSection::of::<AppSettings>("appSettings").unwrap();
        section
            .push_layer("machine", Some("<appSettings retries=\"5\"/>"))
            .unwrap();
        section.push_layer("app", None).unwrap();

        let prepared = section.prepare_save(1, SaveMode::Minimal).unwrap();
        assert!(!prepared.has_values());
        assert_eq!(prepared.to_xml().unwrap(), None);
    }

    #[test]
    fn test_prepare_save_out_of_range() {
        let section = LayeredSection::of::<AppSettings>("appSettings").unwrap();
        assert!(matches!(
            section.prepare_save(0, SaveMode::Full),
            Err(ConfigError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_mark_saved_clears_modified() {
        let mut section = LayeredSection::of::<AppSettings>("appSettings").unwrap();
        section.push_layer("machine", None).unwrap();
        section.layer_mut(0).unwrap().set("retries", 9).unwrap();
        assert!(section.layer(0).unwrap().is_modified());
        section.mark_saved(0).unwrap();
        assert!(!section.layer(0).unwrap().is_modified());
    }
}
