//! Effective values with provenance
//!
//! Renders an element tree as JSON, one entry per property with its current
//! value and where it came from. Sensitive properties are redacted.

use serde::Serialize;
use serde_json::{Map, Value as Json};

use layerconf_core_types::REDACTED;

use crate::element::Element;
use crate::value::ValueOrigin;

/// One property of the effective view
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveProperty {
    pub value: Json,
    pub origin: ValueOrigin,
}

impl Element {
    /// Effective view of this element tree
    ///
    /// ```json
    /// {"type": "font", "properties": {"size": {"value": 12, "origin": "default"}}, "items": []}
    /// ```
    pub fn to_effective_json(&self) -> Json {
        let mut properties = Map::new();
        for (i, prop) in self.schema.properties().iter().enumerate() {
            let origin = self.states[i].origin;
            let value = match (self.element_at(i), self.scalar_at(i)) {
                (Some(child), _) => child.to_effective_json(),
                (None, Some(v)) if prop.is_sensitive() && !v.is_null() => {
                    Json::String(REDACTED.to_string())
                }
                (None, Some(v)) => v.to_json(),
                (None, None) => Json::Null,
            };
            let entry = EffectiveProperty { value, origin };
            properties.insert(
                prop.name().to_string(),
                serde_json::to_value(entry).unwrap_or(Json::Null),
            );
        }

        let mut out = Map::new();
        out.insert("type".to_string(), Json::String(self.type_name().to_string()));
        out.insert("properties".to_string(), Json::Object(properties));
        if self.is_collection() {
            out.insert(
                "items".to_string(),
                Json::Array(self.items().map(Element::to_effective_json).collect()),
            );
        }
        Json::Object(out)
    }
}
