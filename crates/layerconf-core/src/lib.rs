//! layerconf core - layered, schema-driven XML configuration elements
//!
//! This crate provides the element model behind layered configuration files:
//! - Property schemas declared per element type and memoized in a registry
//! - Elements that track where each value came from (default, inherited,
//!   declared here) across machine, application and location layers
//! - Keyed collections with `<add>`/`<remove>`/`<clear>` and basic shapes
//! - Attribute and element locking between layers
//! - Unmerge and save planning for `Full`, `Modified` and `Minimal` writes

pub mod collection;
pub mod convert;
pub mod effective;
pub mod element;
pub mod errors;
pub mod locks;
pub mod logging_facility;
pub mod registry;
pub mod save;
pub mod schema;
pub mod section;
pub mod validate;
pub mod value;
pub mod xml;

// Re-export commonly used types
pub use collection::ElementKey;
pub use convert::{Converter, ScalarConverter};
pub use element::Element;
pub use errors::{ConfigError, ErrorKind, Location, Result};
pub use locks::{LockSet, Locks};
pub use registry::{schema_of, ElementType};
pub use save::SavePlan;
pub use schema::{
    CollectionDescriptor, CollectionShape, ElementHooks, PropertyDescriptor, PropertySchema,
};
pub use section::{LayeredSection, PreparedSave};
pub use validate::{CallbackValidator, IntegerValidator, StringValidator, Validator};
pub use value::{SaveMode, Value, ValueOrigin, ValueType};
pub use xml::XmlNode;
