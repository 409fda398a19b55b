//! Process-wide schema registry
//!
//! Each element type declares its schema once through [`ElementType`];
//! [`schema_of`] builds it on first use and hands out the same `Arc` from
//! then on. Declarations are built outside the lock and published with
//! first-writer-wins, so a racing thread may build a schema that is then
//! dropped, but no thread ever sees a partially built one.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::errors::Result;
use crate::schema::PropertySchema;

/// An element type with a static schema declaration
pub trait ElementType: 'static {
    /// Build this type's schema
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` when the declaration is malformed.
    fn declare() -> Result<PropertySchema>;
}

type SchemaMap = HashMap<TypeId, Arc<PropertySchema>>;

static REGISTRY: OnceLock<RwLock<SchemaMap>> = OnceLock::new();

fn registry() -> &'static RwLock<SchemaMap> {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Memoized schema of `T`
///
/// # Errors
///
/// Returns the declaration's `SchemaError`. Failures are not cached; the
/// next lookup declares again.
pub fn schema_of<T: ElementType>() -> Result<Arc<PropertySchema>> {
    let id = TypeId::of::<T>();

    if let Some(schema) = registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
    {
        return Ok(Arc::clone(schema));
    }

    let built = Arc::new(T::declare()?);
    tracing::debug!(
        element_type = built.type_name(),
        properties = built.properties().len(),
        "Declared element schema"
    );

    let mut map = registry().write().unwrap_or_else(PoisonError::into_inner);
    Ok(Arc::clone(map.entry(id).or_insert(built)))
}
