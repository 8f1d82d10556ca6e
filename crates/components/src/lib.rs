//! Built-in component catalogue.
//!
//! Implements the [`pipeline_config::Catalog`] and
//! [`pipeline_config::DefaultConfigFactory`] ports with a fixed set of
//! component types per category and their default settings.
//!
//! ## Architectural Layer
//!
//! **Infrastructure adapter.** The domain crate sees only the port traits;
//! which types exist, and what a fresh one looks like, is decided here.

mod defaults;
mod registry;

use pipeline_config::{Catalog, ComponentCategory, DefaultConfigFactory, TypeName, TypeRegistry};
use serde_json::Value;

pub use defaults::{default_payload, DEFAULT_CONDITION_TYPE};
pub use registry::{registry_for, StaticRegistry};

/// The built-in set of component types.
///
/// Serves as both the type registry and the default-config factory, so one
/// value can be handed to [`pipeline_config::Mutator::new`] twice.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl BuiltinCatalog {
    pub fn new() -> Self {
        Self
    }

    /// Registered type names for `category`.
    pub fn names(&self, category: ComponentCategory) -> &'static [&'static str] {
        registry_for(category).names()
    }
}

impl Catalog for BuiltinCatalog {
    fn registry(&self, category: ComponentCategory) -> &dyn TypeRegistry {
        registry_for(category)
    }
}

impl DefaultConfigFactory for BuiltinCatalog {
    fn build_default(&self, category: ComponentCategory, type_name: &TypeName) -> Value {
        defaults::build(category, type_name)
    }
}
