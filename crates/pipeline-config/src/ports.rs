//! Port traits for the collaborators the mutator depends on.
//!
//! The mutator never decides on its own which component types exist or what
//! their defaults look like. Both questions are answered by injected
//! implementations of the traits below; the `components` crate supplies the
//! built-in catalogue, tests supply small fakes.

use std::collections::{BTreeSet, HashSet};
use std::hash::BuildHasher;

use serde_json::Value;

use crate::identifiers::TypeName;
use crate::types::ComponentCategory;

/// Answers whether a type name is registered within one component category.
pub trait TypeRegistry {
    /// Returns `true` if `type_name` names a registered component type.
    fn contains(&self, type_name: &str) -> bool;
}

impl TypeRegistry for BTreeSet<String> {
    fn contains(&self, type_name: &str) -> bool {
        BTreeSet::contains(self, type_name)
    }
}

impl<S: BuildHasher> TypeRegistry for HashSet<String, S> {
    fn contains(&self, type_name: &str) -> bool {
        HashSet::contains(self, type_name)
    }
}

/// One [`TypeRegistry`] per [`ComponentCategory`].
pub trait Catalog {
    /// Returns the registry for `category`.
    fn registry(&self, category: ComponentCategory) -> &dyn TypeRegistry;

    /// Convenience: checks `type_name` against the registry for `category`.
    fn is_registered(&self, category: ComponentCategory, type_name: &str) -> bool {
        self.registry(category).contains(type_name)
    }
}

/// Produces the default configuration payload for a component type.
///
/// The returned value is the type-specific payload only, i.e. the object that
/// sits under the type's own key in a declaration
/// (`{"type": "kafka", "kafka": <payload>}`). Two types have structured
/// payloads the mutator decodes:
///
/// - `broker` (inputs and outputs): broker settings, optionally with an empty
///   `inputs` / `outputs` array.
/// - `filter_parts` (processors): a complete condition declaration.
///
/// Implementations must be side-effect free. They are only called for type
/// names that passed registry validation, or for the deferred-validation
/// sentinel.
pub trait DefaultConfigFactory {
    /// Builds the default payload for `type_name` within `category`.
    fn build_default(&self, category: ComponentCategory, type_name: &TypeName) -> Value;
}
