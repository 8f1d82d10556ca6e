//! The mutator: inserts new default-initialised components into an existing
//! configuration tree.
//!
//! The mutator delegates to one module per insertion strategy:
//! - `endpoint` - inputs and outputs, with broker promotion
//! - `pipeline` - processors, and conditions wrapped in `filter_parts`
//! - `keyed` - caches and rate limits under a generated key
//!
//! Every entry point validates the type name and prepares everything it needs
//! (default payload, free key) before touching the tree. A call that returns
//! an error has not modified the tree.

mod endpoint;
mod keyed;
mod pipeline;

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{MutationError, MutationResult, SettingsError};
use crate::identifiers::{ResourceKey, TypeName};
use crate::ports::{Catalog, DefaultConfigFactory};
use crate::settings::MutatorSettings;
use crate::tree::{Component, ConfigTree, Endpoint, FilterParts, InputSlot, Manager, OutputSlot, Processor};
use crate::types::{ComponentCategory, ResourceKind};

pub use keyed::{candidate_key, first_free_key};

/// What an insertion did to the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The slot was promoted to a broker wrapping its previous endpoint.
    ///
    /// `appended` is the broker position of the new endpoint, or `None` when
    /// the requested type was itself `broker` and nothing was nested.
    Promoted { appended: Option<usize> },

    /// The new declaration was appended to an existing broker or to the
    /// pipeline, at `position`.
    Appended { position: usize },

    /// The new declaration was stored in a keyed mapping under `key`.
    Keyed { kind: ResourceKind, key: ResourceKey },
}

impl std::fmt::Display for InsertOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsertOutcome::Promoted { appended: Some(position) } => {
                write!(f, "promoted to broker, added at position {position}")
            }
            InsertOutcome::Promoted { appended: None } => f.write_str("promoted to broker"),
            InsertOutcome::Appended { position } => write!(f, "added at position {position}"),
            InsertOutcome::Keyed { kind, key } => write!(f, "added {kind} '{key}'"),
        }
    }
}

/// Inserts components into configuration trees.
///
/// Holds only its collaborators and settings; the tree is passed to every
/// call and is the only thing ever modified.
pub struct Mutator<'a> {
    catalog: &'a dyn Catalog,
    factory: &'a dyn DefaultConfigFactory,
    settings: MutatorSettings,
}

impl<'a> Mutator<'a> {
    /// Creates a mutator with default settings.
    pub fn new(catalog: &'a dyn Catalog, factory: &'a dyn DefaultConfigFactory) -> Self {
        Self {
            catalog,
            factory,
            settings: MutatorSettings::default(),
        }
    }

    /// Creates a mutator with custom settings, rejecting unusable ones.
    pub fn with_settings(
        catalog: &'a dyn Catalog,
        factory: &'a dyn DefaultConfigFactory,
        settings: MutatorSettings,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            catalog,
            factory,
            settings,
        })
    }

    /// The settings this mutator validates and names components with.
    pub fn settings(&self) -> &MutatorSettings {
        &self.settings
    }

    /// Dispatches to the entry point for `category`.
    pub fn add(
        &self,
        category: ComponentCategory,
        type_name: &str,
        tree: &mut ConfigTree,
    ) -> MutationResult<InsertOutcome> {
        match category {
            ComponentCategory::Input => self.add_input(type_name, tree),
            ComponentCategory::Output => self.add_output(type_name, tree),
            ComponentCategory::Processor => self.add_processor(type_name, tree),
            ComponentCategory::Condition => self.add_condition(type_name, tree),
            ComponentCategory::Cache => self.add_cache(type_name, tree),
            ComponentCategory::RateLimit => self.add_rate_limit(type_name, tree),
        }
    }

    /// Adds a default input of `type_name`, promoting the input to a broker
    /// if it is not one already.
    pub fn add_input(&self, type_name: &str, tree: &mut ConfigTree) -> MutationResult<InsertOutcome> {
        let category = ComponentCategory::Input;
        let type_name = self.validate(category, type_name, true)?;
        let endpoint = Endpoint::<InputSlot>::from_default(&type_name, self.default_payload(category, &type_name))
            .map_err(|e| MutationError::malformed_default(category, type_name.as_str(), e))?;
        tree.input.normalize().map_err(|e| MutationError::malformed_slot(category, e))?;

        let outcome = endpoint::insert_endpoint(&mut tree.input, endpoint);
        self.log_inserted(category, &type_name, &outcome);
        Ok(outcome)
    }

    /// Adds a default output of `type_name`, promoting the output to a broker
    /// if it is not one already.
    pub fn add_output(&self, type_name: &str, tree: &mut ConfigTree) -> MutationResult<InsertOutcome> {
        let category = ComponentCategory::Output;
        let type_name = self.validate(category, type_name, true)?;
        let endpoint = Endpoint::<OutputSlot>::from_default(&type_name, self.default_payload(category, &type_name))
            .map_err(|e| MutationError::malformed_default(category, type_name.as_str(), e))?;
        tree.output.normalize().map_err(|e| MutationError::malformed_slot(category, e))?;

        let outcome = endpoint::insert_endpoint(&mut tree.output, endpoint);
        self.log_inserted(category, &type_name, &outcome);
        Ok(outcome)
    }

    /// Appends a default processor of `type_name` to the pipeline.
    pub fn add_processor(&self, type_name: &str, tree: &mut ConfigTree) -> MutationResult<InsertOutcome> {
        let category = ComponentCategory::Processor;
        let type_name = self.validate(category, type_name, false)?;
        let processor = Processor::from_default(&type_name, self.default_payload(category, &type_name))
            .map_err(|e| MutationError::malformed_default(category, type_name.as_str(), e))?;

        let outcome = pipeline::append_processor(&mut tree.pipeline, processor);
        self.log_inserted(category, &type_name, &outcome);
        Ok(outcome)
    }

    /// Appends a `filter_parts` processor hosting a default condition of
    /// `type_name`.
    pub fn add_condition(&self, type_name: &str, tree: &mut ConfigTree) -> MutationResult<InsertOutcome> {
        let category = ComponentCategory::Condition;
        let type_name = self.validate(category, type_name, false)?;
        let condition = Component::new(type_name.clone(), self.default_payload(category, &type_name));
        let processor = Processor::FilterParts(FilterParts::new(condition));

        let outcome = pipeline::append_processor(&mut tree.pipeline, processor);
        self.log_inserted(category, &type_name, &outcome);
        Ok(outcome)
    }

    /// Adds a default cache of `type_name` under a generated key.
    pub fn add_cache(&self, type_name: &str, tree: &mut ConfigTree) -> MutationResult<InsertOutcome> {
        self.add_keyed(ResourceKind::Cache, type_name, tree)
    }

    /// Adds a default rate limit of `type_name` under a generated key.
    pub fn add_rate_limit(&self, type_name: &str, tree: &mut ConfigTree) -> MutationResult<InsertOutcome> {
        self.add_keyed(ResourceKind::RateLimit, type_name, tree)
    }

    /// Returns the key the next insertion of `kind` would use.
    pub fn next_resource_key(&self, kind: ResourceKind, manager: &Manager) -> MutationResult<ResourceKey> {
        let prefix = &self.settings.key_prefix;
        let candidates = self.settings.key_candidates;
        first_free_key(manager.resources(kind), prefix, candidates)
            .ok_or_else(|| MutationError::key_space_exhausted(kind, prefix.as_str(), candidates))
    }

    fn add_keyed(
        &self,
        kind: ResourceKind,
        type_name: &str,
        tree: &mut ConfigTree,
    ) -> MutationResult<InsertOutcome> {
        let category = kind.category();
        let type_name = self.validate(category, type_name, false)?;
        let key = self.next_resource_key(kind, &tree.manager)?;
        let component = Component::new(type_name.clone(), self.default_payload(category, &type_name));

        tree.manager.resources_mut(kind).insert(key.clone(), component);
        let outcome = InsertOutcome::Keyed { kind, key };
        self.log_inserted(category, &type_name, &outcome);
        Ok(outcome)
    }

    /// Checks `type_name` against the category registry. Inputs and outputs
    /// also accept the deferred-validation sentinel.
    fn validate(
        &self,
        category: ComponentCategory,
        type_name: &str,
        allow_deferred: bool,
    ) -> MutationResult<TypeName> {
        if allow_deferred && self.settings.is_deferred(type_name) {
            warn!(%category, type_name, "accepting type without registry validation");
        } else if !self.catalog.is_registered(category, type_name) {
            return Err(MutationError::unrecognised_type(category, type_name));
        }
        TypeName::new(type_name).ok_or_else(|| MutationError::unrecognised_type(category, type_name))
    }

    fn default_payload(&self, category: ComponentCategory, type_name: &TypeName) -> Value {
        self.factory.build_default(category, type_name)
    }

    fn log_inserted(&self, category: ComponentCategory, type_name: &TypeName, outcome: &InsertOutcome) {
        if matches!(outcome, InsertOutcome::Promoted { .. }) {
            debug!(%category, "promoted slot to broker");
        }
        debug!(%category, %type_name, %outcome, "inserted component");
    }
}
