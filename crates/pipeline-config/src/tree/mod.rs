//! In-memory model of a pipeline configuration tree.
//!
//! The tree always holds exactly one input slot and one output slot, an
//! ordered list of processors, and a manager section with two keyed resource
//! mappings:
//!
//! ```text
//! ConfigTree
//! ├── input      Endpoint<InputSlot>    Broker { inputs: [...] } | Component
//! ├── pipeline   Pipeline               processors: [Processor]
//! ├── output     Endpoint<OutputSlot>   Broker { outputs: [...] } | Component
//! └── manager    Manager                caches / rate_limits: ResourceKey -> Component
//! ```
//!
//! Declarations are encoded as JSON objects with a `type` field and the
//! type-specific payload under a key named after the type:
//!
//! ```json
//! { "type": "kafka", "kafka": { "addresses": ["localhost:9092"] } }
//! ```
//!
//! Keys the model does not interpret are kept verbatim, so decoding and
//! re-encoding a tree never drops fields.

mod component;
mod endpoint;
mod processor;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::TreeError;
use crate::identifiers::{ResourceKey, TypeName};
use crate::types::ResourceKind;

pub use component::Component;
pub use endpoint::{Broker, Endpoint, InputSlot, OutputSlot, Slot};
pub use processor::{FilterParts, Processor};

/// Field holding a declaration's type name.
pub(crate) const TYPE_FIELD: &str = "type";

// ---------------------------------------------------------------------------
// Root aggregate
// ---------------------------------------------------------------------------

/// A complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigTree {
    /// The single input slot; a broker once more than one input is present.
    pub input: Endpoint<InputSlot>,

    /// Processing steps applied between input and output.
    #[serde(default, skip_serializing_if = "Pipeline::is_implicit")]
    pub pipeline: Pipeline,

    /// The single output slot; a broker once more than one output is present.
    pub output: Endpoint<OutputSlot>,

    /// Named resources shared by components.
    #[serde(default)]
    pub manager: Manager,

    /// Top-level sections this model does not interpret (logger, metrics, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConfigTree {
    /// Creates a tree with the given endpoints and empty pipeline and manager.
    ///
    /// A `broker` component becomes a [`Broker`], so it fails if its payload
    /// does not decode as one.
    pub fn new(input: Component, output: Component) -> Result<Self, TreeError> {
        Ok(Self {
            input: Endpoint::try_from(input)?,
            pipeline: Pipeline::default(),
            output: Endpoint::try_from(output)?,
            manager: Manager::default(),
            extra: Map::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// The ordered processor chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pipeline {
    /// Number of parallel processing threads.
    pub threads: i64,

    /// Processors in execution order.
    pub processors: Vec<Processor>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// `true` when the section was present in the decoded tree.
    #[serde(skip, default = "declared")]
    declared: bool,
}

fn declared() -> bool {
    true
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            threads: 1,
            processors: Vec::new(),
            extra: Map::new(),
            declared: false,
        }
    }
}

impl Pipeline {
    /// A section that was never declared and has nothing in it. Such a
    /// pipeline is left out when the tree is encoded.
    fn is_implicit(&self) -> bool {
        !self.declared && self.processors.is_empty() && self.threads == 1 && self.extra.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Keyed resources, addressable by name from other components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manager {
    pub caches: BTreeMap<ResourceKey, Component>,
    pub rate_limits: BTreeMap<ResourceKey, Component>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manager {
    /// Returns the mapping selected by `kind`.
    pub fn resources(&self, kind: ResourceKind) -> &BTreeMap<ResourceKey, Component> {
        match kind {
            ResourceKind::Cache => &self.caches,
            ResourceKind::RateLimit => &self.rate_limits,
        }
    }

    /// Returns the mapping selected by `kind`, mutably.
    pub fn resources_mut(&mut self, kind: ResourceKind) -> &mut BTreeMap<ResourceKey, Component> {
        match kind {
            ResourceKind::Cache => &mut self.caches,
            ResourceKind::RateLimit => &mut self.rate_limits,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared decoding helpers
// ---------------------------------------------------------------------------

/// Names the JSON type of `value` for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub(crate) fn into_object(
    declaration: &'static str,
    value: Value,
) -> Result<Map<String, Value>, TreeError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(TreeError::NotAnObject {
            declaration,
            found: json_kind(&other),
        }),
    }
}

/// Removes and validates the `type` field.
pub(crate) fn take_type(
    declaration: &'static str,
    fields: &mut Map<String, Value>,
) -> Result<TypeName, TreeError> {
    match fields.remove(TYPE_FIELD) {
        Some(Value::String(name)) => {
            TypeName::new(name).ok_or(TreeError::MissingType { declaration })
        }
        _ => Err(TreeError::MissingType { declaration }),
    }
}

/// Builds the `{"type": name, name: payload}` form of a fresh declaration.
pub(crate) fn declaration_value(type_name: &TypeName, payload: Value) -> Value {
    let mut fields = Map::new();
    fields.insert(TYPE_FIELD.to_string(), Value::String(type_name.to_string()));
    fields.insert(type_name.to_string(), payload);
    Value::Object(fields)
}
