//! Pipeline configuration trees and the engine that grows them.
//!
//! This crate models an already-decoded pipeline configuration (one input, one
//! output, a processor pipeline, keyed caches and rate limits) and inserts new
//! default-initialised components into it while keeping the tree's structural
//! invariants:
//!
//! - a second input or output turns its slot into a `broker` that keeps the
//!   original endpoint first;
//! - caches and rate limits get a unique, readable key (`example`,
//!   `example1`, ...), failing closed when the key space is used up.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! Which component types exist and what their defaults look like is supplied
//! through the traits in [`ports`]; the `components` crate provides the
//! built-in catalogue.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`TypeName`, `ResourceKey`) |
//! | [`types`] | Value types (`ComponentCategory`, `ResourceKind`, `BrokerPattern`) |
//! | [`tree`] | The configuration tree and its JSON encoding |
//! | [`ports`] | `TypeRegistry`, `Catalog`, `DefaultConfigFactory` |
//! | [`settings`] | `MutatorSettings` |
//! | [`mutation`] | The `Mutator` and its insertion strategies |
//! | [`errors`] | Error types |
//!
//! ## Usage
//!
//! ```ignore
//! let mutator = Mutator::new(&catalog, &catalog);
//! mutator.add_output("kafka", &mut tree)?;   // output becomes a broker
//! mutator.add_cache("memory", &mut tree)?;   // stored as manager.caches.example
//! ```

pub mod errors;
pub mod identifiers;
pub mod mutation;
pub mod ports;
pub mod settings;
pub mod tree;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{IdentifierError, MutationError, MutationResult, SettingsError, TreeError};
pub use identifiers::{ResourceKey, TypeName};
pub use mutation::{candidate_key, first_free_key, InsertOutcome, Mutator};
pub use ports::{Catalog, DefaultConfigFactory, TypeRegistry};
pub use settings::MutatorSettings;
pub use tree::{
    Broker, Component, ConfigTree, Endpoint, FilterParts, InputSlot, Manager, OutputSlot,
    Pipeline, Processor, Slot,
};
pub use types::{BrokerPattern, ComponentCategory, ResourceKind, BROKER_TYPE, FILTER_PARTS_TYPE};
