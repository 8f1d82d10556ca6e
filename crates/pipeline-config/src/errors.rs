//! Error types for the configuration domain.
//!
//! [`MutationError`] covers every way an insertion can be refused. All of its
//! variants are produced before the tree is touched, so a failed call always
//! leaves the caller's tree exactly as it was.
//!
//! [`TreeError`] reports declarations whose JSON shape cannot be decoded, and
//! [`IdentifierError`] / [`SettingsError`] cover the remaining invariants.

use thiserror::Error;

use crate::types::{ComponentCategory, ResourceKind};

/// Result type for mutation operations.
pub type MutationResult<T> = Result<T, MutationError>;

// ---------------------------------------------------------------------------
// Mutation errors
// ---------------------------------------------------------------------------

/// Errors that abort a single insertion.
///
/// None of these are retryable: repeating the call against the same tree and
/// the same registries produces the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// The requested type name is not registered for its category.
    #[error("{category} type '{type_name}' not recognised")]
    UnrecognisedType {
        /// Category whose registry was consulted.
        category: ComponentCategory,
        /// The offending type name, as supplied by the caller.
        type_name: String,
    },

    /// Every candidate key for a keyed mapping is already taken.
    ///
    /// Only resolvable by removing entries from the mapping (or raising the
    /// candidate bound in [`crate::MutatorSettings`]).
    #[error("no free {kind} key: all {attempts} candidates derived from '{prefix}' are taken")]
    KeySpaceExhausted {
        /// Mapping that is full.
        kind: ResourceKind,
        /// Prefix the candidates were derived from.
        prefix: String,
        /// Number of candidates tried.
        attempts: usize,
    },

    /// The default-config factory produced a payload that does not decode
    /// into a declaration of the requested category.
    #[error("default config for {category} type '{type_name}' is malformed: {reason}")]
    MalformedDefault {
        /// Category of the declaration being built.
        category: ComponentCategory,
        /// Type whose default was requested.
        type_name: String,
        /// Decoding failure.
        reason: String,
    },

    /// A slot of the tree being modified is declared as a `broker` whose
    /// payload does not decode as one.
    #[error("{category} slot is a malformed broker: {reason}")]
    MalformedSlot {
        /// Category of the slot.
        category: ComponentCategory,
        /// Decoding failure.
        reason: String,
    },
}

impl MutationError {
    pub fn unrecognised_type(category: ComponentCategory, type_name: impl Into<String>) -> Self {
        Self::UnrecognisedType {
            category,
            type_name: type_name.into(),
        }
    }

    pub fn key_space_exhausted(kind: ResourceKind, prefix: impl Into<String>, attempts: usize) -> Self {
        Self::KeySpaceExhausted {
            kind,
            prefix: prefix.into(),
            attempts,
        }
    }

    pub fn malformed_default(
        category: ComponentCategory,
        type_name: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::MalformedDefault {
            category,
            type_name: type_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed_slot(category: ComponentCategory, reason: impl std::fmt::Display) -> Self {
        Self::MalformedSlot {
            category,
            reason: reason.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tree decoding errors
// ---------------------------------------------------------------------------

/// A declaration in JSON form does not have the expected shape.
///
/// `declaration` names what was being decoded (`"input"`, `"processor"`,
/// `"condition"`, `"component"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The declaration is not a JSON object.
    #[error("expected {declaration} declaration to be an object, found {found}")]
    NotAnObject {
        declaration: &'static str,
        found: &'static str,
    },

    /// The declaration has no usable `type` field.
    #[error("{declaration} declaration is missing a non-empty string 'type' field")]
    MissingType { declaration: &'static str },

    /// A field is absent or has the wrong JSON type.
    #[error("{declaration} declaration field '{field}' is invalid: expected {expected}")]
    InvalidField {
        declaration: &'static str,
        field: String,
        expected: &'static str,
    },
}

impl TreeError {
    pub fn invalid_field(
        declaration: &'static str,
        field: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::InvalidField {
            declaration,
            field: field.into(),
            expected,
        }
    }
}

// ---------------------------------------------------------------------------
// Identifier and settings errors
// ---------------------------------------------------------------------------

/// An identifier value violates its invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("{kind} must not be empty")]
    Empty { kind: &'static str },
}

/// [`crate::MutatorSettings`] values that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("key prefix must not be empty")]
    EmptyKeyPrefix,

    #[error("key candidate count must be at least 1")]
    NoKeyCandidates,

    #[error("deferred type sentinel must not be empty (use none to disable it)")]
    EmptyDeferredType,
}
