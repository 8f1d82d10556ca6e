//! Newtype identifiers used inside a configuration tree.
//!
//! Component type names and resource keys are both plain strings on disk, but
//! they are never interchangeable: a [`TypeName`] selects a component
//! implementation, a [`ResourceKey`] names one entry of a keyed mapping
//! (caches, rate limits). Both are non-empty by construction, including when
//! they are deserialised from a stored tree.

use serde::{Deserialize, Serialize};

use crate::errors::IdentifierError;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display,
// TryFrom<String> (used by serde so empty values are rejected on load).
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value).ok_or(IdentifierError::Empty {
                    kind: stringify!($name),
                })
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// The registered name of a component implementation (e.g. `"kafka"`,
    /// `"stdout"`, `"memory"`).
    ///
    /// Registries decide which names are valid per category; this type only
    /// guarantees the name is non-empty.
    TypeName
}

string_id! {
    /// A user-visible key in a keyed resource mapping (`manager.caches`,
    /// `manager.rate_limits`).
    ///
    /// Keys are unique within their mapping; uniqueness is upheld by the
    /// mapping itself (a `BTreeMap`) and by the key assignment in
    /// [`crate::mutation`].
    ResourceKey
}
