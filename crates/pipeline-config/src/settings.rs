//! Tunables for the mutator.

use serde::{Deserialize, Serialize};

use crate::errors::SettingsError;

/// Type name that bypasses input/output registry validation unless configured
/// otherwise. Used by external editors that validate components themselves.
pub const DEFAULT_DEFERRED_TYPE: &str = "benthos_lab";

/// Prefix of generated resource keys.
pub const DEFAULT_KEY_PREFIX: &str = "example";

/// Number of generated key candidates: the bare prefix plus suffixes 1..=9999.
pub const DEFAULT_KEY_CANDIDATES: usize = 10_000;

/// Settings that shape how the mutator validates and names new components.
///
/// Every field has a default, so an empty JSON object (or
/// `MutatorSettings::default()`) yields the standard behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutatorSettings {
    /// Input/output type name accepted without registry validation.
    /// `None` disables the pass-through.
    pub deferred_type: Option<String>,

    /// Prefix of generated cache / rate limit keys.
    pub key_prefix: String,

    /// How many key candidates to try before giving up.
    pub key_candidates: usize,
}

impl Default for MutatorSettings {
    fn default() -> Self {
        Self {
            deferred_type: Some(DEFAULT_DEFERRED_TYPE.to_string()),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            key_candidates: DEFAULT_KEY_CANDIDATES,
        }
    }
}

impl MutatorSettings {
    /// Checks the settings can produce non-empty keys and a usable sentinel.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.key_prefix.is_empty() {
            return Err(SettingsError::EmptyKeyPrefix);
        }
        if self.key_candidates == 0 {
            return Err(SettingsError::NoKeyCandidates);
        }
        if matches!(self.deferred_type.as_deref(), Some("")) {
            return Err(SettingsError::EmptyDeferredType);
        }
        Ok(())
    }

    /// Returns `true` if `type_name` is the deferred-validation sentinel.
    pub fn is_deferred(&self, type_name: &str) -> bool {
        self.deferred_type.as_deref() == Some(type_name)
    }
}
