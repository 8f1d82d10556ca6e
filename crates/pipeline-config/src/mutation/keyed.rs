//! Key assignment for keyed resource mappings.
//!
//! Candidates are tried in a fixed order: `prefix`, `prefix1`, `prefix2`, ...
//! The first one missing from the mapping wins. Nothing is remembered between
//! calls, so keys added or removed by other means are always accounted for.

use std::collections::BTreeMap;

use crate::identifiers::ResourceKey;

/// Returns the `index`-th candidate key for `prefix`.
pub fn candidate_key(prefix: &str, index: usize) -> String {
    if index == 0 {
        prefix.to_string()
    } else {
        format!("{prefix}{index}")
    }
}

/// Returns the first of `candidates` keys not present in `mapping`.
///
/// `None` means every candidate is taken (or `prefix` is empty, which yields
/// no valid key for index 0).
pub fn first_free_key<V>(
    mapping: &BTreeMap<ResourceKey, V>,
    prefix: &str,
    candidates: usize,
) -> Option<ResourceKey> {
    (0..candidates)
        .filter_map(|index| ResourceKey::new(candidate_key(prefix, index)))
        .find(|key| !mapping.contains_key(key))
}
