//! Key-set diffing between two property maps

use indexmap::IndexMap;
use serde::Serialize;
use std::hash::Hash;

/// Three-way partition of the key sets of two maps
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeySetDiff<K = String> {
    /// Keys present only in the first map, in its iteration order
    pub only_in_first: Vec<K>,

    /// Keys present only in the second map, in its iteration order
    pub only_in_second: Vec<K>,

    /// Keys present in both maps, in the first map's iteration order
    pub in_both: Vec<K>,
}

impl<K> Default for KeySetDiff<K> {
    fn default() -> Self {
        Self {
            only_in_first: Vec::new(),
            only_in_second: Vec::new(),
            in_both: Vec::new(),
        }
    }
}

impl<K> KeySetDiff<K> {
    /// True when neither side has keys the other lacks
    pub fn is_identical(&self) -> bool {
        self.only_in_first.is_empty() && self.only_in_second.is_empty()
    }
}

/// Partition the keys of `first` and `second`.
///
/// Values are ignored. No sorting is applied.
pub fn diff_keys<K, V, W>(first: &IndexMap<K, V>, second: &IndexMap<K, W>) -> KeySetDiff<K>
where
    K: Hash + Eq + Clone,
{
    let mut diff = KeySetDiff::default();

    for key in first.keys() {
        if second.contains_key(key) {
            diff.in_both.push(key.clone());
        } else {
            diff.only_in_first.push(key.clone());
        }
    }

    diff.only_in_second = second
        .keys()
        .filter(|key| !first.contains_key(*key))
        .cloned()
        .collect();

    diff
}
