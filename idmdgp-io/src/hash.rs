//! Replaces the original source's `dmdgp_hash_*` grouping helper (a
//! hand-rolled hash table keyed on short strings) with an ordered
//! `BTreeMap`: groups members by key and iterates in sorted-key order,
//! giving the writer a deterministic, alphabetized grouping instead of
//! hash-bucket order.

use std::collections::BTreeMap;

/// Groups `(key, member)` pairs by key, preserving each group's
/// members in insertion order and iterating groups in sorted-key
/// order.
pub fn group_by<K: Ord + Clone, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Vec<(K, Vec<V>)> {
    let mut map: BTreeMap<K, Vec<V>> = BTreeMap::new();
    for (key, value) in pairs {
        map.entry(key).or_default().push(value);
    }
    map.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_and_sorts_by_key() {
        let grouped = group_by(vec![("CA", 2), ("N", 1), ("CA", 5)]);
        assert_eq!(grouped, vec![("CA", vec![2, 5]), ("N", vec![1])]);
    }
}
