//! Partial updates for stored records.
//!
//! [`BalancedIndex::update`](crate::index::BalancedIndex::update) merges a
//! patch into the record already stored under a key, in contrast to
//! [`BalancedIndex::insert`](crate::index::BalancedIndex::insert) which
//! replaces the whole record. A patch names the fields to overwrite; every
//! field it does not mention keeps its current value.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// A set of field changes that can be merged into a `T`.
pub trait Patch<T> {
    /// Overwrite the fields of `target` named by this patch.
    fn apply(self, target: &mut T);
}

/// Field-map merge: entries in the patch overwrite same-named entries,
/// other entries are kept.
impl<K: Ord, V> Patch<BTreeMap<K, V>> for BTreeMap<K, V> {
    fn apply(self, target: &mut BTreeMap<K, V>) {
        target.extend(self);
    }
}

impl<K: Eq + Hash, V> Patch<HashMap<K, V>> for HashMap<K, V> {
    fn apply(self, target: &mut HashMap<K, V>) {
        target.extend(self);
    }
}
