//! AVL tree over a slab arena.
//!
//! ## Architecture
//!
//! - **Slab**: every node lives in one `Slab<IndexNode<K, V>>`; links are slab keys
//! - **Root link**: `Option<usize>`, `None` for the empty index
//! - **Recursive descent**: insert and remove walk down from the root and
//!   return the (possibly rotated) subtree root to the caller, which
//!   reassigns its child link. Every ancestor on the path is rebalanced on
//!   the way back up.
//!
//! ## Invariants
//!
//! - In-order key sequence is strictly increasing (keys unique)
//! - `|height(left) - height(right)| <= 1` at every node
//! - `height = 1 + max(height(left), height(right))`, missing child = 0
//!
//! ## Example
//!
//! ```
//! use bistro::index::BalancedIndex;
//!
//! let mut index = BalancedIndex::new();
//! for key in [10u64, 20, 5, 6, 15] {
//!     index.insert(key, key * 100);
//! }
//!
//! assert_eq!(index.keys().copied().collect::<Vec<_>>(), vec![5, 6, 10, 15, 20]);
//! assert_eq!(index.max_key(), 20);
//! assert!(index.height() <= 3);
//! ```

use std::cmp::Ordering;
use std::mem;

use slab::Slab;

use crate::index::{IndexNode, Patch};

/// Height-balanced ordered map from key to record.
#[derive(Debug, Clone)]
pub struct BalancedIndex<K, V> {
    /// Node storage
    nodes: Slab<IndexNode<K, V>>,

    /// Root node (slab key), None when empty
    root: Option<usize>,
}

impl<K, V> Default for BalancedIndex<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> BalancedIndex<K, V> {
    /// Create a new empty index
    pub fn new() -> Self {
        Self {
            nodes: Slab::new(),
            root: None,
        }
    }

    /// Create an index with pre-allocated node capacity
    ///
    /// # Example
    ///
    /// ```
    /// use bistro::index::BalancedIndex;
    ///
    /// let index: BalancedIndex<u64, String> = BalancedIndex::with_capacity(1_000);
    /// assert!(index.capacity() >= 1_000);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Slab::with_capacity(capacity),
            root: None,
        }
    }

    // ========================================================================
    // Capacity and Size
    // ========================================================================

    /// Get the current capacity (pre-allocated node slots)
    #[inline]
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Number of keys stored
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the index is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree (0 when empty)
    #[inline]
    pub fn height(&self) -> u32 {
        self.height_of(self.root)
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// In-order iterator over `(key, value)` pairs.
    ///
    /// Each call starts a fresh walk from the root.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.nodes, self.root)
    }

    /// Keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Values in ascending key order
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Collect every stored record in strictly ascending key order.
    pub fn traverse_ascending(&self) -> Vec<&V> {
        self.values().collect()
    }

    // ========================================================================
    // Height bookkeeping and rotations
    // ========================================================================

    #[inline]
    fn height_of(&self, link: Option<usize>) -> u32 {
        link.map_or(0, |idx| self.nodes[idx].height)
    }

    fn update_height(&mut self, idx: usize) {
        let node = &self.nodes[idx];
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.nodes[idx].height = height;
    }

    /// height(left) - height(right)
    fn balance_factor(&self, idx: usize) -> i64 {
        let node = &self.nodes[idx];
        i64::from(self.height_of(node.left)) - i64::from(self.height_of(node.right))
    }

    /// Promote the left child of `y`; returns the new subtree root.
    ///
    /// ```text
    ///       y            x
    ///      / \          / \
    ///     x   C   ->   A   y
    ///    / \              / \
    ///   A   B            B   C
    /// ```
    fn rotate_right(&mut self, y: usize) -> usize {
        let Some(x) = self.nodes[y].left else {
            return y;
        };
        let moved = self.nodes[x].right;

        self.nodes[x].right = Some(y);
        self.nodes[y].left = moved;

        // y is now the child of x
        self.update_height(y);
        self.update_height(x);
        x
    }

    /// Mirror of [`rotate_right`](Self::rotate_right).
    fn rotate_left(&mut self, x: usize) -> usize {
        let Some(y) = self.nodes[x].right else {
            return x;
        };
        let moved = self.nodes[y].left;

        self.nodes[y].left = Some(x);
        self.nodes[x].right = moved;

        self.update_height(x);
        self.update_height(y);
        y
    }

    /// Restore the balance invariant at `idx` after one of its subtrees
    /// changed height by at most one. Returns the new subtree root.
    ///
    /// The rotation shape is chosen from the heavy child's balance factor:
    /// a child leaning the other way is the left-right / right-left case.
    fn rebalance(&mut self, idx: usize) -> usize {
        self.update_height(idx);
        let balance = self.balance_factor(idx);

        if balance > 1 {
            if let Some(left) = self.nodes[idx].left {
                if self.balance_factor(left) < 0 {
                    let new_left = self.rotate_left(left);
                    self.nodes[idx].left = Some(new_left);
                }
            }
            return self.rotate_right(idx);
        }

        if balance < -1 {
            if let Some(right) = self.nodes[idx].right {
                if self.balance_factor(right) > 0 {
                    let new_right = self.rotate_right(right);
                    self.nodes[idx].right = Some(new_right);
                }
            }
            return self.rotate_left(idx);
        }

        idx
    }

    /// Detach the minimum node of the subtree at `idx`.
    ///
    /// Returns the rebalanced subtree root without the minimum, and the slab
    /// key of the detached node (its links are left for the caller to reset).
    fn detach_min(&mut self, idx: usize) -> (Option<usize>, usize) {
        match self.nodes[idx].left {
            None => (self.nodes[idx].right, idx),
            Some(left) => {
                let (new_left, min) = self.detach_min(left);
                self.nodes[idx].left = new_left;
                (Some(self.rebalance(idx)), min)
            }
        }
    }
}

impl<K: Ord, V> BalancedIndex<K, V> {
    // ========================================================================
    // Insert
    // ========================================================================

    /// Insert a record, replacing the whole record if `key` is already present.
    ///
    /// A new key becomes a leaf and every ancestor on the path is rebalanced.
    /// An existing key only has its record swapped; the shape is unchanged.
    ///
    /// # Returns
    ///
    /// The previous record stored under `key`, if any
    ///
    /// # Example
    ///
    /// ```
    /// use bistro::index::BalancedIndex;
    ///
    /// let mut index = BalancedIndex::new();
    /// assert_eq!(index.insert(1u64, "coxinha"), None);
    /// assert_eq!(index.insert(1u64, "kibe"), Some("coxinha"));
    /// assert_eq!(index.search(&1), Some(&"kibe"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut replaced = None;
        let root = self.insert_at(self.root, key, value, &mut replaced);
        self.root = Some(root);
        replaced
    }

    fn insert_at(
        &mut self,
        link: Option<usize>,
        key: K,
        value: V,
        replaced: &mut Option<V>,
    ) -> usize {
        let Some(idx) = link else {
            return self.nodes.insert(IndexNode::new(key, value));
        };

        match key.cmp(&self.nodes[idx].key) {
            Ordering::Less => {
                let left = self.nodes[idx].left;
                let child = self.insert_at(left, key, value, replaced);
                self.nodes[idx].left = Some(child);
            }
            Ordering::Greater => {
                let right = self.nodes[idx].right;
                let child = self.insert_at(right, key, value, replaced);
                self.nodes[idx].right = Some(child);
            }
            Ordering::Equal => {
                *replaced = Some(mem::replace(&mut self.nodes[idx].value, value));
                return idx;
            }
        }

        self.rebalance(idx)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    fn find(&self, key: &K) -> Option<usize> {
        let mut link = self.root;
        while let Some(idx) = link {
            let node = &self.nodes[idx];
            link = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(idx),
            };
        }
        None
    }

    /// Get the record stored under `key`
    #[inline]
    pub fn search(&self, key: &K) -> Option<&V> {
        self.find(key).map(|idx| &self.nodes[idx].value)
    }

    /// Get a mutable reference to the record stored under `key`
    #[inline]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = self.find(key)?;
        Some(&mut self.nodes[idx].value)
    }

    /// Check if `key` is present
    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    // ========================================================================
    // Update
    // ========================================================================

    /// Merge `patch` into the record stored under `key`.
    ///
    /// Fields named by the patch are overwritten, all others are kept.
    ///
    /// # Returns
    ///
    /// `false` if `key` is absent (nothing is touched)
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use bistro::index::BalancedIndex;
    ///
    /// let mut index = BalancedIndex::new();
    /// index.insert(10u64, BTreeMap::from([("a", 1), ("b", 2)]));
    ///
    /// assert!(index.update(&10, BTreeMap::from([("a", 9)])));
    /// assert_eq!(index.search(&10), Some(&BTreeMap::from([("a", 9), ("b", 2)])));
    /// assert!(!index.update(&11, BTreeMap::from([("a", 0)])));
    /// ```
    pub fn update<P: Patch<V>>(&mut self, key: &K, patch: P) -> bool {
        match self.get_mut(key) {
            Some(value) => {
                patch.apply(value);
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Delete
    // ========================================================================

    /// Remove `key`, returning its record.
    ///
    /// A node with two children is replaced by its in-order successor; every
    /// ancestor on the path is rebalanced.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let mut removed = None;
        self.root = self.remove_at(self.root, key, &mut removed);
        removed
    }

    /// Remove `key`, reporting whether it was present.
    ///
    /// # Example
    ///
    /// ```
    /// use bistro::index::BalancedIndex;
    ///
    /// let mut index = BalancedIndex::new();
    /// index.insert(6u64, ());
    ///
    /// assert!(index.delete(&6));
    /// assert!(!index.delete(&6));
    /// assert!(index.is_empty());
    /// ```
    #[inline]
    pub fn delete(&mut self, key: &K) -> bool {
        self.remove(key).is_some()
    }

    fn remove_at(
        &mut self,
        link: Option<usize>,
        key: &K,
        removed: &mut Option<V>,
    ) -> Option<usize> {
        let idx = link?;

        match key.cmp(&self.nodes[idx].key) {
            Ordering::Less => {
                let left = self.nodes[idx].left;
                self.nodes[idx].left = self.remove_at(left, key, removed);
            }
            Ordering::Greater => {
                let right = self.nodes[idx].right;
                self.nodes[idx].right = self.remove_at(right, key, removed);
            }
            Ordering::Equal => {
                let (left, right) = (self.nodes[idx].left, self.nodes[idx].right);
                return match (left, right) {
                    (Some(_), Some(right)) => {
                        let (new_right, successor) = self.detach_min(right);
                        self.nodes[successor].left = left;
                        self.nodes[successor].right = new_right;
                        *removed = Some(self.nodes.remove(idx).value);
                        Some(self.rebalance(successor))
                    }
                    _ => {
                        *removed = Some(self.nodes.remove(idx).value);
                        left.or(right)
                    }
                };
            }
        }

        Some(self.rebalance(idx))
    }

    // ========================================================================
    // Invariant check
    // ========================================================================

    /// Verify ordering, balance and cached heights of every node.
    ///
    /// Intended for tests and debug assertions; walks the whole tree.
    pub fn is_valid(&self) -> bool {
        self.check_subtree(self.root, None, None).is_some() && self.iter().count() == self.len()
    }

    /// Returns the subtree height if every node below `link` is valid.
    fn check_subtree(&self, link: Option<usize>, lower: Option<&K>, upper: Option<&K>) -> Option<u32> {
        let Some(idx) = link else {
            return Some(0);
        };
        let node = self.nodes.get(idx)?;

        if lower.is_some_and(|lo| node.key <= *lo) || upper.is_some_and(|hi| node.key >= *hi) {
            return None;
        }

        let left = self.check_subtree(node.left, lower, Some(&node.key))?;
        let right = self.check_subtree(node.right, Some(&node.key), upper)?;
        if left.abs_diff(right) > 1 {
            return None;
        }

        let height = 1 + left.max(right);
        (node.height == height).then_some(height)
    }
}

impl<K: Ord + Copy + Default, V> BalancedIndex<K, V> {
    /// Greatest key present, found by following right links from the root.
    ///
    /// Returns `K::default()` (0 for integers) when the index is empty, so
    /// callers can derive the next identifier as `max_key() + 1`.
    ///
    /// # Example
    ///
    /// ```
    /// use bistro::index::BalancedIndex;
    ///
    /// let mut index = BalancedIndex::new();
    /// assert_eq!(index.max_key(), 0u64);
    ///
    /// for key in [5u64, 20, 3] {
    ///     index.insert(key, ());
    /// }
    /// assert_eq!(index.max_key(), 20);
    /// ```
    pub fn max_key(&self) -> K {
        let Some(mut idx) = self.root else {
            return K::default();
        };
        while let Some(right) = self.nodes[idx].right {
            idx = right;
        }
        self.nodes[idx].key
    }

    /// Smallest key present, `K::default()` when empty
    pub fn min_key(&self) -> K {
        let Some(mut idx) = self.root else {
            return K::default();
        };
        while let Some(left) = self.nodes[idx].left {
            idx = left;
        }
        self.nodes[idx].key
    }
}

// ============================================================================
// Bulk load
// ============================================================================

impl<K: Ord, V> Extend<(K, V)> for BalancedIndex<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for BalancedIndex<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut index = Self::with_capacity(iter.size_hint().0);
        index.extend(iter);
        index
    }
}

// ============================================================================
// In-order iterator
// ============================================================================

/// In-order iterator over an index.
///
/// Holds an explicit stack of slab keys: the left spine of the subtree still
/// to visit.
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    nodes: &'a Slab<IndexNode<K, V>>,
    stack: Vec<usize>,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(nodes: &'a Slab<IndexNode<K, V>>, root: Option<usize>) -> Self {
        let mut iter = Self {
            nodes,
            stack: Vec::new(),
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut link: Option<usize>) {
        while let Some(idx) = link {
            self.stack.push(idx);
            link = self.nodes[idx].left;
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let nodes = self.nodes;
        let node = &nodes[idx];
        self.push_left_spine(node.right);
        Some((&node.key, &node.value))
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a BalancedIndex<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
