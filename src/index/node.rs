//! Index node for slab-based storage.
//!
//! ## Design
//!
//! `IndexNode` wraps a key/value pair with the two child links of the AVL
//! tree plus the cached subtree height. Nodes never point at their parent;
//! every walk starts at the root and goes down.
//!
//! ## Slab Integration
//!
//! Per official slab docs (https://docs.rs/slab/0.4.11):
//! - Keys are `usize` values returned by `slab.insert()`
//! - Keys may be reused after `slab.remove()`
//! - O(1) insert, remove, and lookup
//!
//! Child links are slab keys, so a rotation only rewrites a few `Option<usize>`
//! fields and never moves a payload.

/// Node stored in the index slab.
///
/// ## Memory Layout
///
/// ```text
/// IndexNode {
///     key: K
///     value: V
///     height: u32
///     left: Option<usize>   (slab key)
///     right: Option<usize>  (slab key)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct IndexNode<K, V> {
    /// Ordering key
    pub key: K,

    /// Stored record
    pub value: V,

    /// Height of the subtree rooted here (leaf = 1)
    pub height: u32,

    /// Left child (all keys smaller), slab key
    pub left: Option<usize>,

    /// Right child (all keys greater), slab key
    pub right: Option<usize>,
}

impl<K, V> IndexNode<K, V> {
    /// Create a new leaf node (height 1, no children)
    ///
    /// # Example
    ///
    /// ```
    /// use bistro::index::IndexNode;
    ///
    /// let node = IndexNode::new(7u64, "seven");
    ///
    /// assert_eq!(node.height, 1);
    /// assert!(node.is_leaf());
    /// ```
    #[inline]
    pub fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            height: 1,
            left: None,
            right: None,
        }
    }

    /// Check if this node has no children
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Number of children (0, 1 or 2)
    #[inline]
    pub fn child_count(&self) -> usize {
        usize::from(self.left.is_some()) + usize::from(self.right.is_some())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
