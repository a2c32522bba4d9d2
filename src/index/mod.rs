//! Record index module.
//!
//! ## Architecture
//!
//! The index is an AVL tree (height-balanced binary search tree) with:
//!
//! - **Slab-based storage**: nodes live in one arena, links are slab keys
//! - **Cached heights**: each node stores its subtree height for O(1) balance checks
//! - **Top-down walks**: no parent links; recursion returns new subtree roots
//!
//! ## Components
//!
//! - [`IndexNode`]: key, record, height and child links
//! - [`BalancedIndex`]: the ordered map
//! - [`Patch`]: partial-field update merged by [`BalancedIndex::update`]
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Insert / overwrite | O(log n) |
//! | Search | O(log n) |
//! | Update (merge) | O(log n) |
//! | Delete | O(log n) |
//! | Max key | O(log n) |
//! | Ascending traversal | O(n) |
//!
//! The index is not synchronized. Every mutation takes `&mut self`; callers
//! sharing one index across threads must serialize access themselves.

pub mod node;
pub mod patch;
pub mod tree;

pub use node::IndexNode;
pub use patch::Patch;
pub use tree::{BalancedIndex, Iter};
