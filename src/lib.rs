//! # Bistro
//!
//! Restaurant menu and order back office.
//!
//! ## Architecture
//!
//! - **Index**: AVL tree over a slab arena, keyed by integer ids
//! - **Sort**: bucket distribution sort for presenting records by a numeric field
//! - **Types**: menu items, orders and money helpers
//! - **Service**: menu catalog, order desk, snapshot storage
//!
//! ## Design Principles
//!
//! 1. **Logarithmic lookups**: every id-keyed read and write goes through a balanced index
//! 2. **No Floating Point**: prices and totals are `rust_decimal::Decimal`
//! 3. **Explicit context**: one [`Restaurant`] value owns all state, no globals
//! 4. **Synchronous Execution**: single-threaded, no async
//!
//! ## Failure Model
//!
//! The index and the sort never return errors: a missing key is `None` or
//! `false`, an unsortable input comes back unchanged. Only business rules
//! and storage produce [`Error`]s.

// ============================================================================
// Module declarations
// ============================================================================

/// Balanced record index
pub mod index;

/// Bucket distribution sort
pub mod sort;

/// Record types: MenuItem, Order, money helpers
pub mod types;

/// Menu catalog, order desk, persistence
pub mod service;

/// Service layer errors
pub mod error;

/// Environment configuration
pub mod config;

/// Tracing subscriber setup
pub mod logging;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::Config;
pub use error::{Error, Result};
pub use index::{BalancedIndex, Patch};
pub use service::{JsonFileStorage, MemoryStorage, MenuCatalog, OrderDesk, OrderRequest, OrderSort, Restaurant, Snapshot, Storage};
pub use sort::{distribution_sort, DistributionSort, SortKey, SortOutcome};
pub use types::{MenuItem, MenuItemPatch, Order, OrderLine, OrderPatch, OrderStatus};
