//! Record types stored in the indexes
//!
//! ## Types
//!
//! - [`MenuItem`] / [`MenuItemPatch`]: menu entries keyed by item code
//! - [`Order`] / [`OrderLine`] / [`OrderPatch`]: customer orders keyed by id
//! - [`OrderStatus`]: order workflow states
//!
//! ## Money
//!
//! All prices and totals are `rust_decimal::Decimal`; see [`money`].

mod menu;
mod order;
pub mod money;

// Re-export all types at module level
pub use menu::{MenuItem, MenuItemPatch};
pub use order::{Order, OrderLine, OrderPatch, OrderStatus};
