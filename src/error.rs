//! Error types for the restaurant service layer.
//!
//! The index and the sort never fail; everything here comes from business
//! rules or from snapshot storage.

use thiserror::Error;

use crate::types::OrderStatus;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the menu catalog, the order desk and snapshot storage.
#[derive(Debug, Error)]
pub enum Error {
    // Storage errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    // Menu errors
    #[error("Menu item not found: {0}")]
    ItemNotFound(u64),

    #[error("Menu item already exists: {0}")]
    DuplicateItem(u64),

    #[error("Invalid menu item: {0}")]
    InvalidItem(String),

    #[error("Insufficient stock for item {code}: requested {requested}, available {available}")]
    InsufficientStock {
        code: u64,
        requested: u64,
        available: u32,
    },

    // Order errors
    #[error("Order not found: {0}")]
    OrderNotFound(u64),

    #[error("Order has no items")]
    EmptyOrder,

    #[error("Invalid coupon: {0}")]
    InvalidCoupon(String),

    #[error("Invalid order total: {0}")]
    InvalidTotal(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}
