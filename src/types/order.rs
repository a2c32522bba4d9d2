//! Customer order records.
//!
//! ## Status Lifecycle
//!
//! ```text
//! AWAITING_APPROVAL --> ACCEPTED --> PREPARING --> READY --> DELIVERED
//!        |                 |
//!        +--> REJECTED     +--> CANCELLED
//!        +--> CANCELLED
//! ```
//!
//! `DELIVERED`, `REJECTED` and `CANCELLED` are terminal.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::index::Patch;
use crate::types::money;

// ============================================================================
// OrderStatus enum
// ============================================================================

/// Where an order is in the kitchen workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Placed, waiting for the restaurant to accept or reject it
    #[default]
    AwaitingApproval,
    /// Accepted, not started yet
    Accepted,
    /// Being cooked
    Preparing,
    /// Ready for pickup or delivery
    Ready,
    /// Handed to the customer
    Delivered,
    /// Refused by the restaurant
    Rejected,
    /// Withdrawn before preparation started
    Cancelled,
}

impl OrderStatus {
    /// Every status, in workflow order
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::AwaitingApproval,
        OrderStatus::Accepted,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Rejected,
        OrderStatus::Cancelled,
    ];

    /// Wire/display name
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::AwaitingApproval => "AWAITING_APPROVAL",
            OrderStatus::Accepted => "ACCEPTED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Rejected => "REJECTED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Check if no further transition is possible
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Rejected | OrderStatus::Cancelled
        )
    }

    /// Check if moving from `self` to `next` is allowed
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;

        matches!(
            (self, next),
            (AwaitingApproval, Accepted)
                | (AwaitingApproval, Rejected)
                | (AwaitingApproval, Cancelled)
                | (Accepted, Preparing)
                | (Accepted, Cancelled)
                | (Preparing, Ready)
                | (Ready, Delivered)
        )
    }

    /// Check if entering this status hands reserved stock back to the menu
    pub fn releases_stock(self) -> bool {
        matches!(self, OrderStatus::Rejected | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// OrderLine struct
// ============================================================================

/// One menu item on an order, with the price captured at placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Menu item code
    pub item_code: u64,

    /// Units ordered
    pub quantity: u32,

    /// Unit price when the order was placed
    pub unit_price: Decimal,
}

impl OrderLine {
    pub fn new(item_code: u64, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            item_code,
            quantity,
            unit_price,
        }
    }

    /// `unit_price * quantity`, None on overflow
    #[inline]
    pub fn line_total(&self) -> Option<Decimal> {
        money::line_total(self.unit_price, self.quantity)
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// A customer order.
///
/// ## Example
///
/// ```
/// use bistro::types::{Order, OrderLine, OrderStatus};
/// use rust_decimal::Decimal;
///
/// let lines = vec![OrderLine::new(1, 2, Decimal::new(650, 2))];
/// let order = Order::new(1, lines, Decimal::new(1300, 2));
///
/// assert_eq!(order.status, OrderStatus::AwaitingApproval);
/// assert_eq!(order.subtotal(), Some(Decimal::new(1300, 2)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier, the desk key
    pub id: u64,

    /// Items ordered
    pub lines: Vec<OrderLine>,

    /// Amount charged (after any coupon), in cents precision
    pub total: Decimal,

    /// Workflow status
    #[serde(default)]
    pub status: OrderStatus,
}

impl Order {
    /// Create a new order awaiting approval
    pub fn new(id: u64, lines: Vec<OrderLine>, total: Decimal) -> Self {
        Self {
            id,
            lines,
            total,
            status: OrderStatus::AwaitingApproval,
        }
    }

    /// Sum of line totals before any coupon
    pub fn subtotal(&self) -> Option<Decimal> {
        self.lines
            .iter()
            .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.line_total()?))
    }

    /// Total units across all lines
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }
}

// ============================================================================
// OrderPatch
// ============================================================================

/// Partial edit of an [`Order`]; `None` fields are left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub total: Option<Decimal>,
}

impl OrderPatch {
    /// Patch that only sets the status
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            total: None,
        }
    }
}

impl Patch<Order> for OrderPatch {
    fn apply(self, target: &mut Order) {
        if let Some(status) = self.status {
            target.status = status;
        }
        if let Some(total) = self.total {
            target.total = total;
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
