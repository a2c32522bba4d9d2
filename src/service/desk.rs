//! Order desk: customer orders indexed by order id.
//!
//! ## Placement Rules
//!
//! - Zero-quantity lines are dropped; an order with nothing left is rejected
//! - Every item must exist with enough stock for the whole order (repeated
//!   codes are summed) before any stock is reserved
//! - Unit prices are captured from the menu at placement
//! - `total = round(subtotal * (1 - coupon / 100))`
//! - The new id is `max id + 1`
//!
//! Rejecting or cancelling an order puts its units back into stock.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::index::BalancedIndex;
use crate::service::MenuCatalog;
use crate::sort::DistributionSort;
use crate::types::money;
use crate::types::{Order, OrderLine, OrderPatch, OrderStatus};

/// One line of an order being placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderRequest {
    pub item_code: u64,
    pub quantity: u32,
}

impl OrderRequest {
    pub fn new(item_code: u64, quantity: u32) -> Self {
        Self {
            item_code,
            quantity,
        }
    }
}

/// Presentation order for [`OrderDesk::list`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSort {
    /// Index order (ascending id)
    #[default]
    Unsorted,
    /// Ascending id, by distribution sort
    Id,
    /// Ascending total, by distribution sort
    Total,
}

/// Orders keyed by `id`.
#[derive(Debug, Clone, Default)]
pub struct OrderDesk {
    orders: BalancedIndex<u64, Order>,
    sorter: DistributionSort,
}

impl OrderDesk {
    pub fn new(sorter: DistributionSort) -> Self {
        Self {
            orders: BalancedIndex::new(),
            sorter,
        }
    }

    /// Build the desk from persisted orders
    pub fn from_orders(orders: impl IntoIterator<Item = Order>, sorter: DistributionSort) -> Self {
        Self {
            orders: orders.into_iter().map(|order| (order.id, order)).collect(),
            sorter,
        }
    }

    // ========================================================================
    // Read paths
    // ========================================================================

    #[inline]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Id the next placed order would get
    #[inline]
    pub fn next_id(&self) -> u64 {
        self.orders.max_key() + 1
    }

    #[inline]
    pub fn get(&self, id: u64) -> Option<&Order> {
        self.orders.search(&id)
    }

    /// Underlying index
    pub fn index(&self) -> &BalancedIndex<u64, Order> {
        &self.orders
    }

    /// Orders, optionally filtered by status, in the requested order
    pub fn list(&self, status: Option<OrderStatus>, sort: OrderSort) -> Vec<Order> {
        let selected: Vec<Order> = self
            .orders
            .values()
            .filter(|order| status.map_or(true, |s| order.status == s))
            .cloned()
            .collect();

        match sort {
            OrderSort::Unsorted => selected,
            OrderSort::Id => self.sorter.sort(selected, |order| order.id),
            OrderSort::Total => self.sorter.sort(selected, |order| order.total),
        }
    }

    /// Orders still waiting for approval, ascending id
    pub fn pending(&self) -> Vec<&Order> {
        self.orders
            .values()
            .filter(|order| order.status == OrderStatus::AwaitingApproval)
            .collect()
    }

    /// Owned copy of every order, ascending by id
    pub fn snapshot(&self) -> Vec<Order> {
        self.orders.values().cloned().collect()
    }

    // ========================================================================
    // Placement
    // ========================================================================

    /// Place a new order, reserving stock from `catalog`.
    ///
    /// `coupon` is a discount percentage in `0..=100`.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyOrder`] if no line has a positive quantity
    /// - [`Error::InvalidCoupon`] if the coupon is out of range
    /// - [`Error::ItemNotFound`] / [`Error::InsufficientStock`] per item
    ///
    /// Nothing is reserved when an error is returned.
    pub fn place(
        &mut self,
        catalog: &mut MenuCatalog,
        requests: &[OrderRequest],
        coupon: Option<Decimal>,
    ) -> Result<Order> {
        let requests: Vec<OrderRequest> = requests.iter().copied().filter(|r| r.quantity > 0).collect();
        if requests.is_empty() {
            return Err(Error::EmptyOrder);
        }

        if let Some(percent) = coupon {
            if percent.is_sign_negative() || percent > money::MAX_COUPON_PERCENT {
                return Err(Error::InvalidCoupon(format!("{}% is not in 0..=100", percent)));
            }
        }

        // Check the whole order before touching stock
        let mut demand: BTreeMap<u64, u64> = BTreeMap::new();
        for request in &requests {
            *demand.entry(request.item_code).or_default() += u64::from(request.quantity);
        }
        for (&code, &requested) in &demand {
            let item = catalog.get(code).ok_or(Error::ItemNotFound(code))?;
            if !item.has_stock(requested) {
                return Err(Error::InsufficientStock {
                    code,
                    requested,
                    available: item.stock,
                });
            }
        }

        let mut lines = Vec::with_capacity(requests.len());
        for request in &requests {
            let item = catalog.get(request.item_code).ok_or(Error::ItemNotFound(request.item_code))?;
            lines.push(OrderLine::new(request.item_code, request.quantity, item.price));
        }

        let mut order = Order::new(self.next_id(), lines, Decimal::ZERO);
        let subtotal = order
            .subtotal()
            .ok_or_else(|| Error::InvalidTotal("subtotal overflow".into()))?;
        order.total = match coupon {
            Some(percent) => money::apply_coupon(subtotal, percent)
                .ok_or_else(|| Error::InvalidCoupon(format!("{}% is not in 0..=100", percent)))?,
            None => money::round_currency(subtotal),
        };

        for request in &requests {
            catalog.reserve(request.item_code, request.quantity)?;
        }

        tracing::debug!(
            id = order.id,
            lines = order.lines.len(),
            total = %order.total,
            "order placed"
        );
        self.orders.insert(order.id, order.clone());
        Ok(order)
    }

    // ========================================================================
    // Status changes
    // ========================================================================

    /// Move order `id` to `status`.
    ///
    /// Rejected and cancelled orders return their units to `catalog`; lines
    /// whose item was removed from the menu are skipped.
    ///
    /// # Errors
    ///
    /// - [`Error::OrderNotFound`] if no order has this id
    /// - [`Error::InvalidTransition`] if the workflow does not allow the move
    pub fn set_status(&mut self, catalog: &mut MenuCatalog, id: u64, status: OrderStatus) -> Result<()> {
        let order = self.get(id).ok_or(Error::OrderNotFound(id))?;
        if !order.status.can_transition_to(status) {
            return Err(Error::InvalidTransition {
                from: order.status,
                to: status,
            });
        }

        if status.releases_stock() {
            for line in &order.lines {
                if let Err(err) = catalog.restock(line.item_code, line.quantity) {
                    tracing::warn!(order = id, item = line.item_code, %err, "cannot return stock");
                }
            }
        }

        let from = order.status;
        self.orders.update(&id, OrderPatch::status(status));
        tracing::debug!(id, %from, to = %status, "order status changed");
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MenuItem;

    fn catalog() -> MenuCatalog {
        MenuCatalog::from_items(vec![
            MenuItem::new(1, "Coxinha", "Chicken croquette", Decimal::new(650, 2), 10),
            MenuItem::new(2, "Suco", "Orange juice", Decimal::new(800, 2), 2),
        ])
    }

    fn desk() -> OrderDesk {
        OrderDesk::new(DistributionSort::default())
    }

    #[test]
    fn test_place_order() {
        let mut catalog = catalog();
        let mut desk = desk();

        let order = desk
            .place(&mut catalog, &[OrderRequest::new(1, 2), OrderRequest::new(2, 1)], None)
            .unwrap();

        assert_eq!(order.id, 1);
        assert_eq!(order.status, OrderStatus::AwaitingApproval);
        assert_eq!(order.total, Decimal::new(2100, 2));
        assert_eq!(order.lines[0].unit_price, Decimal::new(650, 2));
        assert_eq!(catalog.get(1).unwrap().stock, 8);
        assert_eq!(catalog.get(2).unwrap().stock, 1);
        assert_eq!(desk.get(1), Some(&order));
    }

    #[test]
    fn test_place_order_with_coupon() {
        let mut catalog = catalog();
        let mut desk = desk();

        // 3 x 6.50 = 19.50, minus 10% = 17.55
        let order = desk
            .place(&mut catalog, &[OrderRequest::new(1, 3)], Some(Decimal::new(10, 0)))
            .unwrap();

        assert_eq!(order.total, Decimal::new(1755, 2));
    }

    #[test]
    fn test_place_order_ids_follow_max() {
        let mut catalog = catalog();
        let mut desk = OrderDesk::from_orders(
            vec![Order::new(41, Vec::new(), Decimal::ZERO)],
            DistributionSort::default(),
        );

        let order = desk.place(&mut catalog, &[OrderRequest::new(1, 1)], None).unwrap();

        assert_eq!(order.id, 42);
        assert_eq!(desk.next_id(), 43);
    }

    #[test]
    fn test_place_empty_order() {
        let mut catalog = catalog();
        let mut desk = desk();

        assert!(matches!(desk.place(&mut catalog, &[], None), Err(Error::EmptyOrder)));
        assert!(matches!(
            desk.place(&mut catalog, &[OrderRequest::new(1, 0)], None),
            Err(Error::EmptyOrder)
        ));
        assert!(desk.is_empty());
    }

    #[test]
    fn test_place_invalid_coupon() {
        let mut catalog = catalog();
        let mut desk = desk();

        let err = desk
            .place(&mut catalog, &[OrderRequest::new(1, 1)], Some(Decimal::new(150, 0)))
            .unwrap_err();

        assert!(matches!(err, Error::InvalidCoupon(_)));
        assert_eq!(catalog.get(1).unwrap().stock, 10);
    }

    #[test]
    fn test_place_failure_reserves_nothing() {
        let mut catalog = catalog();
        let mut desk = desk();

        // Item 2 has 2 units; two lines of 2 and 1 exceed it together
        let err = desk
            .place(
                &mut catalog,
                &[OrderRequest::new(1, 5), OrderRequest::new(2, 2), OrderRequest::new(2, 1)],
                None,
            )
            .unwrap_err();

        assert!(matches!(
            err,
            Error::InsufficientStock {
                code: 2,
                requested: 3,
                available: 2
            }
        ));
        assert_eq!(catalog.get(1).unwrap().stock, 10);
        assert_eq!(catalog.get(2).unwrap().stock, 2);
        assert!(desk.is_empty());
    }

    #[test]
    fn test_place_unknown_item() {
        let mut catalog = catalog();
        let mut desk = desk();

        let err = desk
            .place(&mut catalog, &[OrderRequest::new(1, 1), OrderRequest::new(99, 1)], None)
            .unwrap_err();

        assert!(matches!(err, Error::ItemNotFound(99)));
        assert_eq!(catalog.get(1).unwrap().stock, 10);
    }

    #[test]
    fn test_status_workflow() {
        let mut catalog = catalog();
        let mut desk = desk();
        desk.place(&mut catalog, &[OrderRequest::new(1, 1)], None).unwrap();

        desk.set_status(&mut catalog, 1, OrderStatus::Accepted).unwrap();
        desk.set_status(&mut catalog, 1, OrderStatus::Preparing).unwrap();
        desk.set_status(&mut catalog, 1, OrderStatus::Ready).unwrap();
        desk.set_status(&mut catalog, 1, OrderStatus::Delivered).unwrap();

        assert_eq!(desk.get(1).unwrap().status, OrderStatus::Delivered);
        assert!(matches!(
            desk.set_status(&mut catalog, 1, OrderStatus::Cancelled),
            Err(Error::InvalidTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Cancelled
            })
        ));
        assert!(matches!(
            desk.set_status(&mut catalog, 7, OrderStatus::Accepted),
            Err(Error::OrderNotFound(7))
        ));
    }

    #[test]
    fn test_reject_returns_stock() {
        let mut catalog = catalog();
        let mut desk = desk();
        desk.place(&mut catalog, &[OrderRequest::new(1, 4)], None).unwrap();
        assert_eq!(catalog.get(1).unwrap().stock, 6);

        desk.set_status(&mut catalog, 1, OrderStatus::Rejected).unwrap();

        assert_eq!(catalog.get(1).unwrap().stock, 10);
        assert!(desk.pending().is_empty());
    }

    #[test]
    fn test_cancel_after_item_removed() {
        let mut catalog = catalog();
        let mut desk = desk();
        desk.place(&mut catalog, &[OrderRequest::new(2, 1)], None).unwrap();
        catalog.remove(2).unwrap();

        desk.set_status(&mut catalog, 1, OrderStatus::Cancelled).unwrap();

        assert_eq!(desk.get(1).unwrap().status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_list_filters_and_sorts() {
        let orders = vec![
            Order::new(1, Vec::new(), Decimal::new(3000, 2)),
            Order::new(2, Vec::new(), Decimal::new(1000, 2)),
            Order::new(3, Vec::new(), Decimal::new(2000, 2)),
        ];
        let mut desk = OrderDesk::from_orders(orders, DistributionSort::new(3));
        let mut catalog = MenuCatalog::new();
        desk.set_status(&mut catalog, 3, OrderStatus::Accepted).unwrap();

        let by_total: Vec<u64> = desk.list(None, OrderSort::Total).iter().map(|o| o.id).collect();
        assert_eq!(by_total, vec![2, 3, 1]);

        let by_id: Vec<u64> = desk.list(None, OrderSort::Id).iter().map(|o| o.id).collect();
        assert_eq!(by_id, vec![1, 2, 3]);

        let pending: Vec<u64> = desk
            .list(Some(OrderStatus::AwaitingApproval), OrderSort::Total)
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(pending, vec![2, 1]);

        assert_eq!(desk.pending().len(), 2);
    }
}
