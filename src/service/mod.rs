//! Restaurant service layer.
//!
//! ## Architecture
//!
//! [`Restaurant`] is the single context object built at startup:
//!
//! - [`MenuCatalog`]: menu items in a `BalancedIndex` keyed by item code
//! - [`OrderDesk`]: orders in a `BalancedIndex` keyed by order id
//! - [`Storage`]: where the full [`Snapshot`] is written after every mutation
//!
//! ## Persistence
//!
//! Each successful mutating call ends by saving a complete snapshot built
//! from ascending traversals of both indexes. A call that fails validation
//! changes nothing and saves nothing.
//!
//! ## Example
//!
//! ```
//! use bistro::service::{MemoryStorage, OrderRequest, Restaurant};
//! use bistro::types::{MenuItem, OrderStatus};
//! use rust_decimal::Decimal;
//!
//! let mut restaurant = Restaurant::init(MemoryStorage::new(), 10).unwrap();
//!
//! let code = restaurant
//!     .register_item(MenuItem::new(0, "Coxinha", "Chicken croquette", Decimal::new(650, 2), 10))
//!     .unwrap();
//! let order = restaurant.place_order(&[OrderRequest::new(code, 2)], None).unwrap();
//! restaurant.accept_order(order.id).unwrap();
//!
//! assert_eq!(restaurant.order(order.id).unwrap().status, OrderStatus::Accepted);
//! assert_eq!(restaurant.storage().saves(), 3);
//! ```

pub mod catalog;
pub mod desk;
pub mod storage;

pub use catalog::MenuCatalog;
pub use desk::{OrderDesk, OrderRequest, OrderSort};
pub use storage::{JsonFileStorage, MemoryStorage, Snapshot, Storage};

use rust_decimal::Decimal;

use crate::config::Config;
use crate::error::Result;
use crate::sort::DistributionSort;
use crate::types::{MenuItem, MenuItemPatch, Order, OrderStatus};

/// Menu, orders and their storage.
#[derive(Debug)]
pub struct Restaurant<S> {
    catalog: MenuCatalog,
    desk: OrderDesk,
    storage: S,
}

impl Restaurant<JsonFileStorage> {
    /// Open the JSON snapshot named by `config`
    pub fn open(config: &Config) -> Result<Self> {
        Self::init(JsonFileStorage::new(&config.data_path), config.bucket_count)
    }
}

impl<S: Storage> Restaurant<S> {
    /// Load the stored snapshot and index every record.
    ///
    /// `bucket_count` configures the distribution sort used for order
    /// listings.
    pub fn init(storage: S, bucket_count: usize) -> Result<Self> {
        let snapshot = storage.load()?;
        let (item_count, order_count) = (snapshot.items.len(), snapshot.orders.len());

        let catalog = MenuCatalog::from_items(snapshot.items);
        let desk = OrderDesk::from_orders(snapshot.orders, DistributionSort::new(bucket_count));

        tracing::info!(
            items = item_count,
            orders = order_count,
            indexed_items = catalog.len(),
            indexed_orders = desk.len(),
            "restaurant initialized"
        );

        Ok(Self {
            catalog,
            desk,
            storage,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn catalog(&self) -> &MenuCatalog {
        &self.catalog
    }

    pub fn desk(&self) -> &OrderDesk {
        &self.desk
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Give back the storage, dropping the indexes
    pub fn into_storage(self) -> S {
        self.storage
    }

    // ========================================================================
    // Read paths
    // ========================================================================

    /// Menu items in ascending code order
    pub fn menu(&self) -> Vec<&MenuItem> {
        self.catalog.list()
    }

    pub fn item(&self, code: u64) -> Option<&MenuItem> {
        self.catalog.get(code)
    }

    pub fn order(&self, id: u64) -> Option<&Order> {
        self.desk.get(id)
    }

    /// Orders, optionally filtered by status, in the requested order
    pub fn orders(&self, status: Option<OrderStatus>, sort: OrderSort) -> Vec<Order> {
        self.desk.list(status, sort)
    }

    /// Orders waiting for approval
    pub fn pending_orders(&self) -> Vec<&Order> {
        self.desk.pending()
    }

    /// Current state of both indexes
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.catalog.snapshot(), self.desk.snapshot())
    }

    // ========================================================================
    // Menu mutations
    // ========================================================================

    /// Register a menu item (code 0 = next free code)
    pub fn register_item(&mut self, item: MenuItem) -> Result<u64> {
        let code = self.catalog.register(item)?;
        self.persist()?;
        Ok(code)
    }

    /// Merge `patch` into menu item `code`
    pub fn update_item(&mut self, code: u64, patch: MenuItemPatch) -> Result<()> {
        self.catalog.update(code, patch)?;
        self.persist()
    }

    /// Remove menu item `code`
    pub fn remove_item(&mut self, code: u64) -> Result<MenuItem> {
        let item = self.catalog.remove(code)?;
        self.persist()?;
        Ok(item)
    }

    // ========================================================================
    // Order mutations
    // ========================================================================

    /// Place an order, optionally with a percentage coupon
    pub fn place_order(&mut self, requests: &[OrderRequest], coupon: Option<Decimal>) -> Result<Order> {
        let order = self.desk.place(&mut self.catalog, requests, coupon)?;
        self.persist()?;
        Ok(order)
    }

    /// Move order `id` to `status`
    pub fn set_order_status(&mut self, id: u64, status: OrderStatus) -> Result<()> {
        self.desk.set_status(&mut self.catalog, id, status)?;
        self.persist()
    }

    pub fn accept_order(&mut self, id: u64) -> Result<()> {
        self.set_order_status(id, OrderStatus::Accepted)
    }

    pub fn reject_order(&mut self, id: u64) -> Result<()> {
        self.set_order_status(id, OrderStatus::Rejected)
    }

    pub fn cancel_order(&mut self, id: u64) -> Result<()> {
        self.set_order_status(id, OrderStatus::Cancelled)
    }

    fn persist(&mut self) -> Result<()> {
        let snapshot = self.snapshot();
        self.storage.save(&snapshot)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
