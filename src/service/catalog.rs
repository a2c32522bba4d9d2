//! Menu catalog: menu items indexed by item code.

use crate::error::{Error, Result};
use crate::index::{BalancedIndex, Patch};
use crate::types::{MenuItem, MenuItemPatch};

/// Menu items keyed by `code`.
///
/// ## Example
///
/// ```
/// use bistro::service::MenuCatalog;
/// use bistro::types::MenuItem;
/// use rust_decimal::Decimal;
///
/// let mut catalog = MenuCatalog::new();
///
/// // Code 0 asks the catalog to pick the next free code
/// let code = catalog.register(MenuItem::new(0, "Pastel", "Cheese pastry", Decimal::new(700, 2), 12)).unwrap();
///
/// assert_eq!(code, 1);
/// assert_eq!(catalog.get(code).map(|item| item.stock), Some(12));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MenuCatalog {
    items: BalancedIndex<u64, MenuItem>,
}

impl MenuCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the catalog from persisted items.
    ///
    /// Items are taken as stored; a repeated code keeps the last record.
    pub fn from_items(items: impl IntoIterator<Item = MenuItem>) -> Self {
        Self {
            items: items.into_iter().map(|item| (item.code, item)).collect(),
        }
    }

    // ========================================================================
    // Read paths
    // ========================================================================

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Code the next auto-assigned item would get
    #[inline]
    pub fn next_code(&self) -> u64 {
        self.items.max_key() + 1
    }

    #[inline]
    pub fn get(&self, code: u64) -> Option<&MenuItem> {
        self.items.search(&code)
    }

    /// All items in ascending code order
    pub fn list(&self) -> Vec<&MenuItem> {
        self.items.traverse_ascending()
    }

    /// Underlying index
    pub fn index(&self) -> &BalancedIndex<u64, MenuItem> {
        &self.items
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Add a new item.
    ///
    /// An item with code 0 gets `max code + 1`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidItem`] if the item fails validation
    /// - [`Error::DuplicateItem`] if the code is taken
    pub fn register(&mut self, mut item: MenuItem) -> Result<u64> {
        item.validate()?;

        if item.code == 0 {
            item.code = self.next_code();
        } else if self.items.contains_key(&item.code) {
            return Err(Error::DuplicateItem(item.code));
        }

        let code = item.code;
        tracing::debug!(code, name = %item.name, "menu item registered");
        self.items.insert(code, item);
        Ok(code)
    }

    /// Merge `patch` into the item with `code`.
    ///
    /// The patched item is validated before anything is written.
    pub fn update(&mut self, code: u64, patch: MenuItemPatch) -> Result<()> {
        let current = self.get(code).ok_or(Error::ItemNotFound(code))?;

        let mut candidate = current.clone();
        patch.clone().apply(&mut candidate);
        candidate.validate()?;

        self.items.update(&code, patch);
        tracing::debug!(code, "menu item updated");
        Ok(())
    }

    /// Remove the item with `code`
    pub fn remove(&mut self, code: u64) -> Result<MenuItem> {
        let item = self.items.remove(&code).ok_or(Error::ItemNotFound(code))?;
        tracing::debug!(code, "menu item removed");
        Ok(item)
    }

    /// Take `quantity` units of `code` out of stock
    pub fn reserve(&mut self, code: u64, quantity: u32) -> Result<()> {
        self.items
            .get_mut(&code)
            .ok_or(Error::ItemNotFound(code))?
            .reserve(quantity)
    }

    /// Put `quantity` units of `code` back into stock
    pub fn restock(&mut self, code: u64, quantity: u32) -> Result<()> {
        self.items
            .get_mut(&code)
            .ok_or(Error::ItemNotFound(code))?
            .restock(quantity);
        Ok(())
    }

    /// Owned copy of every item, ascending by code
    pub fn snapshot(&self) -> Vec<MenuItem> {
        self.items.values().cloned().collect()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
