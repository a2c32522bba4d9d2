//! Menu item records.
//!
//! A [`MenuItem`] is keyed in the catalog index by its `code`. Partial edits
//! go through [`MenuItemPatch`], which only overwrites the fields it carries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::index::Patch;

// ============================================================================
// MenuItem struct
// ============================================================================

/// A dish or drink on the menu.
///
/// ## Example
///
/// ```
/// use bistro::types::MenuItem;
/// use rust_decimal::Decimal;
///
/// let item = MenuItem::new(
///     1,                        // code
///     "Coxinha",                // name
///     "Chicken croquette",      // description
///     Decimal::new(650, 2),     // price: 6.50
///     40,                       // stock
/// );
/// assert!(item.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Item code, the catalog key (0 = assign on registration)
    pub code: u64,

    /// Display name
    pub name: String,

    /// Short description
    pub description: String,

    /// Unit price
    pub price: Decimal,

    /// Units available for new orders
    pub stock: u32,
}

impl MenuItem {
    /// Create a new menu item
    pub fn new(
        code: u64,
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        stock: u32,
    ) -> Self {
        Self {
            code,
            name: name.into(),
            description: description.into(),
            price,
            stock,
        }
    }

    /// Check the fields a registered item must satisfy
    ///
    /// Name and description must not be blank and the price must not be
    /// negative.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidItem("name must not be empty".into()));
        }
        if self.description.trim().is_empty() {
            return Err(Error::InvalidItem("description must not be empty".into()));
        }
        if self.price.is_sign_negative() {
            return Err(Error::InvalidItem(format!("negative price {}", self.price)));
        }
        Ok(())
    }

    /// Check if at least `quantity` units are in stock
    #[inline]
    pub fn has_stock(&self, quantity: u64) -> bool {
        u64::from(self.stock) >= quantity
    }

    /// Take `quantity` units out of stock
    ///
    /// # Errors
    ///
    /// [`Error::InsufficientStock`] if fewer units are available; stock is
    /// left unchanged.
    pub fn reserve(&mut self, quantity: u32) -> Result<()> {
        if self.stock < quantity {
            return Err(Error::InsufficientStock {
                code: self.code,
                requested: u64::from(quantity),
                available: self.stock,
            });
        }
        self.stock -= quantity;
        Ok(())
    }

    /// Put `quantity` units back into stock
    #[inline]
    pub fn restock(&mut self, quantity: u32) {
        self.stock = self.stock.saturating_add(quantity);
    }
}

// ============================================================================
// MenuItemPatch
// ============================================================================

/// Partial edit of a [`MenuItem`]; `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<u32>,
}

impl MenuItemPatch {
    /// Patch that only sets the stock
    pub fn stock(stock: u32) -> Self {
        Self {
            stock: Some(stock),
            ..Self::default()
        }
    }

    /// Patch that only sets the price
    pub fn price(price: Decimal) -> Self {
        Self {
            price: Some(price),
            ..Self::default()
        }
    }

    /// Check if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
    }
}

impl Patch<MenuItem> for MenuItemPatch {
    fn apply(self, target: &mut MenuItem) {
        if let Some(name) = self.name {
            target.name = name;
        }
        if let Some(description) = self.description {
            target.description = description;
        }
        if let Some(price) = self.price {
            target.price = price;
        }
        if let Some(stock) = self.stock {
            target.stock = stock;
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
