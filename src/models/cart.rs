//! Session-scoped shopping cart.

use serde::{Deserialize, Serialize};

use super::{Listing, Money};
use crate::error::{AppError, Result};

/// A line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub image_url: String,
    pub title: String,
    pub author: String,
    /// Unit price
    pub price: Money,
    /// Always >= 1
    pub quantity: u32,
    /// Copies in stock when the book was last added
    #[serde(default = "unlimited")]
    pub max_quantity: u32,
}

fn unlimited() -> u32 {
    u32::MAX
}

impl CartItem {
    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }
}

impl From<&Listing> for CartItem {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id.clone(),
            image_url: listing.image_url.clone(),
            title: listing.title.clone(),
            author: listing.author.clone(),
            price: listing.effective_price(),
            quantity: 1,
            max_quantity: listing.stock,
        }
    }
}

/// Cart contents for the current browsing session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a book, or bump its quantity if it is already in the cart.
    pub fn add(&mut self, listing: &Listing) -> Result<()> {
        if !listing.in_stock() {
            return Err(AppError::cart(format!("'{}' is out of stock", listing.title)));
        }
        if let Some(item) = self.find_mut(&listing.id) {
            item.max_quantity = listing.stock;
            if item.quantity >= listing.stock {
                return Err(AppError::cart(format!(
                    "Only {} copies of '{}' available",
                    listing.stock, listing.title
                )));
            }
            item.quantity += 1;
        } else {
            self.items.push(CartItem::from(listing));
        }
        Ok(())
    }

    /// Increase quantity by one. Returns false if the item is not in the
    /// cart or is already at its stock limit.
    pub fn increment(&mut self, id: &str) -> bool {
        match self.find_mut(id) {
            Some(item) if item.quantity < item.max_quantity => {
                item.quantity += 1;
                true
            }
            _ => false,
        }
    }

    /// Decrease quantity by one, never below 1.
    pub fn decrement(&mut self, id: &str) -> bool {
        match self.find_mut(id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_sub(1).max(1);
                true
            }
            None => false,
        }
    }

    /// Remove an item entirely. Returns the removed item.
    pub fn remove(&mut self, id: &str) -> Option<CartItem> {
        let pos = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(pos))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of copies across all lines.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }
}
