//! Cart aggregate.
//!
//! The cart is client-held and never persisted; it travels with the checkout
//! request as a snapshot and is destroyed once an order is placed. Unit
//! prices inside it are display snapshots only, the server reprices every
//! line from the catalog before charging.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::aggregates::product::VariationSelection;
use crate::domain::value_objects::Money;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: Uuid,
    pub selection: Option<VariationSelection>,
    pub name: String,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub unit_price: Money,
}

impl CartItem {
    pub fn line_total(&self) -> Money { self.unit_price.multiply(self.quantity) }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
    subtotal: Money,
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn subtotal(&self) -> &Money { &self.subtotal }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Total units across all lines.
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Adding the same product + variation combination merges quantities
    /// instead of duplicating the line.
    pub fn add_item(&mut self, item: CartItem) -> Result<(), CartError> {
        if item.quantity == 0 { return Err(CartError::ZeroQuantity); }
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == item.product_id && i.selection == item.selection) {
            existing.quantity += item.quantity;
        } else {
            self.items.push(item);
        }
        self.recalculate();
        Ok(())
    }

    pub fn update_quantity(&mut self, product_id: Uuid, selection: Option<&VariationSelection>, quantity: u32) -> Result<(), CartError> {
        let matches = |i: &CartItem| i.product_id == product_id && i.selection.as_ref() == selection;
        if !self.items.iter().any(|i| matches(i)) {
            return Err(CartError::ItemNotFound);
        }
        if quantity == 0 {
            self.items.retain(|i| !matches(i));
        } else if let Some(item) = self.items.iter_mut().find(|i| matches(i)) {
            item.quantity = quantity;
        }
        self.recalculate();
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: Uuid, selection: Option<&VariationSelection>) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| !(i.product_id == product_id && i.selection.as_ref() == selection));
        if self.items.len() == before { return Err(CartError::ItemNotFound); }
        self.recalculate();
        Ok(())
    }

    pub fn clear(&mut self) { self.items.clear(); self.recalculate(); }

    fn recalculate(&mut self) {
        self.subtotal = self.items.iter().fold(Money::default(), |acc, i| acc.add(&i.line_total()).unwrap_or(acc));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CartError { ItemNotFound, ZeroQuantity }
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemNotFound => write!(f, "Item not found"),
            Self::ZeroQuantity => write!(f, "Quantity must be at least 1"),
        }
    }
}
