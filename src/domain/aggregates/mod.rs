//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;

pub use product::{resolve_variation, Product, ProductStatus, Variation, VariationSelection};
pub use order::{LineItem, Order, OrderError, OrderStatus, ShippingAddress};
pub use cart::{Cart, CartError, CartItem};
