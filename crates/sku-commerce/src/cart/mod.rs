//! Carts, line items, and tiered pricing.

#[allow(clippy::module_inception)]
mod cart;
mod line_item;
mod pricing;
mod service;

pub use cart::Cart;
pub use line_item::LineItem;
pub use pricing::{price_cart, price_line, LinePrice};
pub use service::CartService;
