//! Product and offer catalog.

mod offer;
mod product;
mod service;

pub use offer::{select_offer, Offer};
pub use product::Product;
pub use service::StoreCatalog;
