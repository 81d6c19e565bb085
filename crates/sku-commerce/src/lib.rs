//! Commerce domain types and services for the sku store.
//!
//! This crate builds the store's behavior on top of the retrying store
//! layer in `sku-data`:
//!
//! - **Bulk**: validate, dedupe, persist, and retry entity batches
//! - **Catalog**: products, tiered multi-buy offers, the storefront join
//! - **Cart**: one lazy cart per user, offer-aware pricing
//! - **Checkout**: orders snapshotted from carts
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sku_commerce::prelude::*;
//! use sku_data::{MemoryStore, Store};
//!
//! let products = Arc::new(MemoryStore::new()) as Arc<dyn Store<Product>>;
//! let offers = Arc::new(MemoryStore::new()) as Arc<dyn Store<Offer>>;
//! let catalog = StoreCatalog::new(products, offers);
//!
//! catalog
//!     .add_products(&[Product::new("A", Money::new(5000, Currency::USD))])
//!     .await;
//!
//! for line in catalog.store_front().await {
//!     println!("{}: {}", line.name, line.unit_price.display());
//! }
//! ```

pub mod error;
pub mod money;

pub mod bulk;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod seed;
pub mod user;

pub use error::CommerceError;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::money::{Currency, Money};

    pub use crate::bulk::{BulkMutator, FieldSpec, FieldValue, UpdateResult};
    pub use crate::cart::{price_cart, price_line, Cart, CartService, LineItem, LinePrice};
    pub use crate::catalog::{select_offer, Offer, Product, StoreCatalog};
    pub use crate::checkout::Order;
    pub use crate::seed::seed_demo_store;
    pub use crate::user::User;
}
