//! Resilient storage access for the SKU store.
//!
//! This crate provides:
//! - `RetryPolicy` - bounded, non-blocking retry with backoff and deadline
//! - `Store` - the abstract persistence seam (fetch, stage, commit)
//! - `StoreAccessor` - retry-wrapped fetches that keep "not found" and
//!   "store never answered" distinct
//! - `MemoryStore` - an in-memory store with atomic commits and fault
//!   injection for tests

mod accessor;
mod memory;
mod retry;
mod store;

pub use accessor::{FetchError, StoreAccessor};
pub use memory::MemoryStore;
pub use retry::{BackoffStrategy, RetryError, RetryPolicy};
pub use store::{Entity, Store, StoreError};
