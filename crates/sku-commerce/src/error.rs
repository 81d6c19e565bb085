//! Commerce error types.

use sku_data::{FetchError, StoreError};
use thiserror::Error;

/// Errors that can occur in commerce operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// The backing store never answered.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A cart could not be loaded or created for a user.
    #[error("no cart available for user {0}")]
    CartUnavailable(i64),

    /// Currency mismatch.
    #[error("currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow in a money calculation.
    #[error("arithmetic overflow in money calculation")]
    Overflow,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Seeding the store failed.
    #[error("seed failed: {0}")]
    Seed(String),
}

impl From<FetchError> for CommerceError {
    fn from(e: FetchError) -> Self {
        CommerceError::StoreUnavailable(e.to_string())
    }
}

impl From<StoreError> for CommerceError {
    fn from(e: StoreError) -> Self {
        CommerceError::StoreUnavailable(e.to_string())
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::Serialization(e.to_string())
    }
}
