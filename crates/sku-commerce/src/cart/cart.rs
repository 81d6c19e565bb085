//! The cart entity.

use serde::{Deserialize, Serialize};
use sku_data::Entity;

use crate::cart::LineItem;
use crate::error::CommerceError;
use crate::money::{Currency, Money};

/// A user's shopping cart.
///
/// Each user has at most one live cart, created lazily on first access.
/// Line items are stored serialized in `items_json`; `total_price` is
/// derived from them on every pricing pass, with zero-quantity lines
/// pruned before persisting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    /// Store-assigned key; 0 until committed.
    pub id: i64,
    /// The owning user.
    pub user_id: i64,
    /// Serialized line items.
    pub items_json: String,
    /// Derived total over all line items.
    pub total_price: Money,
}

impl Cart {
    /// An empty cart for a user, not yet persisted.
    pub fn empty(user_id: i64) -> Self {
        Self {
            id: 0,
            user_id,
            items_json: String::new(),
            total_price: Money::zero(Currency::default()),
        }
    }

    /// Deserialize the cart's line items. An empty column is an empty cart.
    pub fn lines(&self) -> Result<Vec<LineItem>, CommerceError> {
        if self.items_json.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&self.items_json)?)
    }

    /// Serialize `lines` into the cart and record the derived total.
    pub fn store_lines(&mut self, lines: &[LineItem], total: Money) -> Result<(), CommerceError> {
        self.items_json = serde_json::to_string(lines)?;
        self.total_price = total;
        Ok(())
    }

    /// Whether the cart holds no line items.
    pub fn is_empty(&self) -> bool {
        match self.lines() {
            Ok(lines) => lines.is_empty(),
            Err(_) => self.items_json.trim().is_empty(),
        }
    }
}

impl Entity for Cart {
    fn id(&self) -> i64 {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = id;
    }

    fn label(&self) -> String {
        format!("cart for user {}", self.user_id)
    }
}
