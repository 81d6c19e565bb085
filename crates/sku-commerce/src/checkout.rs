//! Orders: immutable checkout snapshots of a cart.

use serde::{Deserialize, Serialize};
use sku_data::Entity;

use crate::cart::{Cart, LineItem};
use crate::error::CommerceError;
use crate::money::Money;

/// An order placed by a user.
///
/// Snapshotted from the cart at checkout time and never mutated afterwards.
/// A user has an order for every past checkout and at most one live cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Store-assigned key; 0 until committed.
    pub id: i64,
    /// The ordering user.
    pub user_id: i64,
    /// Serialized line items, copied verbatim from the cart.
    pub items_json: String,
    /// Total at checkout time.
    pub total_price: Money,
    /// Unix timestamp of checkout.
    pub placed_at: i64,
}

impl Order {
    /// Snapshot a cart into an order.
    pub fn from_cart(cart: &Cart) -> Self {
        Self {
            id: 0,
            user_id: cart.user_id,
            items_json: cart.items_json.clone(),
            total_price: cart.total_price,
            placed_at: current_timestamp(),
        }
    }

    /// Deserialize the order's line items.
    pub fn lines(&self) -> Result<Vec<LineItem>, CommerceError> {
        if self.items_json.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&self.items_json)?)
    }
}

impl Entity for Order {
    fn id(&self) -> i64 {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = id;
    }

    fn label(&self) -> String {
        format!("order for user {}", self.user_id)
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_order_snapshots_the_cart() {
        let mut cart = Cart::empty(4);
        cart.items_json = r#"[{"product_id":1,"name":"A","unit_price":{"amount_cents":5000,"currency":"USD"},"quantity":3,"offer_quantity":3,"offer_price":{"amount_cents":13000,"currency":"USD"},"offers_applied":1}]"#.to_string();
        cart.total_price = Money::new(13000, Currency::USD);

        let order = Order::from_cart(&cart);

        assert_eq!(order.user_id, 4);
        assert_eq!(order.items_json, cart.items_json);
        assert_eq!(order.total_price, cart.total_price);
        assert!(order.placed_at > 0);
        assert_eq!(order.lines().unwrap().len(), 1);
    }
}
