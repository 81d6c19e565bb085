//! Cart line items.

use serde::{Deserialize, Serialize};

use crate::catalog::{Offer, Product};
use crate::money::Money;

/// One product's quantity plus its resolved offer snapshot.
///
/// Line items are ephemeral: they are rebuilt from the live product and
/// offer sets on every pricing pass and never own the underlying rows.
/// `offers_applied` stays `None` for lines that carry no offer at all; it
/// only becomes `Some` (possibly zero) when an offer exists for the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// The product's key.
    pub product_id: i64,
    /// Product name at snapshot time.
    pub name: String,
    /// Price per unit at snapshot time.
    pub unit_price: Money,
    /// Requested quantity.
    pub quantity: i64,
    /// Offer threshold quantity, if the product has an offer.
    pub offer_quantity: Option<i64>,
    /// Offer bundle price, if the product has an offer.
    pub offer_price: Option<Money>,
    /// How many times the offer applied in the last pricing pass.
    pub offers_applied: Option<i64>,
}

impl LineItem {
    /// Snapshot a product and its selected offer into a line item.
    pub fn snapshot(product: &Product, offer: Option<&Offer>, quantity: i64) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            offer_quantity: offer.map(|o| o.quantity),
            offer_price: offer.map(|o| o.offer_price),
            offers_applied: offer.map(|_| 0),
        }
    }

    /// A bare request line: just a product reference and a quantity.
    ///
    /// Useful for callers that only know what they want, not its price.
    pub fn request(product_id: i64, quantity: i64) -> Self {
        Self {
            product_id,
            name: String::new(),
            unit_price: Money::default(),
            quantity,
            offer_quantity: None,
            offer_price: None,
            offers_applied: None,
        }
    }
}
