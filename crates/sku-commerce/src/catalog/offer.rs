//! Tiered offers: "every N units of a product cost a fixed bundle price".

use serde::{Deserialize, Serialize};
use sku_data::Entity;

use crate::bulk::{FieldSpec, FieldValue};
use crate::money::Money;

/// A tiered multi-buy offer on one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// Store-assigned key; 0 until committed.
    pub id: i64,
    /// The product this offer applies to.
    pub product_id: i64,
    /// Threshold quantity: the offer applies per this many units.
    pub quantity: i64,
    /// Price for each bundle of `quantity` units.
    pub offer_price: Money,
}

impl Offer {
    /// Create an offer not yet persisted.
    pub fn new(product_id: i64, quantity: i64, offer_price: Money) -> Self {
        Self {
            id: 0,
            product_id,
            quantity,
            offer_price,
        }
    }

    /// Fields a candidate must carry to be inserted.
    pub fn required_fields() -> [FieldSpec<Offer>; 3] {
        [
            FieldSpec {
                name: "product_id",
                get: |o| FieldValue::Int(o.product_id),
            },
            FieldSpec {
                name: "quantity",
                get: |o| FieldValue::Int(o.quantity),
            },
            FieldSpec {
                name: "offer_price",
                get: |o| FieldValue::Money(o.offer_price.amount_cents),
            },
        ]
    }

    /// Fields whose equality marks a candidate as a duplicate.
    pub fn unique_fields() -> [FieldSpec<Offer>; 1] {
        [FieldSpec {
            name: "product_id",
            get: |o| FieldValue::Int(o.product_id),
        }]
    }
}

impl Entity for Offer {
    fn id(&self) -> i64 {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = id;
    }

    fn label(&self) -> String {
        format!("offer on product {}", self.product_id)
    }
}

/// Pick the offer to apply for a product.
///
/// When several offers target the same product, the one with the lowest
/// effective per-unit bundle price wins; ties break on the lowest offer id.
/// Offers with a non-positive threshold are never selected.
pub fn select_offer(offers: &[Offer], product_id: i64) -> Option<&Offer> {
    offers
        .iter()
        .filter(|o| o.product_id == product_id && o.quantity > 0)
        .min_by(|a, b| {
            let a_rate = a.offer_price.amount_cents as i128 * b.quantity as i128;
            let b_rate = b.offer_price.amount_cents as i128 * a.quantity as i128;
            a_rate.cmp(&b_rate).then_with(|| a.id.cmp(&b.id))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn offer(id: i64, product_id: i64, quantity: i64, price_cents: i64) -> Offer {
        Offer {
            id,
            product_id,
            quantity,
            offer_price: Money::new(price_cents, Currency::USD),
        }
    }

    #[test]
    fn test_select_offer_ignores_other_products() {
        let offers = [offer(1, 7, 3, 1000)];
        assert!(select_offer(&offers, 8).is_none());
        assert_eq!(select_offer(&offers, 7).map(|o| o.id), Some(1));
    }

    #[test]
    fn test_select_offer_prefers_cheapest_per_unit() {
        // 3 for $10 (333c/unit) vs 2 for $5 (250c/unit).
        let offers = [offer(1, 7, 3, 1000), offer(2, 7, 2, 500)];
        assert_eq!(select_offer(&offers, 7).map(|o| o.id), Some(2));
    }

    #[test]
    fn test_select_offer_tie_breaks_on_lowest_id() {
        // Both 200c/unit.
        let offers = [offer(5, 7, 2, 400), offer(3, 7, 4, 800)];
        assert_eq!(select_offer(&offers, 7).map(|o| o.id), Some(3));
    }

    #[test]
    fn test_select_offer_skips_degenerate_thresholds() {
        let offers = [offer(1, 7, 0, 100)];
        assert!(select_offer(&offers, 7).is_none());
    }
}
