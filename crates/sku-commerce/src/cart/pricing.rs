//! Tiered offer pricing.

use crate::cart::LineItem;
use crate::error::CommerceError;
use crate::money::{Currency, Money};

/// Result of pricing one line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePrice {
    /// Total for the line.
    pub total: Money,
    /// How many whole bundles the offer covered.
    pub offers_applied: i64,
}

/// Price one line under an optional "every N units cost P" offer.
///
/// Without an offer, or below the threshold, the line costs
/// `unit_price * quantity`. An offer whose bundle price is absent is
/// treated the same way, with a warning: a missing price must never turn
/// into a free bundle.
pub fn price_line(
    unit_price: Money,
    quantity: i64,
    offer_quantity: Option<i64>,
    offer_price: Option<Money>,
) -> Result<LinePrice, CommerceError> {
    let full_price = unit_price
        .try_multiply(quantity)
        .ok_or(CommerceError::Overflow)?;

    let threshold = match offer_quantity {
        Some(t) if t > 0 && quantity >= t => t,
        _ => {
            return Ok(LinePrice {
                total: full_price,
                offers_applied: 0,
            })
        }
    };

    let Some(bundle_price) = offer_price else {
        tracing::warn!(
            %unit_price,
            quantity,
            threshold,
            "offer has no bundle price; charging full unit price"
        );
        return Ok(LinePrice {
            total: full_price,
            offers_applied: 0,
        });
    };

    let offers_applied = quantity / threshold;
    let remainder = quantity % threshold;

    let bundles = bundle_price
        .try_multiply(offers_applied)
        .ok_or(CommerceError::Overflow)?;
    let rest = unit_price
        .try_multiply(remainder)
        .ok_or(CommerceError::Overflow)?;
    let total = add_monies(bundles, rest)?;

    Ok(LinePrice {
        total,
        offers_applied,
    })
}

/// Price a whole cart, mutating each line's `offers_applied` in place.
///
/// Lines with quantity <= 0 are excluded entirely: they contribute nothing
/// to the total and their `offers_applied` is left untouched. Lines that
/// carry no offer keep `offers_applied` as `None`, never zero.
pub fn price_cart(lines: &mut [LineItem]) -> Result<Money, CommerceError> {
    let currency = lines
        .iter()
        .find(|line| line.quantity > 0)
        .map(|line| line.unit_price.currency)
        .unwrap_or(Currency::default());

    let mut total = Money::zero(currency);
    for line in lines.iter_mut().filter(|line| line.quantity > 0) {
        let priced = price_line(
            line.unit_price,
            line.quantity,
            line.offer_quantity,
            line.offer_price,
        )?;
        total = add_monies(total, priced.total)?;

        if line.offer_quantity.is_some() {
            line.offers_applied = Some(priced.offers_applied);
        }
    }

    Ok(total)
}

fn add_monies(a: Money, b: Money) -> Result<Money, CommerceError> {
    a.try_add(&b).ok_or_else(|| {
        if a.currency != b.currency {
            CommerceError::CurrencyMismatch {
                expected: a.currency.code().to_string(),
                got: b.currency.code().to_string(),
            }
        } else {
            CommerceError::Overflow
        }
    })
}
