//! Demo catalog seeding.

use crate::bulk::BulkMutator;
use crate::catalog::{Offer, Product, StoreCatalog};
use crate::error::CommerceError;
use crate::money::{Currency, Money};
use crate::user::User;

/// Seed the classic demo catalog: four products, two multi-buy offers,
/// and an admin user.
///
/// Safe to run repeatedly: rows already present are skipped as duplicates,
/// so a restart never doubles the catalog.
pub async fn seed_demo_store(
    catalog: &StoreCatalog,
    users: &BulkMutator<User>,
) -> Result<(), CommerceError> {
    let usd = |cents| Money::new(cents, Currency::USD);

    let added = catalog
        .add_products(&[
            Product::new("A", usd(5000)),
            Product::new("B", usd(3000)),
            Product::new("C", usd(2000)),
            Product::new("D", usd(1500)),
        ])
        .await;
    if !added.success {
        return Err(CommerceError::Seed(added.message));
    }

    let products = added.payload.unwrap_or_default();
    let id_of = |name: &str| {
        products
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.id)
            .ok_or_else(|| CommerceError::Seed(format!("seeded product '{name}' missing")))
    };

    let offers = catalog
        .add_offers(&[
            Offer::new(id_of("A")?, 3, usd(13000)),
            Offer::new(id_of("B")?, 2, usd(4500)),
        ])
        .await;
    if !offers.success {
        return Err(CommerceError::Seed(offers.message));
    }

    // Placeholder credential; real deployments replace it before exposure.
    let admin = User::new("admin", "unset-password-hash");
    let users_added = users
        .add(&[admin], &User::required_fields(), &User::unique_fields())
        .await;
    if !users_added.success {
        return Err(CommerceError::Seed(users_added.message));
    }

    tracing::info!("demo store seeded");
    Ok(())
}
