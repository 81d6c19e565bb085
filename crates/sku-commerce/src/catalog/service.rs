//! Catalog maintenance over products and offers.

use std::sync::Arc;

use sku_data::{FetchError, RetryPolicy, Store, StoreAccessor};

use crate::bulk::{BulkMutator, UpdateResult};
use crate::cart::LineItem;
use crate::catalog::{select_offer, Offer, Product};

/// Bulk maintenance of the product and offer sets, plus the joined
/// storefront view customers browse.
pub struct StoreCatalog {
    products: BulkMutator<Product>,
    offers: BulkMutator<Offer>,
}

impl Clone for StoreCatalog {
    fn clone(&self) -> Self {
        Self {
            products: self.products.clone(),
            offers: self.offers.clone(),
        }
    }
}

impl StoreCatalog {
    /// Build a catalog over the given product and offer stores.
    pub fn new(products: Arc<dyn Store<Product>>, offers: Arc<dyn Store<Offer>>) -> Self {
        Self {
            products: BulkMutator::new(StoreAccessor::new(products)),
            offers: BulkMutator::new(StoreAccessor::new(offers)),
        }
    }

    /// Override the retry policy for every catalog operation.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.products = BulkMutator::new(self.products.accessor().clone().with_policy(policy.clone()))
            .with_policy(policy.clone());
        self.offers = BulkMutator::new(self.offers.accessor().clone().with_policy(policy.clone()))
            .with_policy(policy);
        self
    }

    /// The full committed product set.
    pub async fn products(&self) -> Result<Vec<Product>, FetchError> {
        self.products.accessor().fetch_all().await
    }

    /// One product by key. `Ok(None)` means no such product.
    pub async fn product(&self, id: i64) -> Result<Option<Product>, FetchError> {
        self.products.accessor().fetch_by_id(id).await
    }

    /// The full committed offer set.
    pub async fn offers(&self) -> Result<Vec<Offer>, FetchError> {
        self.offers.accessor().fetch_all().await
    }

    /// All offers targeting one product.
    pub async fn offers_for_product(&self, product_id: i64) -> Result<Vec<Offer>, FetchError> {
        self.offers
            .accessor()
            .fetch_matching(move |o: &Offer| o.product_id == product_id)
            .await
    }

    /// The storefront view: every product joined with its selected offer,
    /// as zero-quantity line items.
    ///
    /// Browsing should survive a flaky store, so an unavailable backend
    /// degrades to an empty storefront rather than an error.
    pub async fn store_front(&self) -> Vec<LineItem> {
        let products = match self.products().await {
            Ok(products) => products,
            Err(err) => {
                tracing::error!(error = %err, "storefront unavailable");
                return Vec::new();
            }
        };
        let offers = match self.offers().await {
            Ok(offers) => offers,
            Err(err) => {
                tracing::error!(error = %err, "storefront unavailable");
                return Vec::new();
            }
        };

        products
            .iter()
            .map(|product| LineItem::snapshot(product, select_offer(&offers, product.id), 0))
            .collect()
    }

    /// Add a batch of products, skipping invalid and duplicate rows.
    pub async fn add_products(&self, candidates: &[Product]) -> UpdateResult<Vec<Product>> {
        self.products
            .add(
                candidates,
                &Product::required_fields(),
                &Product::unique_fields(),
            )
            .await
    }

    /// Add a batch of offers, skipping invalid and duplicate rows.
    pub async fn add_offers(&self, candidates: &[Offer]) -> UpdateResult<Vec<Offer>> {
        self.offers
            .add(candidates, &Offer::required_fields(), &Offer::unique_fields())
            .await
    }

    /// Delete products by id, cascading to their offers.
    ///
    /// Offers on the deleted products go first so no offer is ever left
    /// pointing at a missing product. The payload is the refreshed
    /// storefront.
    pub async fn delete_products(&self, ids: &[i64]) -> UpdateResult<Vec<LineItem>> {
        let orphaned = match self
            .offers
            .accessor()
            .fetch_matching(|o: &Offer| ids.contains(&o.product_id))
            .await
        {
            Ok(orphaned) => orphaned,
            Err(err) => {
                tracing::error!(error = %err, "could not resolve offers for deleted products");
                return UpdateResult::failed("error deleting entities");
            }
        };

        if !orphaned.is_empty() {
            let offer_ids: Vec<i64> = orphaned.iter().map(|o| o.id).collect();
            let cascade = self.offers.delete(&offer_ids).await;
            if !cascade.success {
                return UpdateResult::failed(cascade.message);
            }
        }

        let result = self.products.delete(ids).await;
        UpdateResult {
            success: result.success,
            payload: Some(self.store_front().await),
            message: result.message,
        }
    }

    /// Delete offers by id.
    pub async fn delete_offers(&self, ids: &[i64]) -> UpdateResult<Vec<Offer>> {
        self.offers.delete(ids).await
    }
}
