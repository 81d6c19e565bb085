//! Cart lifecycle: lazy creation, quantity updates, and checkout.

use std::sync::Arc;

use sku_data::{FetchError, RetryPolicy, Store, StoreAccessor};

use crate::bulk::{BulkMutator, UpdateResult};
use crate::cart::{price_cart, Cart, LineItem};
use crate::catalog::{select_offer, Offer, Product};
use crate::checkout::Order;
use crate::error::CommerceError;

/// A user's cart and order operations against the backing stores.
///
/// Each user has at most one live cart, created lazily the first time it is
/// asked for. Cart updates re-resolve products and offers from the catalog
/// stores so a line item never outlives a price change.
pub struct CartService {
    carts: BulkMutator<Cart>,
    orders: BulkMutator<Order>,
    products: StoreAccessor<Product>,
    offers: StoreAccessor<Offer>,
    policy: RetryPolicy,
}

impl Clone for CartService {
    fn clone(&self) -> Self {
        Self {
            carts: self.carts.clone(),
            orders: self.orders.clone(),
            products: self.products.clone(),
            offers: self.offers.clone(),
            policy: self.policy.clone(),
        }
    }
}

impl CartService {
    /// Build a cart service over the four backing stores.
    pub fn new(
        carts: Arc<dyn Store<Cart>>,
        orders: Arc<dyn Store<Order>>,
        products: Arc<dyn Store<Product>>,
        offers: Arc<dyn Store<Offer>>,
    ) -> Self {
        Self {
            carts: BulkMutator::new(StoreAccessor::new(carts)),
            orders: BulkMutator::new(StoreAccessor::new(orders)),
            products: StoreAccessor::new(products),
            offers: StoreAccessor::new(offers),
            policy: RetryPolicy::store_default(),
        }
    }

    /// Override the retry policy for every cart operation.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.carts = BulkMutator::new(self.carts.accessor().clone().with_policy(policy.clone()))
            .with_policy(policy.clone());
        self.orders = BulkMutator::new(self.orders.accessor().clone().with_policy(policy.clone()))
            .with_policy(policy.clone());
        self.products = self.products.with_policy(policy.clone());
        self.offers = self.offers.with_policy(policy.clone());
        self.policy = policy;
        self
    }

    /// The user's live cart, creating an empty one on first access.
    pub async fn cart_for(&self, user_id: i64) -> Result<Cart, CommerceError> {
        if let Some(cart) = self.find_cart(user_id).await? {
            return Ok(cart);
        }

        let store = self.carts.accessor().store();
        self.policy
            .run(|| {
                let row = Cart::empty(user_id);
                async move {
                    store.discard_staged().await?;
                    store.stage_insert(vec![row]).await?;
                    store.commit().await
                }
            })
            .await
            .map_err(|err| CommerceError::StoreUnavailable(err.to_string()))?;

        self.find_cart(user_id)
            .await?
            .ok_or(CommerceError::CartUnavailable(user_id))
    }

    async fn find_cart(&self, user_id: i64) -> Result<Option<Cart>, FetchError> {
        let mut matches = self
            .carts
            .accessor()
            .fetch_matching(move |c: &Cart| c.user_id == user_id)
            .await?;
        Ok(if matches.is_empty() {
            None
        } else {
            Some(matches.remove(0))
        })
    }

    /// Set requested quantities in the user's cart and re-price it.
    ///
    /// Each request sets a line's quantity outright, adding the line if the
    /// cart has none for that product. Lines set to zero are pruned; unknown
    /// products are skipped with a note. The payload is the re-priced cart.
    pub async fn put_products(&self, user_id: i64, requests: &[LineItem]) -> UpdateResult<Cart> {
        let outcome = self
            .policy
            .run(|| self.try_put_products(user_id, requests))
            .await;

        match outcome {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(error = %err.last(), "cart update never completed");
                UpdateResult::failed("error updating cart")
            }
        }
    }

    async fn try_put_products(
        &self,
        user_id: i64,
        requests: &[LineItem],
    ) -> Result<UpdateResult<Cart>, CommerceError> {
        let mut cart = self.cart_for(user_id).await?;
        let mut lines = cart.lines()?;
        let products = self.products.fetch_all().await?;
        let offers = self.offers.fetch_all().await?;

        let mut notes: Vec<String> = Vec::new();
        for request in requests {
            if request.quantity < 0 {
                notes.push(format!(
                    "skipped product {} - negative quantity",
                    request.product_id
                ));
                continue;
            }

            let product = products.iter().find(|p| {
                p.id == request.product_id
                    || (!request.name.trim().is_empty() && p.name == request.name)
            });
            let Some(product) = product else {
                notes.push(format!("cannot find product with id {}", request.product_id));
                continue;
            };

            match lines.iter_mut().find(|l| l.product_id == product.id) {
                Some(line) => line.quantity = request.quantity,
                None => lines.push(LineItem::snapshot(
                    product,
                    select_offer(&offers, product.id),
                    request.quantity,
                )),
            }
        }

        lines.retain(|line| line.quantity > 0);
        let total = price_cart(&mut lines)?;
        cart.store_lines(&lines, total)?;

        let store = self.carts.accessor().store();
        store.discard_staged().await?;
        store.stage_update(vec![cart.clone()]).await?;
        store.commit().await?;

        tracing::info!(user_id, total = %total.display(), "cart updated");
        Ok(UpdateResult::succeeded(cart, notes.join("\n")))
    }

    /// Every order the user has placed.
    pub async fn orders_for(&self, user_id: i64) -> Result<Vec<Order>, FetchError> {
        self.orders
            .accessor()
            .fetch_matching(move |o: &Order| o.user_id == user_id)
            .await
    }

    /// Turn the user's cart into an order.
    ///
    /// The cart is deleted first and the order inserted second; if the
    /// insert fails after the delete, the failure is reported and the cart
    /// is gone. An empty cart cannot be checked out.
    pub async fn checkout(&self, user_id: i64) -> UpdateResult<Order> {
        let cart = match self.cart_for(user_id).await {
            Ok(cart) => cart,
            Err(err) => {
                tracing::error!(error = %err, user_id, "checkout could not fetch the cart");
                return UpdateResult::failed("couldn't fetch cart");
            }
        };

        if cart.is_empty() {
            return UpdateResult::failed("no cart items");
        }

        let mut placed = Order::from_cart(&cart);

        let removal = self.carts.delete(&[cart.id]).await;
        if !removal.success {
            return UpdateResult::failed("couldn't delete cart");
        }

        let added = self.orders.add(&[placed.clone()], &[], &[]).await;
        if !added.success {
            return UpdateResult::failed("couldn't add order");
        }

        // Return the snapshot we built, with the store-assigned key picked
        // out of the committed set by content rather than by highest id.
        if let Some(row) = added.payload.into_iter().flatten().find(|o| {
            o.user_id == placed.user_id
                && o.placed_at == placed.placed_at
                && o.items_json == placed.items_json
        }) {
            placed.id = row.id;
        }

        tracing::info!(user_id, order_id = placed.id, "order placed");
        UpdateResult::succeeded(placed, "")
    }
}
