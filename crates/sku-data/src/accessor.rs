//! Retry-wrapped fetch operations over a [`Store`].

use std::sync::Arc;

use thiserror::Error;

use crate::retry::{RetryError, RetryPolicy};
use crate::store::{Entity, Store, StoreError};

/// A fetch that never got an answer from the store.
///
/// "Not found" is *not* an error here: `fetch_by_id` returns `Ok(None)` for a
/// missing row and reserves `Err` for retry exhaustion, so the two cases stay
/// distinguishable.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The store did not answer within the retry budget.
    #[error("store did not answer after {attempts} attempts: {last}")]
    Unavailable {
        /// Attempts made before giving up.
        attempts: u32,
        /// The final store error.
        last: StoreError,
    },
}

impl From<RetryError<StoreError>> for FetchError {
    fn from(err: RetryError<StoreError>) -> Self {
        match err {
            RetryError::Exhausted { attempts, last }
            | RetryError::DeadlineExceeded { attempts, last } => {
                FetchError::Unavailable { attempts, last }
            }
        }
    }
}

/// Read access to a store, with every call wrapped in a [`RetryPolicy`].
pub struct StoreAccessor<T: Entity> {
    store: Arc<dyn Store<T>>,
    policy: RetryPolicy,
}

impl<T: Entity> Clone for StoreAccessor<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy.clone(),
        }
    }
}

impl<T: Entity> StoreAccessor<T> {
    /// Wrap a store with the default store retry policy.
    pub fn new(store: Arc<dyn Store<T>>) -> Self {
        Self {
            store,
            policy: RetryPolicy::store_default(),
        }
    }

    /// Override the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The underlying store, for staging mutations.
    pub fn store(&self) -> &Arc<dyn Store<T>> {
        &self.store
    }

    /// The retry policy in use.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch the full committed set.
    pub async fn fetch_all(&self) -> Result<Vec<T>, FetchError> {
        let store = &self.store;
        self.policy
            .run(|| store.fetch_all())
            .await
            .map_err(FetchError::from)
    }

    /// Fetch one entity by key. `Ok(None)` means the entity does not exist.
    pub async fn fetch_by_id(&self, id: i64) -> Result<Option<T>, FetchError> {
        let store = &self.store;
        self.policy
            .run(|| store.fetch_by_id(id))
            .await
            .map_err(FetchError::from)
    }

    /// Fetch all entities matching a caller-supplied predicate.
    pub async fn fetch_matching<P>(&self, predicate: P) -> Result<Vec<T>, FetchError>
    where
        P: Fn(&T) -> bool + Send + Sync,
    {
        let store = &self.store;
        self.policy
            .run(|| store.fetch_matching(&predicate))
            .await
            .map_err(FetchError::from)
    }
}
