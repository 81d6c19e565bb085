//! The abstract store the rest of the system mutates through.

use async_trait::async_trait;
use thiserror::Error;

/// An entity owned by a store.
///
/// Keys are store-assigned integers; an id of `0` means "not yet persisted"
/// and is replaced at commit time.
pub trait Entity: Clone + Send + Sync + 'static {
    /// The entity's integer key.
    fn id(&self) -> i64;

    /// Assign the store-issued key.
    fn assign_id(&mut self, id: i64);

    /// Short label used in skip/log messages.
    fn label(&self) -> String;
}

/// Errors raised by a backing store.
///
/// Every store operation can fail transiently; callers are expected to
/// wrap calls in a [`RetryPolicy`](crate::RetryPolicy).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or did not answer.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Staged changes could not be applied.
    #[error("commit failed: {0}")]
    Commit(String),
}

/// A minimal persistence seam: fetch, stage, commit.
///
/// Mutations are staged and only become visible to fetches after
/// [`commit`](Store::commit). Predicates are plain closures supplied by the
/// caller; there is no field-name-driven query building here.
#[async_trait]
pub trait Store<T: Entity>: Send + Sync {
    /// Fetch every committed entity.
    async fn fetch_all(&self) -> Result<Vec<T>, StoreError>;

    /// Fetch one committed entity by key.
    async fn fetch_by_id(&self, id: i64) -> Result<Option<T>, StoreError>;

    /// Fetch all committed entities matching `predicate`.
    async fn fetch_matching(
        &self,
        predicate: &(dyn for<'a> Fn(&'a T) -> bool + Send + Sync),
    ) -> Result<Vec<T>, StoreError>;

    /// Stage new entities for insertion.
    async fn stage_insert(&self, entities: Vec<T>) -> Result<(), StoreError>;

    /// Stage full replacements of already-committed entities, matched by key.
    async fn stage_update(&self, entities: Vec<T>) -> Result<(), StoreError>;

    /// Stage removals by key.
    async fn stage_remove(&self, ids: Vec<i64>) -> Result<(), StoreError>;

    /// Drop all staged changes without applying them.
    ///
    /// A pipeline that retries after a failed [`commit`](Store::commit) must
    /// call this first, or the leftover staging from the failed attempt gets
    /// applied alongside the new one.
    async fn discard_staged(&self) -> Result<(), StoreError>;

    /// Apply all staged changes atomically.
    async fn commit(&self) -> Result<(), StoreError>;
}
