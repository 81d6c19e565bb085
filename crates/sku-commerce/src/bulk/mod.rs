//! Bulk mutation engine.
//!
//! Validates, deduplicates, persists, and retries collections of entities
//! against a backing store, reporting an aggregate [`UpdateResult`] per
//! batch. Rows that fail validation or duplicate an existing entity are
//! skipped and logged, never fatal: a batch where every row was skipped is
//! still a successful batch.

mod dedupe;
mod validate;

pub use validate::{FieldSpec, FieldValue};

use sku_data::{Entity, FetchError, RetryPolicy, StoreAccessor, StoreError};
use thiserror::Error;

/// Aggregate outcome of one bulk operation.
#[derive(Debug, Clone)]
pub struct UpdateResult<P> {
    /// True if the store ended in the intended state, even when some
    /// candidate rows were skipped.
    pub success: bool,
    /// The resulting collection, when the operation could re-fetch it.
    pub payload: Option<P>,
    /// Human-readable log of per-row skip reasons and totals.
    pub message: String,
}

impl<P> UpdateResult<P> {
    /// A successful result carrying a payload.
    pub fn succeeded(payload: P, message: impl Into<String>) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            message: message.into(),
        }
    }

    /// A failed result with no payload.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: None,
            message: message.into(),
        }
    }
}

/// Accumulates per-row skip reasons for the result message.
pub(crate) struct MessageLog {
    lines: Vec<String>,
}

impl MessageLog {
    pub(crate) fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub(crate) fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub(crate) fn join(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Error)]
enum BulkError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Generic add/delete of entity collections against a store.
///
/// The whole pipeline of each operation (validate, dedupe, stage, commit,
/// re-fetch) runs inside the outer retry policy, so a transient store fault
/// at any stage restarts the pipeline rather than corrupting the batch.
pub struct BulkMutator<T: Entity> {
    accessor: StoreAccessor<T>,
    policy: RetryPolicy,
}

impl<T: Entity> Clone for BulkMutator<T> {
    fn clone(&self) -> Self {
        Self {
            accessor: self.accessor.clone(),
            policy: self.policy.clone(),
        }
    }
}

impl<T: Entity> BulkMutator<T> {
    /// Create a mutator with the default store retry policy.
    pub fn new(accessor: StoreAccessor<T>) -> Self {
        Self {
            accessor,
            policy: RetryPolicy::store_default(),
        }
    }

    /// Override the outer retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The accessor this mutator reads through.
    pub fn accessor(&self) -> &StoreAccessor<T> {
        &self.accessor
    }

    /// Validate, dedupe, and insert a batch of candidates.
    ///
    /// Invalid or duplicate rows are skipped with a logged reason; the
    /// surviving rows are inserted in one commit. The payload is the full
    /// re-fetched collection. Only retry exhaustion yields `success = false`.
    pub async fn add(
        &self,
        candidates: &[T],
        required: &[FieldSpec<T>],
        unique: &[FieldSpec<T>],
    ) -> UpdateResult<Vec<T>> {
        let outcome = self
            .policy
            .run(|| self.try_add(candidates, required, unique))
            .await;

        match outcome {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(error = %err, "bulk add never completed");
                UpdateResult::failed("error adding entities")
            }
        }
    }

    async fn try_add(
        &self,
        candidates: &[T],
        required: &[FieldSpec<T>],
        unique: &[FieldSpec<T>],
    ) -> Result<UpdateResult<Vec<T>>, BulkError> {
        let store = self.accessor.store();
        // A previous attempt may have staged rows and then failed to commit.
        store.discard_staged().await?;

        let mut log = MessageLog::new();
        let mut staged: Vec<T> = Vec::new();

        for candidate in candidates {
            if !validate::is_valid(candidate, required, &mut log) {
                log.line(format!("skipped {} - invalid fields", candidate.label()));
                continue;
            }

            if dedupe::already_exists(candidate, unique, &self.accessor, &mut log).await? {
                log.line(format!(
                    "skipped {} - duplicates existing entities",
                    candidate.label()
                ));
                continue;
            }

            staged.push(candidate.clone());
        }

        if !staged.is_empty() {
            store.stage_insert(staged.clone()).await?;
            store.commit().await?;
        }

        log.line(format!(
            "successfully added {} of {} entities",
            staged.len(),
            candidates.len()
        ));

        let payload = self.accessor.fetch_all().await?;
        tracing::info!(message = %log.join(), "bulk add applied");
        Ok(UpdateResult::succeeded(payload, log.join()))
    }

    /// Delete entities by id.
    ///
    /// Missing ids are skipped with a logged reason; removals commit in one
    /// batch, and an empty batch commits nothing. The payload is the full
    /// re-fetched collection.
    pub async fn delete(&self, ids: &[i64]) -> UpdateResult<Vec<T>> {
        let outcome = self.policy.run(|| self.try_delete(ids)).await;

        match outcome {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(error = %err, "bulk delete never completed");
                UpdateResult::failed("error deleting entities")
            }
        }
    }

    async fn try_delete(&self, ids: &[i64]) -> Result<UpdateResult<Vec<T>>, BulkError> {
        let store = self.accessor.store();
        store.discard_staged().await?;

        let mut log = MessageLog::new();
        let mut staged: Vec<i64> = Vec::new();

        for &id in ids {
            match self.accessor.fetch_by_id(id).await? {
                Some(_) => staged.push(id),
                None => log.line(format!("cannot find entity with id {id}")),
            }
        }

        if !staged.is_empty() {
            store.stage_remove(staged.clone()).await?;
            store.commit().await?;
            log.line(format!("successfully removed {} entities", staged.len()));
        }

        let payload = self.accessor.fetch_all().await?;
        tracing::info!(message = %log.join(), "bulk delete applied");
        Ok(UpdateResult::succeeded(payload, log.join()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sku_data::{BackoffStrategy, MemoryStore, Store};

    #[derive(Debug, Clone, PartialEq)]
    struct Part {
        id: i64,
        sku: String,
        price_cents: i64,
    }

    impl Entity for Part {
        fn id(&self) -> i64 {
            self.id
        }

        fn assign_id(&mut self, id: i64) {
            self.id = id;
        }

        fn label(&self) -> String {
            format!("part '{}'", self.sku)
        }
    }

    fn part(sku: &str, price_cents: i64) -> Part {
        Part {
            id: 0,
            sku: sku.to_string(),
            price_cents,
        }
    }

    fn required() -> [FieldSpec<Part>; 2] {
        [
            FieldSpec {
                name: "sku",
                get: |p| FieldValue::Text(p.sku.clone()),
            },
            FieldSpec {
                name: "price",
                get: |p| FieldValue::Money(p.price_cents),
            },
        ]
    }

    fn unique() -> [FieldSpec<Part>; 1] {
        [FieldSpec {
            name: "sku",
            get: |p| FieldValue::Text(p.sku.clone()),
        }]
    }

    fn mutator(store: &Arc<MemoryStore<Part>>) -> BulkMutator<Part> {
        let quick = RetryPolicy::new(10).with_backoff(BackoffStrategy::None);
        let accessor =
            StoreAccessor::new(store.clone() as Arc<dyn Store<Part>>).with_policy(quick.clone());
        BulkMutator::new(accessor).with_policy(quick)
    }

    #[tokio::test]
    async fn test_add_inserts_valid_candidates() {
        let store = Arc::new(MemoryStore::new());
        let mutator = mutator(&store);

        let result = mutator
            .add(&[part("SKU-1", 100), part("SKU-2", 200)], &required(), &unique())
            .await;

        assert!(result.success);
        assert_eq!(result.payload.unwrap().len(), 2);
        assert!(result.message.contains("successfully added 2 of 2"));
    }

    #[tokio::test]
    async fn test_add_skips_invalid_rows_but_succeeds() {
        let store = Arc::new(MemoryStore::new());
        let mutator = mutator(&store);

        let result = mutator
            .add(
                &[part("SKU-1", 100), part("", 200), part("SKU-3", 0)],
                &required(),
                &unique(),
            )
            .await;

        assert!(result.success);
        assert_eq!(result.payload.unwrap().len(), 1);
        assert!(result.message.contains("successfully added 1 of 3"));
        assert!(result.message.contains("invalid fields"));
    }

    #[tokio::test]
    async fn test_add_is_idempotent_under_unique_keys() {
        let store = Arc::new(MemoryStore::new());
        let mutator = mutator(&store);
        let batch = [part("SKU-1", 100), part("SKU-2", 200)];

        let first = mutator.add(&batch, &required(), &unique()).await;
        assert!(first.success);
        assert_eq!(first.payload.unwrap().len(), 2);

        // Second run skips everything as duplicates and still succeeds.
        let second = mutator.add(&batch, &required(), &unique()).await;
        assert!(second.success);
        assert_eq!(second.payload.unwrap().len(), 2);
        assert!(second.message.contains("successfully added 0 of 2"));
        assert!(second.message.contains("duplicates existing"));
    }

    #[tokio::test]
    async fn test_add_survives_transient_faults() {
        let store = Arc::new(MemoryStore::new());
        let mutator = mutator(&store);

        store.fail_next(3).await;
        let result = mutator.add(&[part("SKU-1", 100)], &required(), &unique()).await;

        assert!(result.success);
        assert_eq!(result.payload.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_does_not_duplicate_after_failed_commit() {
        let store = Arc::new(MemoryStore::new());
        let mutator = mutator(&store);

        // The first commit fails after the row is staged; the retried
        // attempt must not insert the leftover staging on top of its own.
        store.fail_next_commit(1).await;
        let result = mutator.add(&[part("SKU-1", 100)], &required(), &unique()).await;

        assert!(result.success);
        assert_eq!(result.payload.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_reports_failure_after_exhaustion() {
        let store = Arc::new(MemoryStore::new());
        let quick = RetryPolicy::new(2).with_backoff(BackoffStrategy::None);
        let accessor =
            StoreAccessor::new(store.clone() as Arc<dyn Store<Part>>).with_policy(quick.clone());
        let mutator = BulkMutator::new(accessor).with_policy(quick);

        // Far more faults than the inner and outer budgets combined.
        store.fail_next(100).await;
        let result = mutator.add(&[part("SKU-1", 100)], &required(), &unique()).await;

        assert!(!result.success);
        assert!(result.payload.is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_existing_rows() {
        let store = Arc::new(MemoryStore::new());
        let mutator = mutator(&store);
        mutator
            .add(&[part("SKU-1", 100), part("SKU-2", 200)], &required(), &unique())
            .await;

        let result = mutator.delete(&[1]).await;

        assert!(result.success);
        let remaining = result.payload.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].sku, "SKU-2");
    }

    #[tokio::test]
    async fn test_delete_missing_id_succeeds_with_note() {
        let store = Arc::new(MemoryStore::new());
        let mutator = mutator(&store);
        mutator.add(&[part("SKU-1", 100)], &required(), &unique()).await;

        let result = mutator.delete(&[42]).await;

        assert!(result.success);
        assert_eq!(result.payload.unwrap().len(), 1);
        assert!(result.message.contains("cannot find entity with id 42"));
    }

    #[tokio::test]
    async fn test_delete_empty_batch_commits_nothing() {
        let store = Arc::new(MemoryStore::new());
        let mutator = mutator(&store);

        let result = mutator.delete(&[]).await;

        assert!(result.success);
        assert!(result.payload.unwrap().is_empty());
        assert!(!result.message.contains("successfully removed"));
    }
}
