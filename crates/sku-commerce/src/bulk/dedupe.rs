//! Predicate-based existence checks before insertion.

use sku_data::{Entity, FetchError, StoreAccessor};

use super::validate::{FieldSpec, FieldValue};
use super::MessageLog;

/// Check whether the store already holds an entity matching the candidate
/// on every named key field.
///
/// The check is a conjunction of equalities over the candidate's key values.
/// An empty key list disables the check entirely. A key that resolves to
/// [`FieldValue::Missing`] contributes no constraint; it is logged and the
/// remaining keys still apply.
pub(crate) async fn already_exists<T: Entity>(
    candidate: &T,
    keys: &[FieldSpec<T>],
    accessor: &StoreAccessor<T>,
    log: &mut MessageLog,
) -> Result<bool, FetchError> {
    if keys.is_empty() {
        return Ok(false);
    }

    let mut criteria: Vec<(&'static str, FieldValue)> = Vec::new();
    for spec in keys {
        match (spec.get)(candidate) {
            FieldValue::Missing => {
                tracing::warn!(field = spec.name, "dedupe key has no value; ignoring it");
            }
            value => criteria.push((spec.name, value)),
        }
    }

    if criteria.is_empty() {
        return Ok(false);
    }

    let matches = accessor
        .fetch_matching(|existing: &T| {
            keys.iter().all(|spec| match (spec.get)(candidate) {
                FieldValue::Missing => true,
                value => (spec.get)(existing) == value,
            })
        })
        .await?;

    if matches.is_empty() {
        return Ok(false);
    }

    let described = criteria
        .iter()
        .map(|(name, value)| format!("{name} = {value}"))
        .collect::<Vec<_>>()
        .join(" AND ");
    log.line(format!(
        "{} existing entities match ({described})",
        matches.len()
    ));

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sku_data::{MemoryStore, Store};

    #[derive(Debug, Clone, PartialEq)]
    struct Part {
        id: i64,
        sku: String,
        bin: Option<i64>,
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

    fn part(sku: &str, bin: Option<i64>) -> Part {
        Part {
            id: 0,
            sku: sku.to_string(),
            bin,
        }
    }

    fn sku_key() -> FieldSpec<Part> {
        FieldSpec {
            name: "sku",
            get: |p| FieldValue::Text(p.sku.clone()),
        }
    }

    fn bin_key() -> FieldSpec<Part> {
        FieldSpec {
            name: "bin",
            get: |p| p.bin.map_or(FieldValue::Missing, FieldValue::Int),
        }
    }

    async fn accessor_with(parts: Vec<Part>) -> StoreAccessor<Part> {
        let store = Arc::new(MemoryStore::new());
        store.stage_insert(parts).await.unwrap();
        store.commit().await.unwrap();
        StoreAccessor::new(store)
    }

    #[tokio::test]
    async fn test_any_match_is_a_duplicate() {
        let accessor = accessor_with(vec![part("SKU-1", Some(4))]).await;
        let mut log = MessageLog::new();

        let candidate = part("SKU-1", Some(4));
        assert!(
            already_exists(&candidate, &[sku_key(), bin_key()], &accessor, &mut log)
                .await
                .unwrap()
        );
        assert!(log.join().contains("1 existing entities match"));
    }

    #[tokio::test]
    async fn test_conjunction_must_match_every_key() {
        let accessor = accessor_with(vec![part("SKU-1", Some(4))]).await;
        let mut log = MessageLog::new();

        // Same sku, different bin: not a duplicate under the two-key set.
        let candidate = part("SKU-1", Some(9));
        assert!(
            !already_exists(&candidate, &[sku_key(), bin_key()], &accessor, &mut log)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_empty_key_list_never_duplicates() {
        let accessor = accessor_with(vec![part("SKU-1", Some(4))]).await;
        let mut log = MessageLog::new();

        let candidate = part("SKU-1", Some(4));
        assert!(!already_exists(&candidate, &[], &accessor, &mut log)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_missing_key_value_fails_open() {
        let accessor = accessor_with(vec![part("SKU-1", Some(4))]).await;
        let mut log = MessageLog::new();

        // The bin key resolves to nothing, so only sku constrains the match.
        let candidate = part("SKU-1", None);
        assert!(
            already_exists(&candidate, &[sku_key(), bin_key()], &accessor, &mut log)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_all_keys_missing_skips_the_probe() {
        let accessor = accessor_with(vec![part("SKU-1", Some(4))]).await;
        let mut log = MessageLog::new();

        let candidate = part("SKU-2", None);
        assert!(!already_exists(&candidate, &[bin_key()], &accessor, &mut log)
            .await
            .unwrap());
    }
}
