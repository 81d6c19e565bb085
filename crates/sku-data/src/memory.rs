//! In-memory [`Store`] implementation.
//!
//! Staged inserts, updates, and removes become visible only when `commit`
//! applies them, all under one lock, so a batch commit is all-or-nothing.
//! A fault-injection hook lets tests exercise transient store failures.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::store::{Entity, Store, StoreError};

struct Shelf<T> {
    rows: Vec<T>,
    staged_inserts: Vec<T>,
    staged_updates: Vec<T>,
    staged_removes: Vec<i64>,
    next_id: i64,
    faults: u32,
    commit_faults: u32,
}

impl<T> Shelf<T> {
    fn new() -> Self {
        Self {
            rows: Vec::new(),
            staged_inserts: Vec::new(),
            staged_updates: Vec::new(),
            staged_removes: Vec::new(),
            next_id: 1,
            faults: 0,
            commit_faults: 0,
        }
    }

    fn take_fault(&mut self) -> Result<(), StoreError> {
        if self.faults > 0 {
            self.faults -= 1;
            return Err(StoreError::Unavailable("injected fault".to_string()));
        }
        Ok(())
    }
}

/// An in-memory store keyed by entity id.
pub struct MemoryStore<T: Entity> {
    shelf: Mutex<Shelf<T>>,
}

impl<T: Entity> MemoryStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            shelf: Mutex::new(Shelf::new()),
        }
    }

    /// Make the next `count` operations fail with a transient error.
    pub async fn fail_next(&self, count: u32) {
        self.shelf.lock().await.faults = count;
    }

    /// Make only the next `count` commits fail, leaving staged state behind.
    pub async fn fail_next_commit(&self, count: u32) {
        self.shelf.lock().await.commit_faults = count;
    }

    /// Number of committed rows.
    pub async fn len(&self) -> usize {
        self.shelf.lock().await.rows.len()
    }

    /// Whether the store holds no committed rows.
    pub async fn is_empty(&self) -> bool {
        self.shelf.lock().await.rows.is_empty()
    }
}

impl<T: Entity> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> Store<T> for MemoryStore<T> {
    async fn fetch_all(&self) -> Result<Vec<T>, StoreError> {
        let mut shelf = self.shelf.lock().await;
        shelf.take_fault()?;
        Ok(shelf.rows.clone())
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Option<T>, StoreError> {
        let mut shelf = self.shelf.lock().await;
        shelf.take_fault()?;
        Ok(shelf.rows.iter().find(|row| row.id() == id).cloned())
    }

    async fn fetch_matching(
        &self,
        predicate: &(dyn for<'a> Fn(&'a T) -> bool + Send + Sync),
    ) -> Result<Vec<T>, StoreError> {
        let mut shelf = self.shelf.lock().await;
        shelf.take_fault()?;
        Ok(shelf.rows.iter().filter(|row| predicate(row)).cloned().collect())
    }

    async fn stage_insert(&self, entities: Vec<T>) -> Result<(), StoreError> {
        let mut shelf = self.shelf.lock().await;
        shelf.take_fault()?;
        shelf.staged_inserts.extend(entities);
        Ok(())
    }

    async fn stage_update(&self, entities: Vec<T>) -> Result<(), StoreError> {
        let mut shelf = self.shelf.lock().await;
        shelf.take_fault()?;
        shelf.staged_updates.extend(entities);
        Ok(())
    }

    async fn stage_remove(&self, ids: Vec<i64>) -> Result<(), StoreError> {
        let mut shelf = self.shelf.lock().await;
        shelf.take_fault()?;
        shelf.staged_removes.extend(ids);
        Ok(())
    }

    async fn discard_staged(&self) -> Result<(), StoreError> {
        let mut shelf = self.shelf.lock().await;
        shelf.staged_inserts.clear();
        shelf.staged_updates.clear();
        shelf.staged_removes.clear();
        Ok(())
    }

    async fn commit(&self) -> Result<(), StoreError> {
        let mut shelf = self.shelf.lock().await;
        shelf.take_fault()?;
        if shelf.commit_faults > 0 {
            shelf.commit_faults -= 1;
            return Err(StoreError::Unavailable("injected commit fault".to_string()));
        }

        let removes = std::mem::take(&mut shelf.staged_removes);
        shelf.rows.retain(|row| !removes.contains(&row.id()));

        let updates = std::mem::take(&mut shelf.staged_updates);
        for update in updates {
            match shelf.rows.iter_mut().find(|row| row.id() == update.id()) {
                Some(row) => *row = update,
                None => {
                    return Err(StoreError::Commit(format!(
                        "no committed row with id {} to update",
                        update.id()
                    )))
                }
            }
        }

        let inserts = std::mem::take(&mut shelf.staged_inserts);
        for mut entity in inserts {
            if entity.id() == 0 {
                entity.assign_id(shelf.next_id);
            }
            shelf.next_id = shelf.next_id.max(entity.id() + 1);
            shelf.rows.push(entity);
        }

        Ok(())
    }
}
