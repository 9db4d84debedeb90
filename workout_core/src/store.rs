//! Persistent store contract and an in-memory implementation.
//!
//! The store is a key/value collaborator: documents are JSON values keyed
//! by collection name and entity id. Typed access lives in
//! [`crate::repository`].

use crate::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub const ACTIVE_SESSIONS: &str = "active_sessions";
pub const WORKOUT_LOGS: &str = "workout_logs";

/// Key/value persistence keyed by collection + id
pub trait Store: Send + Sync {
    /// Insert or replace a document
    fn save(&self, collection: &str, id: &str, document: Value) -> Result<()>;

    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    fn get_all(&self, collection: &str) -> Result<Vec<Value>>;

    /// Remove a document, returning whether it existed
    fn delete(&self, collection: &str, id: &str) -> Result<bool>;

    fn count(&self, collection: &str) -> Result<usize>;

    /// Remove several documents, returning how many existed
    fn delete_many(&self, collection: &str, ids: &[String]) -> Result<usize> {
        let mut removed = 0;
        for id in ids {
            if self.delete(collection, id)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

type Collections = HashMap<String, HashMap<String, Value>>;

/// Process-local store, mainly for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of save/delete calls that reached the store
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn collections(&self) -> MutexGuard<'_, Collections> {
        self.collections.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Store for MemoryStore {
    fn save(&self, collection: &str, id: &str, document: Value) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.collections()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);
        Ok(())
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        Ok(self
            .collections()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    fn get_all(&self, collection: &str) -> Result<Vec<Value>> {
        Ok(self
            .collections()
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .collections()
            .get_mut(collection)
            .map(|docs| docs.remove(id).is_some())
            .unwrap_or(false))
    }

    fn count(&self, collection: &str) -> Result<usize> {
        Ok(self.collections().get(collection).map_or(0, |docs| docs.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_save_get_and_count() {
        let store = MemoryStore::new();
        store.save("things", "a", json!({"n": 1})).unwrap();
        store.save("things", "b", json!({"n": 2})).unwrap();

        assert_eq!(store.get("things", "a").unwrap(), Some(json!({"n": 1})));
        assert_eq!(store.count("things").unwrap(), 2);
        assert_eq!(store.count("other").unwrap(), 0);
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn test_save_replaces_existing() {
        let store = MemoryStore::new();
        store.save("things", "a", json!(1)).unwrap();
        store.save("things", "a", json!(2)).unwrap();

        assert_eq!(store.get_all("things").unwrap(), vec![json!(2)]);
    }

    #[test]
    fn test_delete_many_counts_existing_only() {
        let store = MemoryStore::new();
        store.save("things", "a", json!(1)).unwrap();
        store.save("things", "b", json!(2)).unwrap();

        let removed = store
            .delete_many("things", &["a".into(), "missing".into()])
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.get("things", "a").unwrap(), None);
        assert_eq!(store.count("things").unwrap(), 1);
    }
}
