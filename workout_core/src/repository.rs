//! Typed repositories over a [`Store`].
//!
//! Repositories own the entity bookkeeping: `created_at` and `version = 1`
//! on first write, `updated_at` refreshed and `version` bumped by one on
//! every later write.

use crate::store::{Store, ACTIVE_SESSIONS, WORKOUT_LOGS};
use crate::{ActiveWorkoutSession, EntityMeta, Error, Result, WorkoutLog};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

/// A persisted aggregate with identity metadata
pub trait Entity: Serialize + DeserializeOwned {
    const COLLECTION: &'static str;

    fn meta(&self) -> &EntityMeta;
    fn meta_mut(&mut self) -> &mut EntityMeta;
}

impl Entity for ActiveWorkoutSession {
    const COLLECTION: &'static str = ACTIVE_SESSIONS;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

impl Entity for WorkoutLog {
    const COLLECTION: &'static str = WORKOUT_LOGS;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

pub struct Repository<S: ?Sized, T> {
    store: Arc<S>,
    _entity: PhantomData<fn() -> T>,
}

impl<S: ?Sized, T> Clone for Repository<S, T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _entity: PhantomData,
        }
    }
}

impl<S: Store + ?Sized, T: Entity> Repository<S, T> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub fn get(&self, id: Uuid) -> Result<Option<T>> {
        match self.store.get(T::COLLECTION, &id.to_string())? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// Like [`get`](Self::get) but a missing entity is an error
    pub fn require(&self, id: Uuid) -> Result<T> {
        self.get(id)?.ok_or_else(|| Error::NotFound {
            collection: T::COLLECTION,
            id: id.to_string(),
        })
    }

    /// All entities in the collection; undecodable documents are skipped
    pub fn all(&self) -> Result<Vec<T>> {
        let docs = self.store.get_all(T::COLLECTION)?;
        let mut entities = Vec::with_capacity(docs.len());
        for doc in docs {
            match serde_json::from_value::<T>(doc) {
                Ok(entity) => entities.push(entity),
                Err(e) => tracing::warn!("Skipping unreadable {} document: {}", T::COLLECTION, e),
            }
        }
        Ok(entities)
    }

    /// Persist an entity, stamping its metadata
    ///
    /// When a document with the same id already exists its `created_at` is
    /// kept and the version continues from the stored one.
    pub fn save(&self, entity: &mut T, now: DateTime<Utc>) -> Result<()> {
        let id = entity.meta().id;
        let previous = match self.store.get(T::COLLECTION, &id.to_string())? {
            Some(doc) => Some(serde_json::from_value::<T>(doc)?.meta().clone()),
            None => None,
        };

        // Stamp a copy so a failed write leaves the caller's entity untouched
        let mut meta = entity.meta().clone();
        match previous {
            Some(prev) => {
                meta.created_at = prev.created_at;
                meta.version = prev.version + 1;
            }
            None => {
                meta.created_at = now;
                meta.version = 1;
            }
        }
        meta.updated_at = now;

        let original = std::mem::replace(entity.meta_mut(), meta);
        let written = serde_json::to_value(&*entity)
            .map_err(Error::from)
            .and_then(|doc| self.store.save(T::COLLECTION, &id.to_string(), doc));
        if let Err(e) = written {
            *entity.meta_mut() = original;
            return Err(e);
        }

        tracing::debug!(
            "Saved {} {} (version {})",
            T::COLLECTION,
            id,
            entity.meta().version
        );
        Ok(())
    }

    pub fn delete_many(&self, ids: &[Uuid]) -> Result<usize> {
        let keys: Vec<String> = ids.iter().map(Uuid::to_string).collect();
        self.store.delete_many(T::COLLECTION, &keys)
    }

    pub fn count(&self) -> Result<usize> {
        self.store.count(T::COLLECTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn log(now: DateTime<Utc>) -> WorkoutLog {
        WorkoutLog {
            meta: EntityMeta::new(Uuid::new_v4(), now),
            plan_id: "push".into(),
            plan_name: "Push Day".into(),
            date_time_start: now,
            date_time_end: None,
            entries: vec![],
            overall_rating: None,
            notes: None,
        }
    }

    #[test]
    fn test_first_save_assigns_version_one() {
        let repo: Repository<MemoryStore, WorkoutLog> =
            Repository::new(Arc::new(MemoryStore::new()));
        let now = Utc::now();
        let mut entity = log(now);

        repo.save(&mut entity, now).unwrap();

        assert_eq!(entity.meta.version, 1);
        assert_eq!(repo.require(entity.id()).unwrap().meta.version, 1);
    }

    #[test]
    fn test_update_bumps_version_and_keeps_created_at() {
        let repo: Repository<MemoryStore, WorkoutLog> =
            Repository::new(Arc::new(MemoryStore::new()));
        let created = Utc::now();
        let mut entity = log(created);
        repo.save(&mut entity, created).unwrap();

        let later = created + Duration::minutes(3);
        entity.notes = Some("felt strong".into());
        repo.save(&mut entity, later).unwrap();

        let stored = repo.require(entity.id()).unwrap();
        assert_eq!(stored.meta.version, 2);
        assert_eq!(stored.meta.created_at, created);
        assert_eq!(stored.meta.updated_at, later);
        assert_eq!(stored.notes.as_deref(), Some("felt strong"));
    }

    #[test]
    fn test_require_missing_is_not_found() {
        let repo: Repository<MemoryStore, WorkoutLog> =
            Repository::new(Arc::new(MemoryStore::new()));
        let err = repo.require(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, Error::NotFound { collection: WORKOUT_LOGS, .. }));
    }

    #[test]
    fn test_all_skips_unreadable_documents() {
        let store = Arc::new(MemoryStore::new());
        store
            .save(WORKOUT_LOGS, "junk", serde_json::json!({"not": "a log"}))
            .unwrap();
        let repo: Repository<MemoryStore, WorkoutLog> = Repository::new(Arc::clone(&store));
        let now = Utc::now();
        repo.save(&mut log(now), now).unwrap();

        assert_eq!(repo.all().unwrap().len(), 1);
        assert_eq!(repo.count().unwrap(), 2);
    }
}
