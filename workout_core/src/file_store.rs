//! File-backed store with file locking.
//!
//! Each collection lives in `<dir>/<collection>.json` as a single JSON
//! object keyed by entity id. Writers serialize on `<collection>.lock` and
//! replace the collection file atomically, so readers always see either the
//! old or the new contents.

use crate::store::Store;
use crate::{Error, Result};
use fs2::FileExt;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tempfile::NamedTempFile;

type Documents = BTreeMap<String, Value>;

/// Result of reading a collection file
enum Loaded {
    Missing,
    Docs(Documents),
    Corrupt(String),
}

/// Directory of JSON collection files
#[derive(Debug)]
pub struct JsonDirStore {
    dir: PathBuf,
    writer: Mutex<()>,
}

impl JsonDirStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        tracing::debug!("Opened store at {:?}", dir);
        Ok(Self {
            dir,
            writer: Mutex::new(()),
        })
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{}.json", collection))
    }

    fn lock_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{}.lock", collection))
    }

    fn load(&self, collection: &str) -> Result<Loaded> {
        let path = self.collection_path(collection);
        if !path.exists() {
            return Ok(Loaded::Missing);
        }

        let file = File::open(&path)?;

        // Acquire shared lock for reading
        file.lock_shared()?;
        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        if contents.trim().is_empty() {
            return Ok(Loaded::Docs(Documents::new()));
        }

        match serde_json::from_str::<Documents>(&contents) {
            Ok(docs) => Ok(Loaded::Docs(docs)),
            Err(e) => Ok(Loaded::Corrupt(e.to_string())),
        }
    }

    /// Read a collection for queries; corrupted files read as empty
    fn read(&self, collection: &str) -> Result<Documents> {
        match self.load(collection)? {
            Loaded::Missing => Ok(Documents::new()),
            Loaded::Docs(docs) => Ok(docs),
            Loaded::Corrupt(reason) => {
                tracing::warn!(
                    "Collection {} is unreadable ({}); treating as empty",
                    collection,
                    reason
                );
                Ok(Documents::new())
            }
        }
    }

    /// Atomically replace a collection file by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    fn write(&self, collection: &str, docs: &Documents) -> Result<()> {
        let temp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(docs)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(self.collection_path(collection))
            .map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Wrote {} documents to {}", docs.len(), collection);
        Ok(())
    }

    /// Load a collection, modify it, and save it back under an exclusive lock
    ///
    /// The closure returns a value plus whether the collection changed;
    /// unchanged collections are not rewritten.
    fn modify<F, R>(&self, collection: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut Documents) -> (R, bool),
    {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path(collection))?;
        lock_file.lock_exclusive()?;

        let result = self.modify_locked(collection, f);

        lock_file.unlock()?;
        result
    }

    fn modify_locked<F, R>(&self, collection: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut Documents) -> (R, bool),
    {
        let mut docs = match self.load(collection)? {
            Loaded::Missing => Documents::new(),
            Loaded::Docs(docs) => docs,
            Loaded::Corrupt(reason) => {
                let path = self.collection_path(collection);
                let aside = path.with_extension("json.corrupt");
                tracing::warn!(
                    "Collection {} is corrupted ({}); moving it to {:?}",
                    collection,
                    reason,
                    aside
                );
                std::fs::rename(&path, &aside)?;
                Documents::new()
            }
        };

        let (result, changed) = f(&mut docs);
        if changed {
            self.write(collection, &docs)?;
        }
        Ok(result)
    }
}

impl Store for JsonDirStore {
    fn save(&self, collection: &str, id: &str, document: Value) -> Result<()> {
        self.modify(collection, |docs| {
            docs.insert(id.to_string(), document);
            ((), true)
        })
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        Ok(self.read(collection)?.remove(id))
    }

    fn get_all(&self, collection: &str) -> Result<Vec<Value>> {
        Ok(self.read(collection)?.into_values().collect())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        self.modify(collection, |docs| {
            let existed = docs.remove(id).is_some();
            (existed, existed)
        })
    }

    fn count(&self, collection: &str) -> Result<usize> {
        Ok(self.read(collection)?.len())
    }

    fn delete_many(&self, collection: &str, ids: &[String]) -> Result<usize> {
        self.modify(collection, |docs| {
            let removed = ids.iter().filter(|id| docs.remove(*id).is_some()).count();
            (removed, removed > 0)
        })
    }
}
