use std::{
    io,
    path::PathBuf,
};

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tokio::{fs, sync::Mutex};

use crate::models::Record;

/// The persisted collections, one JSON array file each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collection {
    Users,
    Blogs,
    Comments,
}

impl Collection {
    pub fn file_name(self) -> &'static str {
        match self {
            Collection::Users => "users.json",
            Collection::Blogs => "blogs.json",
            Collection::Comments => "comments.json",
        }
    }

    fn index(self) -> usize {
        match self {
            Collection::Users => 0,
            Collection::Blogs => 1,
            Collection::Comments => 2,
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read {name}: {source}")]
    Read {
        name: &'static str,
        source: io::Error,
    },

    #[error("failed to parse {name}: {source}")]
    Parse {
        name: &'static str,
        source: serde_json::Error,
    },

    #[error("failed to serialize {name}: {source}")]
    Serialize {
        name: &'static str,
        source: serde_json::Error,
    },

    #[error("failed to write {name}: {source}")]
    Write {
        name: &'static str,
        source: io::Error,
    },
}

/// Whole-file store for the record collections.
///
/// Every mutation goes through [`Store::update`], which holds the collection's
/// mutex across the read-modify-write cycle so overlapping requests cannot
/// lose each other's writes. Saves stage to a temp file and rename over the
/// target, so a crash mid-write leaves the previous contents intact.
pub struct Store {
    data_dir: PathBuf,
    locks: [Mutex<()>; 3],
}

impl Store {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            locks: Default::default(),
        }
    }

    /// Read a whole collection. A missing file is an empty collection; an
    /// unreadable or malformed file is an error, never silently empty.
    pub async fn load<T>(&self, collection: Collection) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let name = collection.file_name();

        let raw = match fs::read(self.data_dir.join(name)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Read { name, source }),
        };

        serde_json::from_slice(&raw).map_err(|source| StoreError::Parse { name, source })
    }

    /// Overwrite a whole collection via temp-file-and-rename.
    pub async fn save<T>(&self, collection: Collection, records: &[T]) -> Result<(), StoreError>
    where
        T: Serialize,
    {
        let name = collection.file_name();

        let json = serde_json::to_vec_pretty(records)
            .map_err(|source| StoreError::Serialize { name, source })?;

        fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|source| StoreError::Write { name, source })?;

        let tmp = self.data_dir.join(format!("{name}.tmp"));
        fs::write(&tmp, &json)
            .await
            .map_err(|source| StoreError::Write { name, source })?;
        fs::rename(&tmp, self.data_dir.join(name))
            .await
            .map_err(|source| StoreError::Write { name, source })?;

        Ok(())
    }

    /// One logical transaction against a collection: lock, load, apply,
    /// save. The file is only rewritten when the closure succeeds.
    pub async fn update<T, R, E, F>(&self, collection: Collection, f: F) -> Result<R, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<StoreError>,
        F: FnOnce(&mut Vec<T>) -> Result<R, E>,
    {
        let _guard = self.locks[collection.index()].lock().await;

        let mut records = self.load(collection).await?;
        let result = f(&mut records)?;
        self.save(collection, &records).await?;

        Ok(result)
    }
}

/// Successor of the last record's id, or 1 for an empty collection. Only
/// safe because callers run inside [`Store::update`] under the collection
/// lock.
pub fn next_id<T: Record>(records: &[T]) -> u64 {
    records.last().map_or(1, |record| record.id() + 1)
}
