//! Shared JSON-array-on-disk persistence for both catalogs. A single
//! `parking_lot::Mutex` per store serializes every read-modify-write cycle
//! (spec §4.5 "Concurrency"); a malformed or missing file reads as empty
//! without being rewritten until the next successful save (spec §7
//! "Catalog I/O swallows deserialization errors... but surfaces write
//! errors").

use crate::error::Result;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

pub struct JsonStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Tolerant read: a missing file, I/O error, or malformed JSON all
    /// return an empty vec rather than an error.
    pub fn load<T: DeserializeOwned>(&self) -> Vec<T> {
        let _guard = self.lock.lock();
        self.load_unlocked()
    }

    fn load_unlocked<T: DeserializeOwned>(&self) -> Vec<T> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Run `f` against the current contents under the store's lock and
    /// persist whatever it returns. The write error (if any) propagates;
    /// a failed write leaves the on-disk file as it was.
    pub fn mutate<T, R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
    {
        let _guard = self.lock.lock();
        let mut entries: Vec<T> = self.load_unlocked();
        let result = f(&mut entries);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&entries)?;
        std::fs::write(&self.path, json)?;
        Ok(result)
    }
}
