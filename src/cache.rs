use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::Error;

/// File-backed cache of serialized values, namespaced by
/// `(cache_type, cache_name)`: one pretty-printed JSON document per
/// entry at `<root>/<cache_type>/<cache_name>.json`.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn exist(&self, cache_type: &str, cache_name: &str) -> bool {
        self.entry_path(cache_type, cache_name).is_file()
    }

    /// Read and decode an entry; `Ok(None)` when it does not exist.
    pub fn get<T: DeserializeOwned>(
        &self,
        cache_type: &str,
        cache_name: &str,
    ) -> Result<Option<T>, Error> {
        let path = self.entry_path(cache_type, cache_name);
        if !path.is_file() {
            return Ok(None);
        }
        let payload = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&payload)?))
    }

    /// Write an entry, creating the namespace directory on first use.
    pub fn create<T: Serialize>(
        &self,
        cache_type: &str,
        cache_name: &str,
        value: &T,
    ) -> Result<(), Error> {
        let path = self.entry_path(cache_type, cache_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(value)?;
        fs::write(&path, payload)?;
        debug!(path = %path.display(), "cache entry written");
        Ok(())
    }

    /// Remove an entry; `Ok(false)` when there was nothing to remove.
    pub fn remove(&self, cache_type: &str, cache_name: &str) -> Result<bool, Error> {
        let path = self.entry_path(cache_type, cache_name);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        debug!(path = %path.display(), "cache entry removed");
        Ok(true)
    }

    fn entry_path(&self, cache_type: &str, cache_name: &str) -> PathBuf {
        self.root.join(cache_type).join(format!("{cache_name}.json"))
    }
}
