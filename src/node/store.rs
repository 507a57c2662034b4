//! Node-local durable key-value map
//!
//! One JSON file per node, loaded at startup and rewritten synchronously
//! after every mutation, so a restarted node comes back with its last
//! written state without any replay. Values are opaque JSON.

use crate::common::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub struct KvStore {
    path: PathBuf,
    map: HashMap<String, Value>,
}

impl KvStore {
    /// Open the store, loading existing data if the file is present.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let map = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let map: HashMap<String, Value> = serde_json::from_str(&raw)
                .map_err(|e| Error::Storage(format!("corrupt store file: {}", e)))?;
            tracing::info!("Loaded {} keys from {}", map.len(), path.display());
            map
        } else {
            HashMap::new()
        };

        Ok(Self { path, map })
    }

    /// Insert or overwrite a key and flush to disk.
    pub fn insert(&mut self, key: &str, value: Value) -> Result<()> {
        self.map.insert(key.to_string(), value);
        self.flush()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Owned snapshot of every entry, for scans that must not hold the
    /// store lock across network calls.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.map
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// The full map, for debug dumps.
    pub fn dump(&self) -> &HashMap<String, Value> {
        &self.map
    }

    fn flush(&self) -> Result<()> {
        let raw = serde_json::to_string_pretty(&self.map)
            .map_err(|e| Error::Storage(format!("serialize store: {}", e)))?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}
