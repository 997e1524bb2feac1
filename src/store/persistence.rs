//! Persistence layer for the Context Store

use crate::error::StorageError;
use crate::naming::BindingSet;
use crate::store::{ContextRecord, ContextStore, RECORD_FORMAT_VERSION};
use crate::types::ContextKey;
use sled::{Db, Tree};
use std::io;
use std::path::Path;
use tracing::debug;

const TREE_CONTEXTS: &str = "ns_contexts";
const TREE_META: &str = "ns_meta";
const META_COUNTER: &[u8] = b"next_key_index";
const META_ROOT: &[u8] = b"root_key";

/// Sled-based implementation of ContextStore
///
/// Context records live in their own tree keyed by the context key; the
/// allocator counter and root marker live in a separate metadata tree.
#[derive(Clone)]
pub struct SledContextStore {
    db: Db,
    contexts: Tree,
    meta: Tree,
    flush_on_write: bool,
}

impl SledContextStore {
    /// Open (or create) a store at the given directory, flushing after every write.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        Self::open(path, true)
    }

    pub fn open<P: AsRef<Path>>(path: P, flush_on_write: bool) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let db = sled::open(path).map_err(|e| {
            StorageError::IoError(io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to open sled database at {:?}: {}", path, e),
            ))
        })?;
        let mut store = Self::from_db(db)?;
        store.flush_on_write = flush_on_write;
        Ok(store)
    }

    pub fn from_db(db: Db) -> Result<Self, StorageError> {
        let contexts = db.open_tree(TREE_CONTEXTS).map_err(to_storage_io)?;
        let meta = db.open_tree(TREE_META).map_err(to_storage_io)?;
        Ok(Self {
            db,
            contexts,
            meta,
            flush_on_write: true,
        })
    }

    /// Get the underlying sled database (for advanced operations)
    pub fn db(&self) -> &Db {
        &self.db
    }

    fn flush_if_configured(&self) -> Result<(), StorageError> {
        if self.flush_on_write {
            self.flush()?;
        }
        Ok(())
    }
}

impl ContextStore for SledContextStore {
    fn load(&self, key: &ContextKey) -> Result<Option<BindingSet>, StorageError> {
        let Some(raw) = self.contexts.get(key.as_bytes()).map_err(to_storage_io)? else {
            return Ok(None);
        };
        let record: ContextRecord =
            bincode::deserialize(&raw).map_err(|e| corrupt(key.as_str(), e.to_string()))?;
        if record.version != RECORD_FORMAT_VERSION {
            return Err(corrupt(
                key.as_str(),
                format!("unsupported record version {}", record.version),
            ));
        }
        if &record.key != key {
            return Err(corrupt(
                key.as_str(),
                format!("record claims key {}", record.key),
            ));
        }
        Ok(Some(record.bindings))
    }

    fn save(&self, key: &ContextKey, bindings: &BindingSet) -> Result<(), StorageError> {
        let record = ContextRecord::new(key.clone(), bindings.clone());
        let value = bincode::serialize(&record).map_err(|e| {
            StorageError::IoError(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Failed to serialize context record {}: {}", key, e),
            ))
        })?;
        self.contexts
            .insert(key.as_bytes(), value)
            .map_err(to_storage_io)?;
        self.flush_if_configured()?;
        debug!(key = %key, bindings = bindings.len(), "Saved context record");
        Ok(())
    }

    fn exists(&self, key: &ContextKey) -> Result<bool, StorageError> {
        self.contexts
            .contains_key(key.as_bytes())
            .map_err(to_storage_io)
    }

    fn remove(&self, key: &ContextKey) -> Result<bool, StorageError> {
        let removed = self
            .contexts
            .remove(key.as_bytes())
            .map_err(to_storage_io)?
            .is_some();
        self.flush_if_configured()?;
        Ok(removed)
    }

    fn allocate_next_key(&self) -> Result<ContextKey, StorageError> {
        loop {
            let current = self.meta.get(META_COUNTER).map_err(to_storage_io)?;
            let index = match &current {
                Some(raw) => decode_counter(raw)?,
                None => 0,
            };
            let next = index
                .checked_add(1)
                .ok_or(StorageError::AllocatorExhausted)?;

            let swapped = self
                .meta
                .compare_and_swap(META_COUNTER, current, Some(next.to_be_bytes().to_vec()))
                .map_err(to_storage_io)?;
            if swapped.is_err() {
                // Another allocator advanced the counter first; retry from its value.
                continue;
            }

            // The counter must be durable before the key leaves this function.
            self.flush()?;
            let key = ContextKey::from_index(index);
            debug!(key = %key, "Allocated context key");
            return Ok(key);
        }
    }

    fn high_water_mark(&self) -> Result<u64, StorageError> {
        match self.meta.get(META_COUNTER).map_err(to_storage_io)? {
            Some(raw) => decode_counter(&raw),
            None => Ok(0),
        }
    }

    fn root_key(&self) -> Result<Option<ContextKey>, StorageError> {
        let Some(raw) = self.meta.get(META_ROOT).map_err(to_storage_io)? else {
            return Ok(None);
        };
        let key = String::from_utf8(raw.to_vec())
            .map_err(|e| corrupt("root marker", e.to_string()))?;
        Ok(Some(ContextKey::from_raw(key)))
    }

    fn set_root_key(&self, key: &ContextKey) -> Result<(), StorageError> {
        self.meta
            .insert(META_ROOT, key.as_bytes())
            .map_err(to_storage_io)?;
        self.flush()
    }

    fn keys(&self) -> Result<Vec<ContextKey>, StorageError> {
        let mut out = Vec::new();
        for item in self.contexts.iter().keys() {
            let raw = item.map_err(to_storage_io)?;
            let key = String::from_utf8(raw.to_vec())
                .map_err(|e| corrupt("context key", e.to_string()))?;
            out.push(ContextKey::from_raw(key));
        }
        Ok(out)
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.db.flush().map_err(to_storage_io)?;
        Ok(())
    }
}

fn decode_counter(raw: &[u8]) -> Result<u64, StorageError> {
    let bytes: [u8; 8] = raw
        .try_into()
        .map_err(|_| corrupt("allocator counter", format!("expected 8 bytes, got {}", raw.len())))?;
    Ok(u64::from_be_bytes(bytes))
}

fn corrupt(key: &str, reason: impl Into<String>) -> StorageError {
    StorageError::Corrupt {
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn to_storage_io(err: sled::Error) -> StorageError {
    StorageError::IoError(io::Error::new(io::ErrorKind::Other, err.to_string()))
}
