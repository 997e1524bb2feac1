//! Durable Context Store
//!
//! Persists one record per naming context (key -> binding set) plus the key
//! allocator's high-water mark and the root marker. The store is the only
//! source of truth: in-memory contexts are rebuilt from it on demand.

pub mod persistence;

pub use persistence::SledContextStore;

use crate::error::StorageError;
use crate::naming::BindingSet;
use crate::types::ContextKey;
use serde::{Deserialize, Serialize};

/// On-disk layout version of a context record.
pub const RECORD_FORMAT_VERSION: u32 = 1;

/// Persisted form of a naming context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextRecord {
    pub version: u32,
    pub key: ContextKey,
    pub bindings: BindingSet,
}

impl ContextRecord {
    pub fn new(key: ContextKey, bindings: BindingSet) -> Self {
        Self {
            version: RECORD_FORMAT_VERSION,
            key,
            bindings,
        }
    }
}

/// Context store interface
///
/// Every write is atomic per key: a reader sees either the previous or the
/// new record, never a mix.
pub trait ContextStore: Send + Sync {
    /// Binding set for `key`, `None` if no record exists.
    fn load(&self, key: &ContextKey) -> Result<Option<BindingSet>, StorageError>;

    /// Overwrite the record for `key`.
    fn save(&self, key: &ContextKey, bindings: &BindingSet) -> Result<(), StorageError>;

    fn exists(&self, key: &ContextKey) -> Result<bool, StorageError>;

    /// Delete the record for `key`. Returns whether a record was present.
    fn remove(&self, key: &ContextKey) -> Result<bool, StorageError>;

    /// Hand out a never-used key. The advanced counter is durable before
    /// this returns.
    fn allocate_next_key(&self) -> Result<ContextKey, StorageError>;

    /// Number of keys allocated so far.
    fn high_water_mark(&self) -> Result<u64, StorageError>;

    /// Key recorded as the namespace root, if bootstrap has completed once.
    fn root_key(&self) -> Result<Option<ContextKey>, StorageError>;

    fn set_root_key(&self, key: &ContextKey) -> Result<(), StorageError>;

    /// Keys of every persisted context record.
    fn keys(&self) -> Result<Vec<ContextKey>, StorageError>;

    fn flush(&self) -> Result<(), StorageError>;
}
