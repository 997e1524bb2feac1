//! Shared test utilities for integration tests

use namestore::naming::BindingSet;
use namestore::store::{ContextStore, SledContextStore};
use namestore::{CompoundName, ContextKey, NameService, RetentionPolicy, StorageError};
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Parse a stringified name, panicking on malformed test input.
pub fn name(text: &str) -> CompoundName {
    namestore::name::to_name(text).unwrap()
}

pub fn open_service(path: &Path) -> NameService {
    NameService::open(path).unwrap()
}

pub fn open_cached_service(path: &Path, capacity: usize) -> NameService {
    let store = Arc::new(SledContextStore::new(path).unwrap());
    NameService::with_store(store, RetentionPolicy::Cache { capacity }).unwrap()
}

/// Store wrapper whose writes can be made to fail on demand.
pub struct FailingStore {
    inner: SledContextStore,
    fail_saves: AtomicBool,
    fail_removes: AtomicBool,
    /// Number of further saves allowed before failing when `fail_saves` is off.
    saves_left: AtomicUsize,
}

impl FailingStore {
    pub fn new(path: &Path) -> Self {
        Self {
            inner: SledContextStore::new(path).unwrap(),
            fail_saves: AtomicBool::new(false),
            fail_removes: AtomicBool::new(false),
            saves_left: AtomicUsize::new(usize::MAX),
        }
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }

    /// Let `count` more saves succeed, then fail every later one.
    pub fn allow_saves(&self, count: usize) {
        self.saves_left.store(count, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &SledContextStore {
        &self.inner
    }

    fn injected() -> StorageError {
        StorageError::IoError(io::Error::new(io::ErrorKind::Other, "injected failure"))
    }
}

impl ContextStore for FailingStore {
    fn load(&self, key: &ContextKey) -> Result<Option<BindingSet>, StorageError> {
        self.inner.load(key)
    }

    fn save(&self, key: &ContextKey, bindings: &BindingSet) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        let allowed = self
            .saves_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1));
        if allowed.is_err() {
            return Err(Self::injected());
        }
        self.inner.save(key, bindings)
    }

    fn exists(&self, key: &ContextKey) -> Result<bool, StorageError> {
        self.inner.exists(key)
    }

    fn remove(&self, key: &ContextKey) -> Result<bool, StorageError> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        self.inner.remove(key)
    }

    fn allocate_next_key(&self) -> Result<ContextKey, StorageError> {
        self.inner.allocate_next_key()
    }

    fn high_water_mark(&self) -> Result<u64, StorageError> {
        self.inner.high_water_mark()
    }

    fn root_key(&self) -> Result<Option<ContextKey>, StorageError> {
        self.inner.root_key()
    }

    fn set_root_key(&self, key: &ContextKey) -> Result<(), StorageError> {
        self.inner.set_root_key(key)
    }

    fn keys(&self) -> Result<Vec<ContextKey>, StorageError> {
        self.inner.keys()
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.inner.flush()
    }
}
