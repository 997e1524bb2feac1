//! Per-key locking
//!
//! Mutations of one context are serialized through a read/write lock owned
//! by that context's key; operations on different keys never contend.
//! Locks are created on first use and dropped once no request holds them.

use crate::types::ContextKey;
use parking_lot::{Mutex, RawRwLock, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

pub type KeyReadGuard = parking_lot::ArcRwLockReadGuard<RawRwLock, ()>;
pub type KeyWriteGuard = parking_lot::ArcRwLockWriteGuard<RawRwLock, ()>;

/// Guard held by an in-flight request on one key.
pub enum KeyGuard {
    Read(KeyReadGuard),
    Write(KeyWriteGuard),
}

impl KeyGuard {
    pub fn is_exclusive(&self) -> bool {
        matches!(self, KeyGuard::Write(_))
    }
}

#[derive(Default)]
pub struct KeyLockManager {
    locks: Mutex<HashMap<ContextKey, Arc<RwLock<()>>>>,
}

impl KeyLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock shared by all requests on `key`.
    pub fn get_lock(&self, key: &ContextKey) -> Arc<RwLock<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(key.clone()).or_default())
    }

    /// Shared access for read-only operations.
    pub fn read(&self, key: &ContextKey) -> KeyGuard {
        KeyGuard::Read(self.get_lock(key).read_arc())
    }

    /// Exclusive access for mutating operations.
    pub fn write(&self, key: &ContextKey) -> KeyGuard {
        KeyGuard::Write(self.get_lock(key).write_arc())
    }

    /// Drop the lock for `key` if nobody holds or waits on it.
    pub fn release_idle(&self, key: &ContextKey) {
        let mut locks = self.locks.lock();
        if let Some(lock) = locks.get(key) {
            if Arc::strong_count(lock) == 1 {
                locks.remove(key);
            }
        }
    }

    pub fn tracked(&self) -> usize {
        self.locks.lock().len()
    }
}
