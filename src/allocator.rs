//! Key Allocator
//!
//! Single source of context keys for both root bootstrap and subcontext
//! creation. Keys are `NC<index>` with a strictly increasing index whose
//! high-water mark is persisted in the store before a key is returned.

use crate::error::NamingError;
use crate::store::ContextStore;
use crate::types::ContextKey;
use parking_lot::Mutex;
use std::sync::Arc;

pub struct KeyAllocator {
    store: Arc<dyn ContextStore>,
    // Serializes in-process callers; the store's counter update is itself
    // atomic, so several processes sharing a store still never collide.
    gate: Mutex<()>,
}

impl KeyAllocator {
    pub fn new(store: Arc<dyn ContextStore>) -> Self {
        Self {
            store,
            gate: Mutex::new(()),
        }
    }

    /// Next unused key.
    pub fn next(&self) -> Result<ContextKey, NamingError> {
        let _guard = self.gate.lock();
        Ok(self.store.allocate_next_key()?)
    }

    /// Number of keys handed out so far.
    pub fn high_water_mark(&self) -> Result<u64, NamingError> {
        Ok(self.store.high_water_mark()?)
    }
}
