//! Naming Service Front Door
//!
//! Bootstraps the root context, hands out references, and creates new
//! contexts through the same allocator and activation path used for every
//! other context.

use crate::activator::{Activator, Intent, Operation, RetentionPolicy};
use crate::allocator::KeyAllocator;
use crate::config::NamestoreConfig;
use crate::error::NamingError;
use crate::naming::NamingContext;
use crate::store::{ContextStore, SledContextStore};
use crate::types::ContextKey;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// State shared by every reference handed out by one service instance.
pub(crate) struct ServiceCore {
    pub(crate) store: Arc<dyn ContextStore>,
    pub(crate) allocator: KeyAllocator,
    pub(crate) activator: Activator,
    pub(crate) root: ContextKey,
    /// Held shared while a context is created or bound, exclusively by the sweep.
    pub(crate) creation_gate: RwLock<()>,
    /// Keys handed out by `new_context` that no binding refers to yet.
    unbound: Mutex<HashSet<ContextKey>>,
}

impl ServiceCore {
    /// Allocate a key and activate an empty context under it.
    pub(crate) fn create_context(self: &Arc<Self>) -> Result<NamingContext, NamingError> {
        let _creating = self.creation_gate.read_recursive();
        let key = self.allocator.next()?;
        self.activator
            .with_context(&key, Operation::NewContext, Intent::Create, |ctx| {
                self.activator.commit(ctx)
            })?;
        debug!(key = %key, "Created naming context");
        Ok(NamingContext::new(key, Arc::clone(self)))
    }

    /// Create a context the caller will bind later. The sweep leaves it
    /// alone until it is bound or destroyed.
    pub(crate) fn create_unbound_context(self: &Arc<Self>) -> Result<NamingContext, NamingError> {
        let _creating = self.creation_gate.read_recursive();
        let created = self.create_context()?;
        self.unbound.lock().insert(created.key().clone());
        Ok(created)
    }

    /// Drop `key` from the unbound set once it is bound or destroyed.
    pub(crate) fn clear_unbound(&self, key: &ContextKey) {
        self.unbound.lock().remove(key);
    }

    pub(crate) fn is_unbound(&self, key: &ContextKey) -> bool {
        self.unbound.lock().contains(key)
    }
}

pub struct NameService {
    core: Arc<ServiceCore>,
}

impl NameService {
    /// Open the store named by `config` and bootstrap the root context.
    pub fn bootstrap(config: &NamestoreConfig) -> Result<Self, NamingError> {
        let store = SledContextStore::open(&config.storage.path, config.storage.flush_on_write)?;
        Self::with_store(Arc::new(store), config.activation.retention_policy())
    }

    /// Bootstrap against a store directory with default settings.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, NamingError> {
        let store = SledContextStore::new(path)?;
        Self::with_store(Arc::new(store), RetentionPolicy::None)
    }

    /// Bootstrap against an already opened store.
    ///
    /// On first start a root key is allocated, its empty record persisted,
    /// and the key recorded as root. Later starts return the recorded key
    /// unchanged. A recorded root whose record is missing is fatal.
    pub fn with_store(
        store: Arc<dyn ContextStore>,
        retention: RetentionPolicy,
    ) -> Result<Self, NamingError> {
        let activator = Activator::new(Arc::clone(&store), retention);
        let allocator = KeyAllocator::new(Arc::clone(&store));

        let root = match store.root_key()? {
            Some(key) => {
                if !store.exists(&key)? {
                    return Err(NamingError::RootMissing(key));
                }
                info!(root = %key, "Restored root naming context");
                key
            }
            None => {
                let key = allocator.next()?;
                activator.with_context(&key, Operation::NewContext, Intent::Create, |ctx| {
                    activator.commit(ctx)
                })?;
                store.set_root_key(&key)?;
                info!(root = %key, "Created root naming context");
                key
            }
        };

        Ok(Self {
            core: Arc::new(ServiceCore {
                store,
                allocator,
                activator,
                root,
                creation_gate: RwLock::new(()),
                unbound: Mutex::new(HashSet::new()),
            }),
        })
    }

    pub(crate) fn core(&self) -> &Arc<ServiceCore> {
        &self.core
    }

    pub fn root(&self) -> NamingContext {
        NamingContext::new(self.core.root.clone(), Arc::clone(&self.core))
    }

    pub fn root_key(&self) -> &ContextKey {
        &self.core.root
    }

    /// Reference for a key obtained elsewhere. No activation happens until
    /// the reference is used.
    pub fn context(&self, key: ContextKey) -> NamingContext {
        NamingContext::new(key, Arc::clone(&self.core))
    }

    /// Create a new, unbound context.
    pub fn new_context(&self) -> Result<NamingContext, NamingError> {
        self.core.create_unbound_context()
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.core.activator.retention()
    }

    /// Number of persisted contexts, including unreachable ones.
    pub fn context_count(&self) -> Result<usize, NamingError> {
        Ok(self.core.store.keys()?.len())
    }

    /// Delete every context record that cannot be reached from the root.
    ///
    /// This reclaims contexts orphaned by a crash in the middle of
    /// `bind_new_context`. Contexts returned by `new_context` in this
    /// process and not yet bound are kept; after a restart nothing can
    /// still hold them, so unbound ones are reclaimed then.
    pub fn sweep_unreachable(&self) -> Result<Vec<ContextKey>, NamingError> {
        let _exclusive = self.core.creation_gate.write();
        let activator = &self.core.activator;

        let mut reachable = HashSet::new();
        let mut queue = VecDeque::from([self.core.root.clone()]);
        while let Some(key) = queue.pop_front() {
            if !reachable.insert(key.clone()) {
                continue;
            }
            let children = activator.with_context(&key, Operation::List, Intent::Existing, |ctx| {
                Ok(ctx
                    .bindings()
                    .iter()
                    .filter_map(|b| b.target.as_context().cloned())
                    .collect::<Vec<_>>())
            });
            match children {
                Ok(children) => queue.extend(children),
                // Dangling binding to a destroyed context.
                Err(NamingError::ObjectNotFound(_)) => {}
                Err(err) => return Err(err),
            }
        }

        let mut removed = Vec::new();
        for key in self.core.store.keys()? {
            if reachable.contains(&key) || self.core.is_unbound(&key) {
                continue;
            }
            activator.with_context(&key, Operation::Destroy, Intent::Existing, |ctx| {
                activator.remove(ctx)
            })?;
            removed.push(key);
        }
        info!(removed = removed.len(), "Swept unreachable naming contexts");
        Ok(removed)
    }

    pub fn flush(&self) -> Result<(), NamingError> {
        Ok(self.core.store.flush()?)
    }
}
