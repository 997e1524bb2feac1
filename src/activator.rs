//! On-Demand Activator
//!
//! Materializes a naming context for the duration of one request:
//! `acquire` locks the key and loads the binding set from the store (or
//! starts an empty one for a freshly allocated key), the operation runs
//! against the returned [`ActiveContext`], and `release` lets it go. With
//! [`RetentionPolicy::None`] nothing stays resident between requests; the
//! store remains the only authority either way.

use crate::concurrency::{KeyGuard, KeyLockManager};
use crate::error::NamingError;
use crate::naming::BindingSet;
use crate::store::ContextStore;
use crate::types::ContextKey;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Operations a naming context accepts, by wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Bind,
    BindContext,
    Rebind,
    RebindContext,
    Resolve,
    Unbind,
    List,
    NewContext,
    BindNewContext,
    Destroy,
    ToString,
    ToName,
    ResolveStr,
}

impl Operation {
    pub const ALL: [Operation; 13] = [
        Operation::Bind,
        Operation::BindContext,
        Operation::Rebind,
        Operation::RebindContext,
        Operation::Resolve,
        Operation::Unbind,
        Operation::List,
        Operation::NewContext,
        Operation::BindNewContext,
        Operation::Destroy,
        Operation::ToString,
        Operation::ToName,
        Operation::ResolveStr,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Bind => "bind",
            Operation::BindContext => "bind_context",
            Operation::Rebind => "rebind",
            Operation::RebindContext => "rebind_context",
            Operation::Resolve => "resolve",
            Operation::Unbind => "unbind",
            Operation::List => "list",
            Operation::NewContext => "new_context",
            Operation::BindNewContext => "bind_new_context",
            Operation::Destroy => "destroy",
            Operation::ToString => "to_string",
            Operation::ToName => "to_name",
            Operation::ResolveStr => "resolve_str",
        }
    }

    /// Whether the operation changes the binding set of the context it is invoked on.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Operation::Bind
                | Operation::BindContext
                | Operation::Rebind
                | Operation::RebindContext
                | Operation::Unbind
                | Operation::BindNewContext
                | Operation::Destroy
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = NamingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .iter()
            .copied()
            .find(|op| op.name() == s)
            .ok_or_else(|| NamingError::BadOperation(s.to_string()))
    }
}

/// What `acquire` does when the key has no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// The context must already exist; a missing record is `ObjectNotFound`.
    Existing,
    /// The key was just allocated; a missing record starts an empty context.
    Create,
}

/// How long an activated context stays in memory after `release`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetentionPolicy {
    /// Evict on release; every request reloads from the store.
    #[default]
    None,
    /// Keep up to `capacity` clean contexts resident, evicting oldest first.
    Cache { capacity: usize },
}

/// A naming context materialized for one request.
pub struct ActiveContext {
    key: ContextKey,
    operation: Operation,
    bindings: BindingSet,
    dirty: bool,
    removed: bool,
    guard: KeyGuard,
}

impl ActiveContext {
    pub fn key(&self) -> &ContextKey {
        &self.key
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn bindings(&self) -> &BindingSet {
        &self.bindings
    }

    /// Mutable bindings; only available to requests holding the key exclusively.
    pub fn bindings_mut(&mut self) -> Result<&mut BindingSet, NamingError> {
        if !self.guard.is_exclusive() {
            return Err(NamingError::BadOperation(format!(
                "{} cannot modify context {}",
                self.operation, self.key
            )));
        }
        self.dirty = true;
        Ok(&mut self.bindings)
    }

    /// True when in-memory bindings differ from what was last committed.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[derive(Default)]
struct Resident {
    entries: HashMap<ContextKey, BindingSet>,
    order: VecDeque<ContextKey>,
}

impl Resident {
    fn insert(&mut self, key: ContextKey, bindings: BindingSet, capacity: usize) {
        if self.entries.insert(key.clone(), bindings).is_none() {
            self.order.push_back(key);
        }
        while self.entries.len() > capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    fn remove(&mut self, key: &ContextKey) {
        if self.entries.remove(key).is_some() {
            self.order.retain(|k| k != key);
        }
    }
}

pub struct Activator {
    store: Arc<dyn ContextStore>,
    locks: KeyLockManager,
    retention: RetentionPolicy,
    resident: Mutex<Resident>,
}

impl Activator {
    pub fn new(store: Arc<dyn ContextStore>, retention: RetentionPolicy) -> Self {
        Self {
            store,
            locks: KeyLockManager::new(),
            retention,
            resident: Mutex::new(Resident::default()),
        }
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    /// Activate an existing context for `operation`.
    pub fn acquire(
        &self,
        key: &ContextKey,
        operation: Operation,
    ) -> Result<ActiveContext, NamingError> {
        self.acquire_with(key, operation, Intent::Existing)
    }

    pub fn acquire_with(
        &self,
        key: &ContextKey,
        operation: Operation,
        intent: Intent,
    ) -> Result<ActiveContext, NamingError> {
        let guard = if operation.is_mutating() || intent == Intent::Create {
            self.locks.write(key)
        } else {
            self.locks.read(key)
        };

        let cached = self.resident.lock().entries.get(key).cloned();
        let (bindings, dirty) = match cached {
            Some(bindings) => (bindings, false),
            None => match self.store.load(key) {
                Ok(Some(bindings)) => (bindings, false),
                Ok(None) if intent == Intent::Create => (BindingSet::new(), true),
                Ok(None) => {
                    drop(guard);
                    self.locks.release_idle(key);
                    return Err(NamingError::ObjectNotFound(key.clone()));
                }
                Err(err) => {
                    drop(guard);
                    self.locks.release_idle(key);
                    return Err(err.into());
                }
            },
        };

        debug!(key = %key, operation = %operation, bindings = bindings.len(), "Activated context");
        Ok(ActiveContext {
            key: key.clone(),
            operation,
            bindings,
            dirty,
            removed: false,
            guard,
        })
    }

    /// Persist the context's bindings. Nothing is acknowledged before this returns.
    pub fn commit(&self, context: &mut ActiveContext) -> Result<(), NamingError> {
        if !context.guard.is_exclusive() {
            return Err(NamingError::BadOperation(format!(
                "{} cannot commit context {}",
                context.operation, context.key
            )));
        }
        self.store.save(&context.key, &context.bindings)?;
        context.dirty = false;
        Ok(())
    }

    /// Delete the context's record from the store.
    pub fn remove(&self, context: &mut ActiveContext) -> Result<(), NamingError> {
        if !context.guard.is_exclusive() {
            return Err(NamingError::BadOperation(format!(
                "{} cannot remove context {}",
                context.operation, context.key
            )));
        }
        self.store.remove(&context.key)?;
        context.removed = true;
        Ok(())
    }

    /// End the request. Always called, whatever the operation's outcome.
    pub fn release(&self, context: ActiveContext) {
        {
            let mut resident = self.resident.lock();
            match self.retention {
                RetentionPolicy::Cache { capacity } if !context.dirty && !context.removed => {
                    resident.insert(context.key.clone(), context.bindings.clone(), capacity);
                }
                _ => resident.remove(&context.key),
            }
        }
        let key = context.key.clone();
        debug!(key = %key, operation = %context.operation, "Released context");
        // Dropping the context releases its key lock.
        drop(context);
        self.locks.release_idle(&key);
    }

    /// Run `f` between `acquire_with` and `release`.
    pub fn with_context<T, F>(
        &self,
        key: &ContextKey,
        operation: Operation,
        intent: Intent,
        f: F,
    ) -> Result<T, NamingError>
    where
        F: FnOnce(&mut ActiveContext) -> Result<T, NamingError>,
    {
        let mut context = self.acquire_with(key, operation, intent)?;
        let result = f(&mut context);
        self.release(context);
        result
    }

    /// Number of contexts currently kept resident.
    pub fn resident_count(&self) -> usize {
        self.resident.lock().entries.len()
    }
}
