//! Naming Context
//!
//! [`NamingContext`] is a reference to one node of the namespace tree. It
//! holds nothing but the node's key: every call activates the node through
//! the activator, runs against its bindings, and releases it again.
//!
//! Compound names are resolved hop by hop. A context resolves the first
//! component to a child context and hands the remaining suffix to that
//! child, so no context is ever held while another one is activated and
//! contexts never need to know their parent.

mod bindings;
mod iterator;

pub use bindings::BindingSet;
pub use iterator::BindingIterator;

use crate::activator::{Intent, Operation};
use crate::error::NamingError;
use crate::service::ServiceCore;
use crate::types::{Binding, CompoundName, ContextKey, NameComponent, ObjectRef, Target};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindMode {
    Bind,
    Rebind,
}

/// Reference to a naming context.
///
/// Two references are equal when they name the same context key, however
/// they were obtained.
#[derive(Clone)]
pub struct NamingContext {
    key: ContextKey,
    core: Arc<ServiceCore>,
}

impl NamingContext {
    pub(crate) fn new(key: ContextKey, core: Arc<ServiceCore>) -> Self {
        Self { key, core }
    }

    pub fn key(&self) -> &ContextKey {
        &self.key
    }

    /// Bind `name` to an object; fails `AlreadyBound` if the last component is taken.
    pub fn bind(&self, name: &CompoundName, object: ObjectRef) -> Result<(), NamingError> {
        self.bind_target(name, Target::Object(object), BindMode::Bind, Operation::Bind)
    }

    /// Bind `name` to another naming context.
    pub fn bind_context(
        &self,
        name: &CompoundName,
        context: &NamingContext,
    ) -> Result<(), NamingError> {
        self.bind_target(
            name,
            Target::Context(context.key.clone()),
            BindMode::Bind,
            Operation::BindContext,
        )
    }

    /// Bind `name` to an object, replacing an existing object binding.
    pub fn rebind(&self, name: &CompoundName, object: ObjectRef) -> Result<(), NamingError> {
        self.bind_target(name, Target::Object(object), BindMode::Rebind, Operation::Rebind)
    }

    /// Bind `name` to a context, replacing an existing context binding.
    pub fn rebind_context(
        &self,
        name: &CompoundName,
        context: &NamingContext,
    ) -> Result<(), NamingError> {
        self.bind_target(
            name,
            Target::Context(context.key.clone()),
            BindMode::Rebind,
            Operation::RebindContext,
        )
    }

    pub fn resolve(&self, name: &CompoundName) -> Result<Target, NamingError> {
        if let Some(rest) = name.rest() {
            return self.child(name)?.resolve(&rest);
        }
        let component = name.first();
        self.core
            .activator
            .with_context(&self.key, Operation::Resolve, Intent::Existing, |ctx| {
                ctx.bindings()
                    .get(component)
                    .map(|b| b.target.clone())
                    .ok_or_else(|| NamingError::NotFound { rest: name.clone() })
            })
    }

    /// Resolve `name` and require the target to be a naming context.
    pub fn resolve_context(&self, name: &CompoundName) -> Result<NamingContext, NamingError> {
        match self.resolve(name)? {
            Target::Context(key) => Ok(NamingContext::new(key, Arc::clone(&self.core))),
            Target::Object(_) => Err(NamingError::NotAContext { rest: name.clone() }),
        }
    }

    pub fn unbind(&self, name: &CompoundName) -> Result<(), NamingError> {
        if let Some(rest) = name.rest() {
            return self.child(name)?.unbind(&rest);
        }
        let component = name.first();
        let activator = &self.core.activator;
        activator.with_context(&self.key, Operation::Unbind, Intent::Existing, |ctx| {
            if ctx.bindings().get(component).is_none() {
                return Err(NamingError::NotFound { rest: name.clone() });
            }
            ctx.bindings_mut()?.remove(component);
            activator.commit(ctx)
        })
    }

    /// Up to `max` bindings in insertion order, plus an iterator over the
    /// rest when the context holds more.
    pub fn list(
        &self,
        max: usize,
    ) -> Result<(Vec<Binding>, Option<BindingIterator>), NamingError> {
        self.core
            .activator
            .with_context(&self.key, Operation::List, Intent::Existing, |ctx| {
                let (head, tail) = ctx.bindings().page(max);
                let more = if tail.is_empty() {
                    None
                } else {
                    Some(BindingIterator::new(tail))
                };
                Ok((head, more))
            })
    }

    /// Create a new, unbound context.
    pub fn new_context(&self) -> Result<NamingContext, NamingError> {
        self.core
            .activator
            .with_context(&self.key, Operation::NewContext, Intent::Existing, |_| Ok(()))?;
        self.core.create_unbound_context()
    }

    /// Create a context and bind it under `name` in one step.
    ///
    /// If the bind fails the new context is destroyed again and the bind
    /// error is returned.
    pub fn bind_new_context(&self, name: &CompoundName) -> Result<NamingContext, NamingError> {
        if let Some(rest) = name.rest() {
            return self.child(name)?.bind_new_context(&rest);
        }

        let _creating = self.core.creation_gate.read_recursive();
        let created = self.core.create_context()?;
        let bound = self.bind_target(
            name,
            Target::Context(created.key.clone()),
            BindMode::Bind,
            Operation::BindNewContext,
        );
        match bound {
            Ok(()) => Ok(created),
            Err(err) => {
                warn!(
                    key = %created.key,
                    name = %name,
                    error = %err,
                    "Bind of new context failed; destroying it"
                );
                if let Err(cleanup) = created.destroy() {
                    warn!(key = %created.key, error = %cleanup, "Could not destroy unbound context");
                }
                Err(err)
            }
        }
    }

    /// Delete this context. It must have no bindings and must not be the root.
    pub fn destroy(&self) -> Result<(), NamingError> {
        if self.key == self.core.root {
            return Err(NamingError::BadOperation(
                "the root context cannot be destroyed".to_string(),
            ));
        }
        let activator = &self.core.activator;
        activator.with_context(&self.key, Operation::Destroy, Intent::Existing, |ctx| {
            if !ctx.bindings().is_empty() {
                return Err(NamingError::NotEmpty(ctx.key().clone()));
            }
            activator.remove(ctx)
        })?;
        self.core.clear_unbound(&self.key);
        Ok(())
    }

    pub fn to_string(&self, name: &CompoundName) -> String {
        crate::name::to_string(name)
    }

    pub fn to_name(&self, text: &str) -> Result<CompoundName, NamingError> {
        crate::name::to_name(text)
    }

    pub fn resolve_str(&self, text: &str) -> Result<Target, NamingError> {
        self.resolve(&crate::name::to_name(text)?)
    }

    fn bind_target(
        &self,
        name: &CompoundName,
        target: Target,
        mode: BindMode,
        operation: Operation,
    ) -> Result<(), NamingError> {
        if let Some(rest) = name.rest() {
            return self.child(name)?.bind_target(&rest, target, mode, operation);
        }
        let _creating = self.core.creation_gate.read_recursive();
        let bound_context = target.as_context().cloned();
        let binding = Binding {
            name: name.first().clone(),
            target,
        };
        let activator = &self.core.activator;
        activator.with_context(&self.key, operation, Intent::Existing, |ctx| {
            if let Some(key) = &bound_context {
                if key != ctx.key() && !self.core.store.exists(key)? {
                    return Err(NamingError::ObjectNotFound(key.clone()));
                }
            }
            match mode {
                BindMode::Bind => ctx.bindings_mut()?.insert(binding)?,
                BindMode::Rebind => {
                    ctx.bindings_mut()?.replace(binding)?;
                }
            }
            activator.commit(ctx)
        })?;
        if let Some(key) = &bound_context {
            self.core.clear_unbound(key);
        }
        Ok(())
    }

    /// Context bound under the first component of `name`.
    fn child(&self, name: &CompoundName) -> Result<NamingContext, NamingError> {
        let component: &NameComponent = name.first();
        let key = self.core.activator.with_context(
            &self.key,
            Operation::Resolve,
            Intent::Existing,
            |ctx| match ctx.bindings().get(component) {
                None => Err(NamingError::NotFound { rest: name.clone() }),
                Some(binding) => match &binding.target {
                    Target::Context(key) => Ok(key.clone()),
                    Target::Object(_) => Err(NamingError::NotAContext { rest: name.clone() }),
                },
            },
        )?;
        Ok(NamingContext::new(key, Arc::clone(&self.core)))
    }
}

impl PartialEq for NamingContext {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for NamingContext {}

impl fmt::Debug for NamingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamingContext").field("key", &self.key).finish()
    }
}
