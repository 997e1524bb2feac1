//! Request dispatch
//!
//! Entry point for a request-routing layer that delivers
//! `(context key, operation name, arguments)` triples. The operation name
//! must agree with the request arguments; each call activates the target
//! context(s) and releases them before the reply is returned.

use crate::activator::{Intent, Operation};
use crate::error::NamingError;
use crate::service::NameService;
use crate::types::{Binding, CompoundName, ContextKey, ObjectRef, Target};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Arguments of one naming operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Bind { name: CompoundName, object: ObjectRef },
    BindContext { name: CompoundName, context: ContextKey },
    Rebind { name: CompoundName, object: ObjectRef },
    RebindContext { name: CompoundName, context: ContextKey },
    Resolve { name: CompoundName },
    Unbind { name: CompoundName },
    List { max: usize },
    NewContext,
    BindNewContext { name: CompoundName },
    Destroy,
    ToString { name: CompoundName },
    ToName { text: String },
    ResolveStr { text: String },
}

impl Request {
    pub fn operation(&self) -> Operation {
        match self {
            Request::Bind { .. } => Operation::Bind,
            Request::BindContext { .. } => Operation::BindContext,
            Request::Rebind { .. } => Operation::Rebind,
            Request::RebindContext { .. } => Operation::RebindContext,
            Request::Resolve { .. } => Operation::Resolve,
            Request::Unbind { .. } => Operation::Unbind,
            Request::List { .. } => Operation::List,
            Request::NewContext => Operation::NewContext,
            Request::BindNewContext { .. } => Operation::BindNewContext,
            Request::Destroy => Operation::Destroy,
            Request::ToString { .. } => Operation::ToString,
            Request::ToName { .. } => Operation::ToName,
            Request::ResolveStr { .. } => Operation::ResolveStr,
        }
    }
}

/// Result of a dispatched operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum Reply {
    Done,
    Resolved { target: Target },
    Context { key: ContextKey },
    /// First page of a listing; `rest` is the snapshot behind the continuation.
    Listing {
        bindings: Vec<Binding>,
        rest: Vec<Binding>,
    },
    Name { name: CompoundName },
    Text { text: String },
}

impl NameService {
    /// Dispatch one request addressed to the context `key`.
    pub fn handle(
        &self,
        key: &str,
        operation: &str,
        request: Request,
    ) -> Result<Reply, NamingError> {
        let operation: Operation = operation.parse()?;
        if operation != request.operation() {
            return Err(NamingError::BadOperation(format!(
                "operation {} does not match {} arguments",
                operation,
                request.operation()
            )));
        }
        debug!(key = key, operation = %operation, "Dispatching request");

        let target = self.context(ContextKey::from_raw(key));
        let reply = match request {
            Request::Bind { name, object } => {
                target.bind(&name, object)?;
                Reply::Done
            }
            Request::BindContext { name, context } => {
                target.bind_context(&name, &self.context(context))?;
                Reply::Done
            }
            Request::Rebind { name, object } => {
                target.rebind(&name, object)?;
                Reply::Done
            }
            Request::RebindContext { name, context } => {
                target.rebind_context(&name, &self.context(context))?;
                Reply::Done
            }
            Request::Resolve { name } => Reply::Resolved {
                target: target.resolve(&name)?,
            },
            Request::Unbind { name } => {
                target.unbind(&name)?;
                Reply::Done
            }
            Request::List { max } => {
                let (bindings, more) = target.list(max)?;
                Reply::Listing {
                    bindings,
                    rest: more.map(|it| it.collect()).unwrap_or_default(),
                }
            }
            Request::NewContext => Reply::Context {
                key: target.new_context()?.key().clone(),
            },
            Request::BindNewContext { name } => Reply::Context {
                key: target.bind_new_context(&name)?.key().clone(),
            },
            Request::Destroy => {
                target.destroy()?;
                Reply::Done
            }
            Request::ToString { name } => {
                self.ensure_active(target.key(), operation)?;
                Reply::Text {
                    text: target.to_string(&name),
                }
            }
            Request::ToName { text } => {
                self.ensure_active(target.key(), operation)?;
                Reply::Name {
                    name: target.to_name(&text)?,
                }
            }
            Request::ResolveStr { text } => Reply::Resolved {
                target: target.resolve_str(&text)?,
            },
        };
        Ok(reply)
    }

    /// Activate and release `key` so requests to unknown contexts fail even
    /// when the operation itself needs no bindings.
    fn ensure_active(&self, key: &ContextKey, operation: Operation) -> Result<(), NamingError> {
        self.core()
            .activator
            .with_context(key, operation, Intent::Existing, |_| Ok(()))
    }
}
