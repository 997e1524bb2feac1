//! Namestore: Persistent Hierarchical Naming Service
//!
//! Maps compound names to object references or to nested naming contexts.
//! Contexts are identified by durable keys, stored one record per key, and
//! materialized only for the duration of the request that touches them.

pub mod activator;
pub mod allocator;
pub mod cli;
pub mod concurrency;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod name;
pub mod naming;
pub mod service;
pub mod store;
pub mod types;

pub use activator::{Operation, RetentionPolicy};
pub use config::{ConfigLoader, NamestoreConfig};
pub use dispatch::{Reply, Request};
pub use error::{NamingError, StorageError};
pub use naming::{BindingIterator, NamingContext};
pub use service::NameService;
pub use types::{Binding, BindingType, CompoundName, ContextKey, NameComponent, ObjectRef, Target};
