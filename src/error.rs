//! Error types for the namestore naming service.

use crate::types::{CompoundName, ContextKey, NameComponent};
use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Corrupt record for {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Context key space exhausted")]
    AllocatorExhausted,

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Naming operation errors
#[derive(Debug, Error)]
pub enum NamingError {
    #[error("Name not found: {rest}")]
    NotFound { rest: CompoundName },

    #[error("Name already bound: {0}")]
    AlreadyBound(NameComponent),

    #[error("Not a naming context: {rest}")]
    NotAContext { rest: CompoundName },

    #[error("Bound to a naming context, not an object: {0}")]
    NotAnObject(NameComponent),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Naming context {0} still has bindings")]
    NotEmpty(ContextKey),

    #[error("No naming context with key {0}")]
    ObjectNotFound(ContextKey),

    #[error("Unsupported operation: {0}")]
    BadOperation(String),

    #[error("Root context {0} is recorded but its record is missing")]
    RootMissing(ContextKey),

    #[error("Context key space exhausted")]
    AllocatorExhausted,

    #[error("Storage error: {0}")]
    Storage(StorageError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl NamingError {
    /// True for failures caused by the store rather than by the caller's request.
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, NamingError::Storage(_))
    }
}

impl From<StorageError> for NamingError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AllocatorExhausted => NamingError::AllocatorExhausted,
            other => NamingError::Storage(other),
        }
    }
}

impl From<config::ConfigError> for NamingError {
    fn from(err: config::ConfigError) -> Self {
        NamingError::Config(err.to_string())
    }
}
