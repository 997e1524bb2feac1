//! Configuration System
//!
//! Layered configuration for the naming service: built-in defaults, the
//! user's global file, workspace files, then `NAMESTORE__*` environment
//! variables. Tests included.

use crate::activator::RetentionPolicy;
use crate::error::NamingError;
use crate::logging::LoggingConfig;
use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge {
    pub mod merge_policy;
}
mod sources {
    pub mod global_file;
    pub mod workspace_file;
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamestoreConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub activation: ActivationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where and how context records are persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the sled database
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Flush to disk before acknowledging each mutation
    #[serde(default = "default_true")]
    pub flush_on_write: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            flush_on_write: true,
        }
    }
}

/// Whether activated contexts stay resident between requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetentionMode {
    #[default]
    None,
    Cache,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationConfig {
    #[serde(default)]
    pub retention: RetentionMode,

    /// Upper bound on resident contexts when `retention = "cache"`
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            retention: RetentionMode::None,
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl ActivationConfig {
    pub fn retention_policy(&self) -> RetentionPolicy {
        match self.retention {
            RetentionMode::None => RetentionPolicy::None,
            RetentionMode::Cache => RetentionPolicy::Cache {
                capacity: self.cache_capacity,
            },
        }
    }
}

/// Default store location: the platform data directory, or a relative
/// `.namestore/store` when no home directory can be determined.
pub fn default_store_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "namestore")
        .map(|dirs| dirs.data_dir().join("store"))
        .unwrap_or_else(|| PathBuf::from(".namestore/store"))
}

fn default_true() -> bool {
    true
}

fn default_cache_capacity() -> usize {
    256
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Storage(String),
    Activation(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Activation(msg) => write!(f, "Activation: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl NamestoreConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.storage.path.as_os_str().is_empty() {
            errors.push(ValidationError::Storage(
                "Store path cannot be empty".to_string(),
            ));
        }

        if self.activation.retention == RetentionMode::Cache && self.activation.cache_capacity == 0
        {
            errors.push(ValidationError::Activation(
                "cache_capacity must be positive when retention is \"cache\"".to_string(),
            ));
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold all problems into a single error.
    pub fn check(&self) -> Result<(), NamingError> {
        self.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            NamingError::Config(format!(
                "Configuration validation failed:\n{}",
                msgs.join("\n")
            ))
        })
    }
}

/// Loads [`NamestoreConfig`] from its layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for `workspace_root`.
    ///
    /// Precedence, lowest first: defaults, global file, `config/config.toml`,
    /// `config/{NAMESTORE_ENV}.toml`, `NAMESTORE__SECTION__KEY` variables.
    pub fn load(workspace_root: &Path) -> Result<NamestoreConfig, NamingError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = builder.add_source(
            Environment::with_prefix("NAMESTORE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Load a single TOML file over the defaults.
    pub fn load_from_file(path: &Path) -> Result<NamestoreConfig, NamingError> {
        let config = merge::merge_policy::builder_with_defaults()?
            .add_source(File::from(path).format(FileFormat::Toml).required(true))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Built-in defaults only.
    pub fn default() -> NamestoreConfig {
        NamestoreConfig::default()
    }

    /// Path of the user-level config file, if a home directory is known.
    pub fn global_config_path() -> Option<PathBuf> {
        sources::global_file::global_config_path()
    }

    /// Render `config` as TOML, e.g. to seed a config file.
    pub fn to_toml(config: &NamestoreConfig) -> Result<String, NamingError> {
        toml::to_string_pretty(config).map_err(|e| NamingError::Config(e.to_string()))
    }

    #[cfg(test)]
    fn defaults_only() -> Result<config::Config, NamingError> {
        Ok(merge::merge_policy::builder_with_defaults()?.build()?)
    }
}
