//! Merge rules: defaults, override order, conflict handling.

use crate::config::default_store_path;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default(
            "storage.path",
            default_store_path().to_string_lossy().to_string(),
        )?
        .set_default("storage.flush_on_write", true)?
        .set_default("activation.retention", "none")?
        .set_default("activation.cache_capacity", 256_i64)
}
