//! CLI route: single route table and run context. Dispatches to the name service and presentation.

use crate::cli::help::command_name;
use crate::cli::parse::Commands;
use crate::cli::presentation::{format_listing_json, format_listing_text, ListingOutput};
use crate::config::{ConfigLoader, NamestoreConfig};
use crate::error::NamingError;
use crate::name::to_name;
use crate::naming::NamingContext;
use crate::service::NameService;
use crate::types::{ContextKey, ObjectRef, Target};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

const CONTEXT_REF_PREFIX: &str = "context:";

/// Runtime context for CLI execution: loaded configuration and the opened service.
pub struct RunContext {
    service: NameService,
    config: NamestoreConfig,
}

impl RunContext {
    /// Load configuration, apply the `--store` override, and bootstrap the service.
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        store: Option<PathBuf>,
    ) -> Result<Self, NamingError> {
        let mut config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        if let Some(store) = store {
            config.storage.path = store;
        }
        Self::from_config(config)
    }

    pub fn from_config(config: NamestoreConfig) -> Result<Self, NamingError> {
        config.check()?;
        std::fs::create_dir_all(&config.storage.path)
            .map_err(|e| NamingError::Storage(e.into()))?;
        let service = NameService::bootstrap(&config)?;
        Ok(Self { service, config })
    }

    pub fn service(&self) -> &NameService {
        &self.service
    }

    pub fn config(&self) -> &NamestoreConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, NamingError> {
        let started = Instant::now();
        let result = self.execute_inner(command);
        info!(
            command = command_name(command),
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, NamingError> {
        let root = self.service.root();
        match command {
            Commands::Root => Ok(self.service.root_key().to_string()),
            Commands::Bind { name, reference } => {
                let name = to_name(name)?;
                match parse_reference(reference) {
                    Target::Object(obj) => root.bind(&name, obj)?,
                    Target::Context(key) => root.bind_context(&name, &self.service.context(key))?,
                }
                Ok(format!("Bound {}", name))
            }
            Commands::Rebind { name, reference } => {
                let name = to_name(name)?;
                match parse_reference(reference) {
                    Target::Object(obj) => root.rebind(&name, obj)?,
                    Target::Context(key) => {
                        root.rebind_context(&name, &self.service.context(key))?
                    }
                }
                Ok(format!("Rebound {}", name))
            }
            Commands::Resolve { name } => Ok(root.resolve_str(name)?.to_string()),
            Commands::Unbind { name } => {
                let name = to_name(name)?;
                root.unbind(&name)?;
                Ok(format!("Unbound {}", name))
            }
            Commands::List { name, max, format } => {
                let context = match name {
                    Some(name) => root.resolve_context(&to_name(name)?)?,
                    None => root,
                };
                self.list(&context, *max, format)
            }
            Commands::Mkctx { name } => {
                let created = root.bind_new_context(&to_name(name)?)?;
                Ok(created.key().to_string())
            }
            Commands::Destroy { name } => {
                let name = to_name(name)?;
                let context = root.resolve_context(&name)?;
                root.unbind(&name)?;
                if let Err(err) = context.destroy() {
                    warn!(
                        name = %name,
                        key = %context.key(),
                        error = %err,
                        "Destroy failed; restoring binding"
                    );
                    root.bind_context(&name, &context)?;
                    return Err(err);
                }
                Ok(format!("Destroyed {} ({})", name, context.key()))
            }
            Commands::Sweep => {
                let removed = self.service.sweep_unreachable()?;
                if removed.is_empty() {
                    Ok("No unreachable contexts.".to_string())
                } else {
                    let keys: Vec<String> = removed.iter().map(ContextKey::to_string).collect();
                    Ok(format!("Removed {}: {}", keys.len(), keys.join(", ")))
                }
            }
        }
    }

    fn list(&self, context: &NamingContext, max: usize, format: &str) -> Result<String, NamingError> {
        let (bindings, rest) = context.list(max)?;
        let listing = ListingOutput {
            context: context.key().clone(),
            bindings,
            remaining: rest.map(|it| it.remaining()).unwrap_or(0),
        };
        match format {
            "json" => format_listing_json(&listing),
            "text" => Ok(format_listing_text(&listing)),
            other => Err(NamingError::Config(format!(
                "Invalid output format: {} (must be 'text' or 'json')",
                other
            ))),
        }
    }
}

fn parse_reference(reference: &str) -> Target {
    match reference.strip_prefix(CONTEXT_REF_PREFIX) {
        Some(key) => Target::Context(ContextKey::from_raw(key)),
        None => Target::Object(ObjectRef::new(reference)),
    }
}
