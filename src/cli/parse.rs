//! CLI parse: clap types for namestore. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Namestore CLI - persistent hierarchical naming service
#[derive(Parser)]
#[command(name = "namestore")]
#[command(about = "Bind, resolve and list names in a persistent naming service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Store directory (overrides storage.path from configuration)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Workspace root used to discover config/config.toml
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Names use the stringified form `a.kind/b/c`; references of the form
/// `context:<key>` bind naming contexts, anything else binds an object.
#[derive(Subcommand)]
pub enum Commands {
    /// Print the root context key
    Root,
    /// Bind a name; fails if already bound
    Bind {
        name: String,
        reference: String,
    },
    /// Bind a name, replacing an existing binding of the same type
    Rebind {
        name: String,
        reference: String,
    },
    /// Resolve a name to its target
    Resolve {
        name: String,
    },
    /// Remove a binding
    Unbind {
        name: String,
    },
    /// List bindings of the root or of the context bound at NAME
    List {
        name: Option<String>,
        /// Maximum bindings to show
        #[arg(long, default_value = "100")]
        max: usize,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Create a context and bind it at NAME
    Mkctx {
        name: String,
    },
    /// Destroy the empty context bound at NAME and remove its binding
    Destroy {
        name: String,
    },
    /// Delete contexts that are not reachable from the root
    Sweep,
}
