//! CLI help and command-name contract for logging.

use crate::cli::parse::Commands;

/// Command name string recorded on every command's log events.
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Root => "root",
        Commands::Bind { .. } => "bind",
        Commands::Rebind { .. } => "rebind",
        Commands::Resolve { .. } => "resolve",
        Commands::Unbind { .. } => "unbind",
        Commands::List { .. } => "list",
        Commands::Mkctx { .. } => "mkctx",
        Commands::Destroy { .. } => "destroy",
        Commands::Sweep => "sweep",
    }
}
