//! CLI domain: parse, route, help, output, and presentation only.
//! No naming logic; a single route table dispatches to the name service.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{format_listing_json, format_listing_text, ListingOutput};
pub use route::RunContext;
