//! Presentation: listing formatters (comfy-table text and JSON).

use crate::error::NamingError;
use crate::types::{Binding, ContextKey, Target};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde::Serialize;

/// One `list` result as rendered by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct ListingOutput {
    pub context: ContextKey,
    pub bindings: Vec<Binding>,
    /// Bindings left in the continuation after the shown page.
    pub remaining: usize,
}

pub fn format_listing_text(listing: &ListingOutput) -> String {
    let mut out = format!("Context {}\n\n", listing.context);
    if listing.bindings.is_empty() {
        out.push_str("No bindings.");
        return out;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Id", "Kind", "Type", "Target"]);
    for binding in &listing.bindings {
        let target = match &binding.target {
            Target::Object(obj) => obj.to_string(),
            Target::Context(key) => key.to_string(),
        };
        table.add_row(vec![
            binding.name.id.clone(),
            binding.name.kind.clone(),
            binding.binding_type().to_string(),
            target,
        ]);
    }
    out.push_str(&table.to_string());
    if listing.remaining > 0 {
        out.push_str(&format!("\n\n{} more (raise --max to see them)", listing.remaining));
    }
    out
}

pub fn format_listing_json(listing: &ListingOutput) -> Result<String, NamingError> {
    serde_json::to_string_pretty(listing)
        .map_err(|e| NamingError::Config(format!("Failed to render JSON: {}", e)))
}
