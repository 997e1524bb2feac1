//! CLI output: error mapping from naming errors to stable CLI surface.

use crate::error::NamingError;

/// Map service errors to a string for CLI output.
pub fn map_error(e: &NamingError) -> String {
    match e {
        NamingError::RootMissing(_) => format!(
            "{}\nThe store is damaged; restore it from backup or point --store elsewhere.",
            e
        ),
        NamingError::Storage(_) => format!("{}\nThe operation was not applied.", e),
        NamingError::NotEmpty(_) => format!("{}\nUnbind its entries first.", e),
        _ => e.to_string(),
    }
}
