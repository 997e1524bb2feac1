//! Stringified names
//!
//! Converts between `CompoundName` and its string form. Components are
//! separated by `/`, id and kind by `.`, and `\` escapes any of `/`, `.`, `\`.
//! `a/b.svc` is the two-component name `[(a, ""), (b, "svc")]`.

use crate::error::NamingError;
use crate::types::{CompoundName, NameComponent};

const SEPARATOR: char = '/';
const KIND_SEPARATOR: char = '.';
const ESCAPE: char = '\\';

fn escape_into(out: &mut String, raw: &str) {
    for c in raw.chars() {
        if c == SEPARATOR || c == KIND_SEPARATOR || c == ESCAPE {
            out.push(ESCAPE);
        }
        out.push(c);
    }
}

/// String form of a single component.
pub fn component_to_string(component: &NameComponent) -> String {
    let mut out = String::with_capacity(component.id.len() + component.kind.len() + 1);
    escape_into(&mut out, &component.id);
    if !component.kind.is_empty() {
        out.push(KIND_SEPARATOR);
        escape_into(&mut out, &component.kind);
    }
    out
}

/// String form of a compound name.
pub fn to_string(name: &CompoundName) -> String {
    name.iter()
        .map(component_to_string)
        .collect::<Vec<_>>()
        .join("/")
}

/// Parse a stringified name.
pub fn to_name(input: &str) -> Result<CompoundName, NamingError> {
    if input.is_empty() {
        return Err(NamingError::InvalidName("empty name string".to_string()));
    }

    let mut components = Vec::new();
    let mut id = String::new();
    let mut kind = String::new();
    let mut in_kind = false;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match c {
            ESCAPE => {
                let escaped = chars.next().ok_or_else(|| {
                    NamingError::InvalidName(format!("dangling escape in '{}'", input))
                })?;
                if in_kind {
                    kind.push(escaped);
                } else {
                    id.push(escaped);
                }
            }
            SEPARATOR => {
                components.push(finish_component(input, &mut id, &mut kind)?);
                in_kind = false;
            }
            KIND_SEPARATOR => {
                if in_kind {
                    return Err(NamingError::InvalidName(format!(
                        "more than one unescaped '.' in a component of '{}'",
                        input
                    )));
                }
                in_kind = true;
            }
            other => {
                if in_kind {
                    kind.push(other);
                } else {
                    id.push(other);
                }
            }
        }
    }
    components.push(finish_component(input, &mut id, &mut kind)?);

    CompoundName::new(components)
}

fn finish_component(
    input: &str,
    id: &mut String,
    kind: &mut String,
) -> Result<NameComponent, NamingError> {
    if id.is_empty() && kind.is_empty() {
        return Err(NamingError::InvalidName(format!(
            "empty component in '{}'",
            input
        )));
    }
    Ok(NameComponent::new(std::mem::take(id), std::mem::take(kind)))
}
