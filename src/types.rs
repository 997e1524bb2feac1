//! Core naming types: keys, names, references and bindings.

use crate::error::NamingError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of every allocated context key.
pub const CONTEXT_KEY_PREFIX: &str = "NC";

/// Opaque identity of a naming context.
///
/// The same string is handed to the request-routing layer as the object key
/// and used as the primary key of the context's record in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextKey(String);

impl ContextKey {
    /// Key for the allocator slot `index`.
    pub fn from_index(index: u64) -> Self {
        ContextKey(format!("{}{}", CONTEXT_KEY_PREFIX, index))
    }

    /// Wrap a key received from outside (e.g. an incoming request).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        ContextKey(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One (id, kind) edge of the namespace tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NameComponent {
    pub id: String,
    pub kind: String,
}

impl NameComponent {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        NameComponent {
            id: id.into(),
            kind: kind.into(),
        }
    }

    /// Component with an empty kind.
    pub fn id(id: impl Into<String>) -> Self {
        Self::new(id, "")
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.kind.is_empty()
    }
}

impl fmt::Display for NameComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::name::component_to_string(self))
    }
}

/// Non-empty ordered sequence of name components.
///
/// Construction validates the name, so every operation receiving a
/// `CompoundName` can rely on at least one non-empty component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<NameComponent>", into = "Vec<NameComponent>")]
pub struct CompoundName(Vec<NameComponent>);

impl CompoundName {
    pub fn new(components: Vec<NameComponent>) -> Result<Self, NamingError> {
        if components.is_empty() {
            return Err(NamingError::InvalidName("name has no components".to_string()));
        }
        if let Some(pos) = components.iter().position(NameComponent::is_empty) {
            return Err(NamingError::InvalidName(format!(
                "component {} has neither id nor kind",
                pos
            )));
        }
        Ok(CompoundName(components))
    }

    /// Build a name from bare ids (empty kinds).
    pub fn from_ids<S: AsRef<str>>(ids: &[S]) -> Result<Self, NamingError> {
        Self::new(ids.iter().map(|id| NameComponent::id(id.as_ref())).collect())
    }

    pub fn single(component: NameComponent) -> Result<Self, NamingError> {
        Self::new(vec![component])
    }

    pub fn components(&self) -> &[NameComponent] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_single(&self) -> bool {
        self.0.len() == 1
    }

    pub fn first(&self) -> &NameComponent {
        &self.0[0]
    }

    pub fn last(&self) -> &NameComponent {
        &self.0[self.0.len() - 1]
    }

    /// Everything after the first component, or `None` for a single-component name.
    pub fn rest(&self) -> Option<CompoundName> {
        if self.is_single() {
            None
        } else {
            Some(CompoundName(self.0[1..].to_vec()))
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NameComponent> {
        self.0.iter()
    }
}

impl TryFrom<Vec<NameComponent>> for CompoundName {
    type Error = NamingError;

    fn try_from(components: Vec<NameComponent>) -> Result<Self, Self::Error> {
        Self::new(components)
    }
}

impl From<CompoundName> for Vec<NameComponent> {
    fn from(name: CompoundName) -> Self {
        name.0
    }
}

impl fmt::Display for CompoundName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::name::to_string(self))
    }
}

/// Opaque reference to an externally managed object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectRef(String);

impl ObjectRef {
    pub fn new(reference: impl Into<String>) -> Self {
        ObjectRef(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Binding type tag, `n_object` or `n_context`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingType {
    Object,
    Context,
}

impl fmt::Display for BindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingType::Object => f.write_str("n_object"),
            BindingType::Context => f.write_str("n_context"),
        }
    }
}

/// What a binding points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Object(ObjectRef),
    Context(ContextKey),
}

impl Target {
    pub fn binding_type(&self) -> BindingType {
        match self {
            Target::Object(_) => BindingType::Object,
            Target::Context(_) => BindingType::Context,
        }
    }

    pub fn as_context(&self) -> Option<&ContextKey> {
        match self {
            Target::Context(key) => Some(key),
            Target::Object(_) => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Object(obj) => write!(f, "{}", obj),
            Target::Context(key) => write!(f, "context:{}", key),
        }
    }
}

/// Entry inside a context: the last name component and its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub name: NameComponent,
    pub target: Target,
}

impl Binding {
    pub fn binding_type(&self) -> BindingType {
        self.target.binding_type()
    }
}
