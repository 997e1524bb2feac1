//! Binding set of a single naming context.
//!
//! Bindings are kept in insertion order so repeated listings of an
//! unmodified context are identical. Rebinding an existing name replaces the
//! entry in place and keeps its position.

use crate::error::NamingError;
use crate::types::{Binding, BindingType, CompoundName, NameComponent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordered mapping (id, kind) -> binding
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Binding>", into = "Vec<Binding>")]
pub struct BindingSet {
    entries: Vec<Binding>,
    index: HashMap<NameComponent, usize>,
}

impl BindingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &NameComponent) -> Option<&Binding> {
        self.index.get(name).map(|&pos| &self.entries[pos])
    }

    /// Insert a new binding; fails `AlreadyBound` if the name is taken.
    pub fn insert(&mut self, binding: Binding) -> Result<(), NamingError> {
        if self.index.contains_key(&binding.name) {
            return Err(NamingError::AlreadyBound(binding.name));
        }
        self.index.insert(binding.name.clone(), self.entries.len());
        self.entries.push(binding);
        Ok(())
    }

    /// Insert or overwrite a binding.
    ///
    /// An existing binding may only be replaced by one of the same type:
    /// context over object fails `NotAContext`, object over context fails
    /// `NotAnObject`.
    pub fn replace(&mut self, binding: Binding) -> Result<Option<Binding>, NamingError> {
        match self.index.get(&binding.name) {
            Some(&pos) => {
                let existing = &self.entries[pos];
                match (existing.binding_type(), binding.binding_type()) {
                    (BindingType::Object, BindingType::Context) => {
                        return Err(NamingError::NotAContext {
                            rest: CompoundName::single(binding.name)?,
                        });
                    }
                    (BindingType::Context, BindingType::Object) => {
                        return Err(NamingError::NotAnObject(binding.name));
                    }
                    _ => {}
                }
                Ok(Some(std::mem::replace(&mut self.entries[pos], binding)))
            }
            None => {
                self.insert(binding)?;
                Ok(None)
            }
        }
    }

    pub fn remove(&mut self, name: &NameComponent) -> Option<Binding> {
        let pos = self.index.remove(name)?;
        let removed = self.entries.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Binding> {
        self.entries.iter()
    }

    /// Split a snapshot into the first `max` bindings and the remainder.
    pub fn page(&self, max: usize) -> (Vec<Binding>, Vec<Binding>) {
        let split = max.min(self.entries.len());
        (
            self.entries[..split].to_vec(),
            self.entries[split..].to_vec(),
        )
    }
}

impl From<Vec<Binding>> for BindingSet {
    fn from(entries: Vec<Binding>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(pos, b)| (b.name.clone(), pos))
            .collect();
        BindingSet { entries, index }
    }
}

impl From<BindingSet> for Vec<Binding> {
    fn from(set: BindingSet) -> Self {
        set.entries
    }
}

impl PartialEq for BindingSet {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for BindingSet {}
