//! Continuation handed out by `list` when a context has more bindings than requested.

use crate::types::Binding;
use std::collections::VecDeque;

/// Snapshot of the bindings that did not fit into a `list` reply.
///
/// The snapshot is taken when `list` runs; later changes to the context
/// are not reflected.
#[derive(Debug, Clone)]
pub struct BindingIterator {
    remaining: VecDeque<Binding>,
}

impl BindingIterator {
    pub(crate) fn new(remaining: Vec<Binding>) -> Self {
        Self {
            remaining: remaining.into(),
        }
    }

    pub fn next_one(&mut self) -> Option<Binding> {
        self.remaining.pop_front()
    }

    /// Up to `how_many` bindings; empty once exhausted.
    pub fn next_n(&mut self, how_many: usize) -> Vec<Binding> {
        let take = how_many.min(self.remaining.len());
        self.remaining.drain(..take).collect()
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn destroy(self) {}
}

impl Iterator for BindingIterator {
    type Item = Binding;

    fn next(&mut self) -> Option<Binding> {
        self.next_one()
    }
}
