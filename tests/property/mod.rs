//! Property-based tests for naming invariants

mod bindings;
