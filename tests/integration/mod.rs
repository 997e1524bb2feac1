//! Integration tests for the namestore naming service

mod bootstrap_restart;
mod compound_names;
mod concurrency;
mod test_utils;
