//! Pantry Integration Tests
//!
//! End-to-end tests through the public `pantry` API:
//! - Persistence: reopen, torn log tails, directory locking
//! - Concurrency: readers alongside a writer
//! - Plans: filter-only plans agree with a filtered scan

mod common;

mod concurrency;
mod persistence;
mod plans;
