//! Benchmark harness for a versioned, trie-backed account/storage state
//! store.
//!
//! The harness drives a synthetic two-phase workload against the store:
//! phase 1 creates accounts with variable slot counts from a fixed-seed
//! stream, phase 2 rewrites slots of a random account subset. Work is
//! grouped into fixed-size account batches; every batch boundary commits,
//! materializes the new root, samples memory/disk cost, and reopens the
//! working view at the new root to bound the in-memory dirty set.
//!
//! The store itself is a collaborator behind the [`store::StateStore`] /
//! [`store::StateView`] traits; everything in this crate is about what to
//! write and when to commit, not how state is persisted.

pub mod cli;
pub mod harness;
pub mod metrics;
pub mod observer;
pub mod schedule;
pub mod store;
pub mod tracing;
pub mod workload;
