//! A versioned, Merkle-Patricia-trie-backed account/storage state store.
//!
//! State is a two-level trie structure in the Ethereum style: an account trie
//! keyed by `keccak(address)` whose leaves are RLP
//! [`AccountRecord`]s, each pointing at a per-account storage trie keyed by
//! 32-byte slot hashes. All trie nodes live in one RocksDB-backed,
//! content-addressed node store.
//!
//! Mutation happens through a [`StateView`]: an owned handle rooted at a
//! prior commit that buffers dirty writes in memory until
//! [`StateView::commit`] folds them into the tries, persists the new nodes,
//! and returns the root of the next version in the chain. Roots form a
//! strictly linear history; [`TrieStore::materialize`] advances the durable
//! head pointer and flushes the backend so its pruning bookkeeping can move
//! forward.

pub mod account;
pub mod error;
pub mod kv;
pub mod store;
pub mod view;

pub use account::{AccountRecord, EMPTY_CODE_HASH, EMPTY_TRIE_ROOT};
pub use error::{StoreError, StoreResult};
pub use kv::{KvConfig, RocksKv};
pub use store::TrieStore;
pub use view::StateView;
