//! The consumed surface of the state-store collaborator.
//!
//! The harness only ever talks to the store through these two traits, which
//! keeps the collaborator swappable and lets tests inject failing stores.

use ethereum_types::{Address, H256, U256};
use mpt_state::{StoreError, TrieStore};

/// A store of versioned state, handing out one mutable view at a time.
pub trait StateStore {
    /// Failure type shared by store and view operations.
    type Error: std::error::Error + Send + Sync + 'static;
    /// The mutable view type this store hands out.
    type View: StateView<Error = Self::Error>;

    /// Root of the empty state, the base of every fresh chain.
    fn empty_root(&self) -> H256;

    /// Acquire a fresh view rooted at `root`.
    fn open_at(&self, root: H256) -> Result<Self::View, Self::Error>;

    /// Durably record `root` as the head of the chain and flush the backend.
    fn materialize(&self, root: H256) -> Result<(), Self::Error>;
}

/// The mutable working state rooted at a prior commit.
pub trait StateView {
    /// Failure type of commits.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Buffer a balance write.
    fn set_balance(&mut self, address: Address, balance: U256);

    /// Buffer a nonce write.
    fn set_nonce(&mut self, address: Address, nonce: u64);

    /// Buffer a storage-slot write; zero values clear the slot.
    fn set_storage(&mut self, address: Address, slot: H256, value: H256);

    /// Persist everything buffered since the last commit under `revision`
    /// and return the new root.
    fn commit(&mut self, revision: u64) -> Result<H256, Self::Error>;
}

impl StateStore for TrieStore {
    type Error = StoreError;
    type View = mpt_state::StateView;

    fn empty_root(&self) -> H256 {
        TrieStore::empty_root(self)
    }

    fn open_at(&self, root: H256) -> Result<Self::View, StoreError> {
        TrieStore::open_at(self, root)
    }

    fn materialize(&self, root: H256) -> Result<(), StoreError> {
        TrieStore::materialize(self, root)
    }
}

impl StateView for mpt_state::StateView {
    type Error = StoreError;

    fn set_balance(&mut self, address: Address, balance: U256) {
        mpt_state::StateView::set_balance(self, address, balance);
    }

    fn set_nonce(&mut self, address: Address, nonce: u64) {
        mpt_state::StateView::set_nonce(self, address, nonce);
    }

    fn set_storage(&mut self, address: Address, slot: H256, value: H256) {
        mpt_state::StateView::set_storage(self, address, slot, value);
    }

    fn commit(&mut self, revision: u64) -> Result<H256, StoreError> {
        mpt_state::StateView::commit(self, revision)
    }
}
