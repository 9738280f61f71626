//! Mutable state views.

use std::collections::HashMap;
use std::sync::Arc;

use eth_trie::{EthTrie, Trie};
use ethereum_types::{Address, H256, U256};
use keccak_hash::keccak;

use crate::account::{AccountRecord, EMPTY_TRIE_ROOT};
use crate::error::{StoreError, StoreResult};
use crate::kv::{revision_key, RocksKv};

/// Writes buffered for a single account since the last commit.
#[derive(Debug, Default)]
struct DirtyAccount {
    balance: Option<U256>,
    nonce: Option<u64>,
    storage: HashMap<H256, H256>,
}

/// The mutable working state rooted at a specific prior commit.
///
/// A view buffers all writes in memory; nothing touches the node store until
/// [`commit`](Self::commit). Dropping an uncommitted view discards its dirty
/// set, leaving the durable state at the root the view was opened at.
pub struct StateView {
    kv: Arc<RocksKv>,
    root: H256,
    dirty: HashMap<Address, DirtyAccount>,
}

impl StateView {
    pub(crate) fn new(kv: Arc<RocksKv>, root: H256) -> Self {
        Self {
            kv,
            root,
            dirty: HashMap::new(),
        }
    }

    /// Root this view currently sits at. Advances on every commit.
    pub fn root(&self) -> H256 {
        self.root
    }

    /// Buffer a balance write for `address`.
    pub fn set_balance(&mut self, address: Address, balance: U256) {
        self.dirty.entry(address).or_default().balance = Some(balance);
    }

    /// Buffer a nonce write for `address`.
    pub fn set_nonce(&mut self, address: Address, nonce: u64) {
        self.dirty.entry(address).or_default().nonce = Some(nonce);
    }

    /// Buffer a storage-slot write. A zero `value` marks the slot for
    /// removal; the sparse representation stores no zero words.
    pub fn set_storage(&mut self, address: Address, slot: H256, value: H256) {
        self.dirty
            .entry(address)
            .or_default()
            .storage
            .insert(slot, value);
    }

    /// Fold every buffered write into the tries and persist the new nodes,
    /// recording the resulting root under `revision`.
    ///
    /// Returns the root of the next version in the chain. The dirty set is
    /// consumed whether or not the commit succeeds; a failed commit leaves
    /// the durable state at the prior root.
    pub fn commit(&mut self, revision: u64) -> StoreResult<H256> {
        let dirty = std::mem::take(&mut self.dirty);
        let mut accounts = self.open_trie(self.root);

        for (address, writes) in dirty {
            let key = keccak(address.as_bytes());
            let mut record = match accounts.get(key.as_bytes())? {
                Some(raw) => rlp::decode::<AccountRecord>(&raw)
                    .map_err(|source| StoreError::AccountDecode { address, source })?,
                None => AccountRecord::default(),
            };

            if !writes.storage.is_empty() {
                let mut storage = self.open_trie(record.storage_root);
                for (slot, value) in &writes.storage {
                    if value.is_zero() {
                        storage.remove(slot.as_bytes())?;
                    } else {
                        let word = U256::from_big_endian(value.as_bytes());
                        storage.insert(slot.as_bytes(), &rlp::encode(&word))?;
                    }
                }
                record.storage_root = storage.root_hash()?;
            }
            if let Some(balance) = writes.balance {
                record.balance = balance;
            }
            if let Some(nonce) = writes.nonce {
                record.nonce = nonce;
            }

            accounts.insert(key.as_bytes(), &rlp::encode(&record))?;
        }

        let root = accounts.root_hash()?;
        self.kv.put_meta(&revision_key(revision), root.as_bytes())?;
        self.root = root;
        tracing::debug!(revision, root = %root, "committed state version");

        Ok(root)
    }

    /// Current record for `address`: buffered writes layered over the
    /// committed leaf. Buffered storage writes are not reflected in
    /// `storage_root` until commit.
    pub fn account(&self, address: Address) -> StoreResult<Option<AccountRecord>> {
        let committed = self.committed_account(address)?;
        match self.dirty.get(&address) {
            None => Ok(committed),
            Some(writes) => {
                let mut record = committed.unwrap_or_default();
                if let Some(balance) = writes.balance {
                    record.balance = balance;
                }
                if let Some(nonce) = writes.nonce {
                    record.nonce = nonce;
                }
                Ok(Some(record))
            }
        }
    }

    /// Current word at `slot` of `address`, zero when absent.
    pub fn storage(&self, address: Address, slot: H256) -> StoreResult<H256> {
        if let Some(writes) = self.dirty.get(&address) {
            if let Some(value) = writes.storage.get(&slot) {
                return Ok(*value);
            }
        }

        let Some(record) = self.committed_account(address)? else {
            return Ok(H256::zero());
        };
        if record.storage_root == EMPTY_TRIE_ROOT {
            return Ok(H256::zero());
        }

        let storage = self.open_trie(record.storage_root);
        match storage.get(slot.as_bytes())? {
            Some(raw) => {
                let word: U256 = rlp::decode(&raw).map_err(StoreError::ValueDecode)?;
                let mut buf = [0_u8; 32];
                word.to_big_endian(&mut buf);
                Ok(H256(buf))
            }
            None => Ok(H256::zero()),
        }
    }

    fn committed_account(&self, address: Address) -> StoreResult<Option<AccountRecord>> {
        if self.root.is_zero() || self.root == EMPTY_TRIE_ROOT {
            return Ok(None);
        }
        let accounts = self.open_trie(self.root);
        match accounts.get(keccak(address.as_bytes()).as_bytes())? {
            Some(raw) => Ok(Some(rlp::decode(&raw).map_err(|source| {
                StoreError::AccountDecode { address, source }
            })?)),
            None => Ok(None),
        }
    }

    fn open_trie(&self, root: H256) -> EthTrie<RocksKv> {
        if root.is_zero() || root == EMPTY_TRIE_ROOT {
            EthTrie::new(self.kv.clone())
        } else {
            EthTrie::new(self.kv.clone()).at_root(root)
        }
    }
}
