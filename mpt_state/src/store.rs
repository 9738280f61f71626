//! The store handle: view acquisition, materialization, and revision
//! bookkeeping.

use std::path::Path;
use std::sync::Arc;

use ethereum_types::H256;

use crate::account::EMPTY_TRIE_ROOT;
use crate::error::{StoreError, StoreResult};
use crate::kv::{revision_key, KvConfig, RocksKv, META_HEAD_ROOT};
use crate::view::StateView;

/// Owning handle on a trie-backed state store.
///
/// The intended discipline is single ownership of the working state: acquire
/// one [`StateView`] at a root, mutate, commit, release it, then acquire the
/// next view at the returned root.
pub struct TrieStore {
    kv: Arc<RocksKv>,
}

impl TrieStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: impl AsRef<Path>, config: KvConfig) -> StoreResult<Self> {
        Ok(Self {
            kv: Arc::new(RocksKv::open(path, &config)?),
        })
    }

    /// Root of the empty state.
    pub fn empty_root(&self) -> H256 {
        EMPTY_TRIE_ROOT
    }

    /// Acquire a fresh mutable view rooted at `root`.
    ///
    /// Unless `root` names the empty state, its node must already be present
    /// in the store.
    pub fn open_at(&self, root: H256) -> StoreResult<StateView> {
        if !(root.is_zero() || root == EMPTY_TRIE_ROOT) && !self.kv.contains(root.as_bytes())? {
            return Err(StoreError::UnknownRoot(root));
        }
        Ok(StateView::new(self.kv.clone(), root))
    }

    /// Durably advance the head of the root chain to `root` and flush the
    /// backend, letting its pruning bookkeeping move forward.
    pub fn materialize(&self, root: H256) -> StoreResult<()> {
        self.kv.put_meta(META_HEAD_ROOT, root.as_bytes())?;
        self.kv.flush_all()?;
        tracing::debug!(root = %root, "materialized root");
        Ok(())
    }

    /// Root recorded for `revision`, if such a commit ever happened.
    pub fn revision_root(&self, revision: u64) -> StoreResult<Option<H256>> {
        self.read_root_row(&revision_key(revision))
    }

    /// Durable head of the root chain, if any root has materialized.
    pub fn head_root(&self) -> StoreResult<Option<H256>> {
        self.read_root_row(META_HEAD_ROOT)
    }

    fn read_root_row(&self, key: &[u8]) -> StoreResult<Option<H256>> {
        match self.kv.get_meta(key)? {
            Some(raw) if raw.len() == 32 => Ok(Some(H256::from_slice(&raw))),
            Some(_) => Err(StoreError::CorruptMeta("root row is not 32 bytes")),
            None => Ok(None),
        }
    }
}
