//! RocksDB-backed node store.
//!
//! Trie nodes are keyed by their 32-byte hash. Bookkeeping rows live under a
//! `meta:` prefix whose lengths can never collide with a node key.

use std::path::Path;

use rocksdb::{BlockBasedOptions, Cache, DBCompressionType, Options, DB};

use crate::error::StoreResult;

pub(crate) const META_HEAD_ROOT: &[u8] = b"meta:head-root";
const META_REVISION_PREFIX: &[u8] = b"meta:revision:";

/// Bookkeeping key under which the root for `revision` is recorded.
pub(crate) fn revision_key(revision: u64) -> Vec<u8> {
    let mut key = META_REVISION_PREFIX.to_vec();
    key.extend_from_slice(&revision.to_be_bytes());
    key
}

/// Fixed tuning for the node store.
///
/// Compression stays off so the on-disk footprint tracks raw trie volume.
#[derive(Clone, Copy, Debug)]
pub struct KvConfig {
    /// Whether to compress blocks on disk.
    pub compression: bool,
    /// Open file handle budget.
    pub max_open_files: i32,
    /// Read block cache capacity in bytes.
    pub block_cache_bytes: usize,
    /// Memtable budget in bytes before spilling to disk.
    pub write_buffer_bytes: usize,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            compression: false,
            max_open_files: 1024,
            block_cache_bytes: 256 * 1024 * 1024,
            write_buffer_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Handle on the persistent node store.
pub struct RocksKv {
    db: DB,
}

impl RocksKv {
    /// Open (or create) a node store at `path` with the given tuning.
    pub fn open(path: impl AsRef<Path>, config: &KvConfig) -> StoreResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        if !config.compression {
            opts.set_compression_type(DBCompressionType::None);
        }
        opts.set_max_open_files(config.max_open_files);
        opts.set_write_buffer_size(config.write_buffer_bytes);

        let mut block_opts = BlockBasedOptions::default();
        block_opts.set_block_cache(&Cache::new_lru_cache(config.block_cache_bytes));
        opts.set_block_based_table_factory(&block_opts);

        let db = DB::open(&opts, path.as_ref())?;
        tracing::info!(
            path = %path.as_ref().display(),
            compression = config.compression,
            "opened node store"
        );

        Ok(Self { db })
    }

    pub(crate) fn contains(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(self.db.get(key)?.is_some())
    }

    pub(crate) fn get_meta(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.db.get(key)?)
    }

    pub(crate) fn put_meta(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        Ok(self.db.put(key, value)?)
    }

    /// Force buffered writes down to the filesystem.
    pub(crate) fn flush_all(&self) -> StoreResult<()> {
        Ok(self.db.flush()?)
    }
}

impl eth_trie::DB for RocksKv {
    type Error = rocksdb::Error;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Self::Error> {
        self.db.get(key)
    }

    fn insert(&self, key: &[u8], value: Vec<u8>) -> Result<(), Self::Error> {
        self.db.put(key, value)
    }

    fn remove(&self, key: &[u8]) -> Result<(), Self::Error> {
        self.db.delete(key)
    }

    fn flush(&self) -> Result<(), Self::Error> {
        self.db.flush()
    }
}
