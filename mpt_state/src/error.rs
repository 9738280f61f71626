use ethereum_types::{Address, H256};
use thiserror::Error;

/// Stores the result of state-store operations. Returns a [`StoreError`]
/// upon failure.
pub type StoreResult<T> = Result<T, StoreError>;

/// An error raised by the state store or its persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying key-value database failed.
    #[error("database error: {0}")]
    Db(#[from] rocksdb::Error),

    /// A trie operation against the node store failed.
    #[error("trie error: {0}")]
    Trie(#[from] eth_trie::TrieError),

    /// An account leaf could not be decoded.
    #[error("failed to decode account record for {address:?}: {source}")]
    AccountDecode {
        /// Address whose record was unreadable.
        address: Address,
        /// The RLP decoding failure.
        source: rlp::DecoderError,
    },

    /// A storage word could not be decoded.
    #[error("failed to decode storage value: {0}")]
    ValueDecode(rlp::DecoderError),

    /// A view was requested at a root the node store does not contain.
    #[error("unknown state root 0x{0:x}")]
    UnknownRoot(H256),

    /// A bookkeeping row held an unexpected payload.
    #[error("corrupt bookkeeping row: {0}")]
    CorruptMeta(&'static str),
}
