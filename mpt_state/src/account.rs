//! Account leaves and well-known hash constants.

use ethereum_types::{H256, U256};
use hex_literal::hex;
use rlp_derive::{RlpDecodable, RlpEncodable};

/// Root hash of an empty trie: `keccak` of the empty RLP string.
pub const EMPTY_TRIE_ROOT: H256 = H256(hex!(
    "56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421"
));

/// Code hash of an account that carries no code: `keccak` of zero bytes.
pub const EMPTY_CODE_HASH: H256 = H256(hex!(
    "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
));

/// An account leaf as stored in the account trie.
///
/// Field order is the canonical Ethereum account layout, so the RLP encoding
/// of a record is exactly what gets hashed into the root.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, RlpDecodable, RlpEncodable)]
pub struct AccountRecord {
    /// Account nonce.
    pub nonce: u64,
    /// Account balance in wei.
    pub balance: U256,
    /// Root of the account's storage trie.
    pub storage_root: H256,
    /// Hash of the account's code.
    pub code_hash: H256,
}

impl Default for AccountRecord {
    fn default() -> Self {
        Self {
            nonce: 0,
            balance: U256::zero(),
            storage_root: EMPTY_TRIE_ROOT,
            code_hash: EMPTY_CODE_HASH,
        }
    }
}
