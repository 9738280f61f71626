//! Workload generation for both phases.
//!
//! All keys are content-addressed from textual labels, so the full key
//! universe is a pure function of the configuration: account `i` lives at
//! `keccak("account-<i>")` and its slot `j` at `keccak("account-<i>-slot-<j>")`.
//! Both generators draw from an explicitly injected [`StdRng`], never from
//! process-global state; with a fixed seed the creation sequence is
//! bit-for-bit reproducible.

use ethereum_types::{Address, H256, U256};
use keccak_hash::keccak;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

/// Seed of the creation-phase stream. Fixed so independent runs replay the
/// same account population.
pub const CREATION_SEED: u64 = 42;

/// Slot rewrites emitted per account in the modification phase.
pub const REWRITES_PER_ACCOUNT: usize = 500;

/// Address of account `index`: the first 20 bytes of the keccak digest of
/// its label.
pub fn account_address(index: usize) -> Address {
    let digest = keccak(format!("account-{index}").as_bytes());
    Address::from_slice(&digest.as_bytes()[..20])
}

/// Storage-slot key for `(account_index, slot_index)`. Shared by both
/// phases, so a recurring index in phase 2 overwrites an existing slot.
pub fn slot_key(account_index: usize, slot_index: usize) -> H256 {
    keccak(format!("account-{account_index}-slot-{slot_index}").as_bytes())
}

/// Creation-phase slot word: 20% all-zero (elided by the store's sparse
/// representation), 10% a single low-order byte, otherwise 32 random bytes.
fn slot_value(rng: &mut StdRng) -> H256 {
    let dice = rng.gen_range(0..100);
    if dice < 20 {
        H256::zero()
    } else if dice < 30 {
        let mut word = [0_u8; 32];
        word[31] = 1;
        H256(word)
    } else {
        let mut word = [0_u8; 32];
        rng.fill_bytes(&mut word);
        H256(word)
    }
}

/// A single storage-slot write.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SlotWrite {
    /// Content-addressed slot key.
    pub key: H256,
    /// Word to store; zero means "clear".
    pub value: H256,
}

/// Everything written for one account during creation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountInit {
    /// Creation index of the account.
    pub index: usize,
    /// Derived account address.
    pub address: Address,
    /// Initial balance, fixed for every account.
    pub balance: U256,
    /// Initial nonce, equal to the creation index.
    pub nonce: u64,
    /// Slot writes, in generation order.
    pub slots: Vec<SlotWrite>,
}

/// Phase-1 generator: one [`AccountInit`] per index in `[0, n_accounts)`.
///
/// Slot counts are uniform in `[0, 2 * avg_slots)`; counts and values are
/// drawn in strict order from the single injected stream.
pub struct CreationWorkload {
    rng: StdRng,
    n_accounts: usize,
    avg_slots: usize,
    next: usize,
}

impl CreationWorkload {
    /// Build the generator over an injected random source.
    pub fn new(rng: StdRng, n_accounts: usize, avg_slots: usize) -> Self {
        Self {
            rng,
            n_accounts,
            avg_slots,
            next: 0,
        }
    }
}

impl Iterator for CreationWorkload {
    type Item = AccountInit;

    fn next(&mut self) -> Option<AccountInit> {
        if self.next == self.n_accounts {
            return None;
        }
        let index = self.next;
        self.next += 1;

        let v_slots = if self.avg_slots == 0 {
            0
        } else {
            self.rng.gen_range(0..self.avg_slots * 2)
        };
        let rng = &mut self.rng;
        let slots = (0..v_slots)
            .map(|j| SlotWrite {
                key: slot_key(index, j),
                value: slot_value(rng),
            })
            .collect();

        Some(AccountInit {
            index,
            address: account_address(index),
            balance: U256::exp10(18),
            nonce: index as u64,
            slots,
        })
    }
}

/// Everything rewritten for one account during modification.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountRewrite {
    /// Creation index of the targeted account.
    pub index: usize,
    /// Its (re-derived) address.
    pub address: Address,
    /// Slot writes, in generation order. Duplicate keys are allowed; the
    /// last write per key stands.
    pub slots: Vec<SlotWrite>,
}

/// Phase-2 generator: a random permutation of the existing account indices,
/// truncated to the modification target count, with [`REWRITES_PER_ACCOUNT`]
/// slot writes each.
///
/// Values are always full random words here; the creation-phase zero/small
/// policy does not apply, so every rewrite produces a visible diff.
pub struct ModificationWorkload {
    rng: StdRng,
    targets: Vec<usize>,
    avg_slots: usize,
    next: usize,
}

impl ModificationWorkload {
    /// Build the generator. `m_modify` is clamped to the account count.
    pub fn new(mut rng: StdRng, n_accounts: usize, avg_slots: usize, m_modify: usize) -> Self {
        let mut targets: Vec<usize> = (0..n_accounts).collect();
        targets.shuffle(&mut rng);
        targets.truncate(m_modify.min(n_accounts));
        Self {
            rng,
            targets,
            avg_slots,
            next: 0,
        }
    }

    /// Number of accounts this workload will touch.
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }
}

impl Iterator for ModificationWorkload {
    type Item = AccountRewrite;

    fn next(&mut self) -> Option<AccountRewrite> {
        if self.next == self.targets.len() {
            return None;
        }
        let index = self.targets[self.next];
        self.next += 1;

        let writes = if self.avg_slots == 0 {
            0
        } else {
            REWRITES_PER_ACCOUNT
        };
        let rng = &mut self.rng;
        let avg_slots = self.avg_slots;
        let slots = (0..writes)
            .map(|_| {
                let slot_index = rng.gen_range(0..avg_slots);
                let mut word = [0_u8; 32];
                rng.fill_bytes(&mut word);
                SlotWrite {
                    key: slot_key(index, slot_index),
                    value: H256(word),
                }
            })
            .collect();

        Some(AccountRewrite {
            index,
            address: account_address(index),
            slots,
        })
    }
}
