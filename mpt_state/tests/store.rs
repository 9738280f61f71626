use ethereum_types::{Address, H256, U256};
use mpt_state::{KvConfig, TrieStore, EMPTY_CODE_HASH, EMPTY_TRIE_ROOT};
use tempfile::TempDir;

fn scratch_store() -> (TempDir, TrieStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = TrieStore::open(dir.path(), KvConfig::default()).unwrap();
    (dir, store)
}

fn addr(n: u64) -> Address {
    Address::from_low_u64_be(n)
}

fn slot(n: u64) -> H256 {
    H256::from_low_u64_be(n)
}

fn word(n: u64) -> H256 {
    H256::from_low_u64_be(n)
}

#[test]
fn commit_without_mutations_yields_empty_root() {
    let (_dir, store) = scratch_store();

    let mut view = store.open_at(store.empty_root()).unwrap();
    let root = view.commit(0).unwrap();

    assert_eq!(root, EMPTY_TRIE_ROOT);
}

#[test]
fn account_fields_survive_commit_and_reopen() {
    let (_dir, store) = scratch_store();

    let mut view = store.open_at(store.empty_root()).unwrap();
    view.set_balance(addr(1), U256::from(10_000));
    view.set_nonce(addr(1), 7);
    let root = view.commit(0).unwrap();
    store.materialize(root).unwrap();
    drop(view);

    let view = store.open_at(root).unwrap();
    let record = view.account(addr(1)).unwrap().unwrap();

    assert_eq!(record.balance, U256::from(10_000));
    assert_eq!(record.nonce, 7);
    assert_eq!(record.storage_root, EMPTY_TRIE_ROOT);
    assert_eq!(record.code_hash, EMPTY_CODE_HASH);
    assert!(view.account(addr(2)).unwrap().is_none());
}

#[test]
fn storage_round_trips_across_commits() {
    let (_dir, store) = scratch_store();

    let mut view = store.open_at(store.empty_root()).unwrap();
    view.set_nonce(addr(1), 0);
    view.set_storage(addr(1), slot(5), word(42));
    let root = view.commit(0).unwrap();
    drop(view);

    let view = store.open_at(root).unwrap();
    assert_eq!(view.storage(addr(1), slot(5)).unwrap(), word(42));
    assert_eq!(view.storage(addr(1), slot(6)).unwrap(), H256::zero());
    assert_eq!(view.storage(addr(9), slot(5)).unwrap(), H256::zero());
}

#[test]
fn dirty_overlay_is_visible_before_commit() {
    let (_dir, store) = scratch_store();

    let mut view = store.open_at(store.empty_root()).unwrap();
    view.set_balance(addr(3), U256::from(77));
    view.set_storage(addr(3), slot(0), word(1));

    let record = view.account(addr(3)).unwrap().unwrap();
    assert_eq!(record.balance, U256::from(77));
    assert_eq!(view.storage(addr(3), slot(0)).unwrap(), word(1));
}

#[test]
fn zero_write_restores_prior_root() {
    let (_dir, store) = scratch_store();

    let mut view = store.open_at(store.empty_root()).unwrap();
    view.set_balance(addr(1), U256::from(1));
    let base = view.commit(0).unwrap();

    view.set_storage(addr(1), slot(2), word(9));
    let with_slot = view.commit(1).unwrap();
    assert_ne!(with_slot, base);

    // The sparse representation stores no zero words, so clearing the slot
    // collapses the state back to the slotless version.
    view.set_storage(addr(1), slot(2), H256::zero());
    let cleared = view.commit(2).unwrap();
    assert_eq!(cleared, base);
}

#[test]
fn overwrite_changes_root_rather_than_growing_account_set() {
    let (_dir, store) = scratch_store();

    let mut view = store.open_at(store.empty_root()).unwrap();
    view.set_nonce(addr(1), 1);
    view.set_storage(addr(1), slot(0), word(1));
    let first = view.commit(0).unwrap();
    drop(view);

    let mut view = store.open_at(first).unwrap();
    view.set_storage(addr(1), slot(0), word(2));
    let second = view.commit(1).unwrap();
    drop(view);

    assert_ne!(second, first);
    let view = store.open_at(second).unwrap();
    assert_eq!(view.storage(addr(1), slot(0)).unwrap(), word(2));
    assert_eq!(view.account(addr(1)).unwrap().unwrap().nonce, 1);
}

#[test]
fn identical_mutation_sets_produce_identical_roots() {
    let (_dir_a, store_a) = scratch_store();
    let (_dir_b, store_b) = scratch_store();

    let commit_fixture = |store: &TrieStore| {
        let mut view = store.open_at(store.empty_root()).unwrap();
        for i in 0..20 {
            view.set_balance(addr(i), U256::from(i + 1));
            view.set_nonce(addr(i), i);
            view.set_storage(addr(i), slot(i), word(i * 31 + 1));
        }
        view.commit(0).unwrap()
    };

    assert_eq!(commit_fixture(&store_a), commit_fixture(&store_b));
}

#[test]
fn revision_bookkeeping_round_trips() {
    let (_dir, store) = scratch_store();

    let mut view = store.open_at(store.empty_root()).unwrap();
    view.set_nonce(addr(1), 1);
    let root = view.commit(5).unwrap();

    assert_eq!(store.revision_root(5).unwrap(), Some(root));
    assert_eq!(store.revision_root(6).unwrap(), None);

    assert_eq!(store.head_root().unwrap(), None);
    store.materialize(root).unwrap();
    assert_eq!(store.head_root().unwrap(), Some(root));
}

#[test]
fn open_at_unknown_root_is_rejected() {
    let (_dir, store) = scratch_store();

    let missing = H256::repeat_byte(0xab);
    assert!(store.open_at(missing).is_err());
    assert!(store.open_at(store.empty_root()).is_ok());
}

#[test]
fn chain_extends_linearly_across_reopened_views() {
    let (_dir, store) = scratch_store();

    let mut roots = Vec::new();
    let mut current = store.empty_root();
    for revision in 0..4_u64 {
        let mut view = store.open_at(current).unwrap();
        view.set_nonce(addr(revision), revision);
        view.set_storage(addr(revision), slot(0), word(revision + 1));
        current = view.commit(revision).unwrap();
        store.materialize(current).unwrap();
        roots.push(current);
    }

    // Every commit produced a fresh version, and the final view still sees
    // the accumulated history.
    for pair in roots.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
    let view = store.open_at(current).unwrap();
    for revision in 0..4_u64 {
        assert_eq!(view.account(addr(revision)).unwrap().unwrap().nonce, revision);
        assert_eq!(view.storage(addr(revision), slot(0)).unwrap(), word(revision + 1));
    }
}
