//! End-to-end runs of the orchestrator against a real store, plus
//! fault-injection through a mock store.

use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

use ethereum_types::{Address, H256, U256};
use mpt_bench::harness::{Harness, HarnessConfig, HarnessError};
use mpt_bench::observer::{BatchSample, BenchObserver, BenchSummary, Phase};
use mpt_bench::schedule::MODIFY_REVISION_BASE;
use mpt_bench::store::{StateStore, StateView};
use mpt_bench::workload::account_address;
use mpt_state::{KvConfig, TrieStore};

#[derive(Default)]
struct RecordingObserver {
    batches: Vec<(Phase, u64, H256)>,
    phases: Vec<(Phase, u64)>,
    summary: Option<BenchSummary>,
}

impl BenchObserver for RecordingObserver {
    fn batch_committed(&mut self, phase: Phase, sample: &BatchSample) {
        self.batches.push((phase, sample.batch_index, sample.root));
    }

    fn phase_finished(&mut self, phase: Phase, report: &mpt_bench::metrics::PhaseReport) {
        self.phases.push((phase, report.units));
    }

    fn run_finished(&mut self, summary: &BenchSummary) {
        self.summary = Some(summary.clone());
    }
}

fn config(db_path: &Path, accounts: usize, slots: usize, modify: usize, k: usize) -> HarnessConfig {
    HarnessConfig::new(accounts, slots, modify, k, db_path.to_path_buf())
}

fn run_against_fresh_store(
    accounts: usize,
    slots: usize,
    modify: usize,
    k: usize,
) -> (tempfile::TempDir, TrieStore, RecordingObserver) {
    let dir = tempfile::tempdir().unwrap();
    let store = TrieStore::open(dir.path(), KvConfig::default()).unwrap();
    let mut observer = RecordingObserver::default();
    Harness::new(&store, config(dir.path(), accounts, slots, modify, k), &mut observer)
        .run()
        .unwrap();
    (dir, store, observer)
}

fn creation_roots(observer: &RecordingObserver) -> Vec<H256> {
    observer
        .batches
        .iter()
        .filter(|(phase, _, _)| *phase == Phase::Creation)
        .map(|(_, _, root)| *root)
        .collect()
}

#[test]
fn creation_root_sequence_is_deterministic_across_runs() {
    let (_dir_a, _store_a, observer_a) = run_against_fresh_store(16, 3, 4, 5);
    let (_dir_b, _store_b, observer_b) = run_against_fresh_store(16, 3, 4, 5);

    let roots_a = creation_roots(&observer_a);
    assert_eq!(roots_a.len(), 4);
    assert_eq!(roots_a, creation_roots(&observer_b));
}

#[test]
fn batch_boundaries_match_the_schedule() {
    let (_dir, _store, observer) = run_against_fresh_store(237, 0, 0, 50);

    let creation: Vec<u64> = observer
        .batches
        .iter()
        .filter(|(phase, _, _)| *phase == Phase::Creation)
        .map(|(_, batch, _)| *batch)
        .collect();
    assert_eq!(creation, vec![0, 1, 2, 3, 4]);

    // m = 0: the modification phase schedules no batches at all.
    assert!(observer
        .batches
        .iter()
        .all(|(phase, _, _)| *phase == Phase::Creation));
    assert_eq!(observer.phases, vec![(Phase::Creation, 0), (Phase::Modification, 0)]);
}

#[test]
fn summary_reports_the_head_of_the_chain() {
    let (_dir, store, observer) = run_against_fresh_store(12, 4, 6, 5);

    let summary = observer.summary.as_ref().unwrap();
    let (_, _, last_root) = *observer.batches.last().unwrap();
    assert_eq!(summary.final_root, last_root);
    assert_eq!(store.head_root().unwrap(), Some(last_root));
    assert!(summary.disk_bytes > 0);
}

#[test]
fn modification_rewrites_but_never_creates_accounts() {
    let (_dir, store, observer) = run_against_fresh_store(12, 4, 6, 5);

    let summary = observer.summary.as_ref().unwrap();
    let view = store.open_at(summary.final_root).unwrap();

    // Every phase-1 account survives with its creation-time identity.
    for index in 0..12 {
        let record = view.account(account_address(index)).unwrap().unwrap();
        assert_eq!(record.nonce, index as u64);
        assert_eq!(record.balance, U256::exp10(18));
    }
    // No address beyond the phase-1 population exists.
    assert!(view.account(account_address(12)).unwrap().is_none());
}

#[test]
fn revision_spaces_are_kept_apart_in_the_store() {
    let (_dir, store, _observer) = run_against_fresh_store(12, 4, 6, 5);

    // Creation committed batches 0..3, modification 0..2 in its own space.
    assert!(store.revision_root(0).unwrap().is_some());
    assert!(store.revision_root(2).unwrap().is_some());
    assert!(store.revision_root(MODIFY_REVISION_BASE).unwrap().is_some());
    assert!(store.revision_root(MODIFY_REVISION_BASE + 1).unwrap().is_some());
    // Nothing from either phase leaked into the gap between the spaces.
    assert!(store.revision_root(500).unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Fault injection
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
#[error("injected commit failure")]
struct InjectedFailure;

/// Store whose `fail_on`-th commit (1-based, counted across views) fails.
struct FailingStore {
    fail_on: u64,
    commits: Rc<Cell<u64>>,
}

struct FailingView {
    fail_on: u64,
    commits: Rc<Cell<u64>>,
}

impl StateStore for FailingStore {
    type Error = InjectedFailure;
    type View = FailingView;

    fn empty_root(&self) -> H256 {
        H256::zero()
    }

    fn open_at(&self, _root: H256) -> Result<FailingView, InjectedFailure> {
        Ok(FailingView {
            fail_on: self.fail_on,
            commits: self.commits.clone(),
        })
    }

    fn materialize(&self, _root: H256) -> Result<(), InjectedFailure> {
        Ok(())
    }
}

impl StateView for FailingView {
    type Error = InjectedFailure;

    fn set_balance(&mut self, _address: Address, _balance: U256) {}

    fn set_nonce(&mut self, _address: Address, _nonce: u64) {}

    fn set_storage(&mut self, _address: Address, _slot: H256, _value: H256) {}

    fn commit(&mut self, revision: u64) -> Result<H256, InjectedFailure> {
        let count = self.commits.get() + 1;
        self.commits.set(count);
        if count == self.fail_on {
            return Err(InjectedFailure);
        }
        Ok(H256::from_low_u64_be(revision + 1))
    }
}

#[test]
fn failure_on_the_third_commit_aborts_after_two_batches() {
    let dir = tempfile::tempdir().unwrap();
    let store = FailingStore {
        fail_on: 3,
        commits: Rc::new(Cell::new(0)),
    };
    let mut observer = RecordingObserver::default();

    // 30 accounts in batches of 10: commits at batches 0, 1, 2.
    let result = Harness::new(&store, config(dir.path(), 30, 0, 0, 10), &mut observer).run();

    match result {
        Err(HarnessError::Commit { phase, batch, .. }) => {
            assert_eq!(phase, Phase::Creation);
            assert_eq!(batch, 2);
        }
        other => panic!("expected a commit failure, got {other:?}"),
    }

    // Batches 0 and 1 were reported; the head at abort is batch 1's root.
    let roots = creation_roots(&observer);
    assert_eq!(roots.len(), 2);
    assert_eq!(*roots.last().unwrap(), H256::from_low_u64_be(2));
    // No final report was emitted.
    assert!(observer.summary.is_none());
    assert!(observer.phases.is_empty());
}
