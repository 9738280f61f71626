//! The phase orchestrator.
//!
//! Drives `Init -> Creating -> CreationDone -> Modifying -> ModificationDone
//! -> Reporting` as a pair of batched phase loops. Each batch acquires a
//! view at the current head root, applies its accounts' mutations in
//! generation order, commits with the phase-scoped revision, materializes
//! the new root, samples cost, and releases the view before the next batch
//! re-acquires one — the release/re-acquire step is what bounds the
//! in-memory dirty set.

use std::path::PathBuf;

use ethereum_types::H256;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::metrics::{dir_size_bytes, MemorySampler, PhaseTimer};
use crate::observer::{BatchSample, BenchObserver, BenchSummary, Phase};
use crate::schedule::{BatchSchedule, RevisionSpace};
use crate::store::{StateStore, StateView};
use crate::workload::{AccountInit, AccountRewrite, CreationWorkload, ModificationWorkload, CREATION_SEED};

/// A fatal orchestration failure. Carries enough context to print one
/// self-contained diagnostic line; the run aborts at the point of failure
/// with the durable state left at the prior root.
#[derive(Debug, Error)]
pub enum HarnessError<E: std::error::Error + 'static> {
    /// Acquiring a view at the current head failed.
    #[error("failed to open state view at root 0x{root:x} (batch {batch} of the {phase} phase): {source}")]
    OpenView {
        /// Phase being driven.
        phase: Phase,
        /// 0-based batch index within the phase.
        batch: u64,
        /// Root the view was requested at.
        root: H256,
        /// Store-side cause.
        source: E,
    },

    /// A batch commit failed.
    #[error("commit failed at batch {batch} of the {phase} phase: {source}")]
    Commit {
        /// Phase being driven.
        phase: Phase,
        /// 0-based batch index within the phase.
        batch: u64,
        /// Store-side cause.
        source: E,
    },

    /// Materializing a committed root failed.
    #[error("failed to materialize root 0x{root:x} at batch {batch} of the {phase} phase: {source}")]
    Materialize {
        /// Phase being driven.
        phase: Phase,
        /// 0-based batch index within the phase.
        batch: u64,
        /// The root that could not be materialized.
        root: H256,
        /// Store-side cause.
        source: E,
    },
}

/// Validated run parameters.
#[derive(Clone, Debug)]
pub struct HarnessConfig {
    /// Accounts to create in phase 1.
    pub accounts: usize,
    /// Average storage slots per account.
    pub avg_slots: usize,
    /// Accounts to rewrite in phase 2.
    pub modify: usize,
    /// Accounts per commit batch.
    pub batch_size: usize,
    /// Store path, sampled for on-disk footprint.
    pub db_path: PathBuf,
}

impl HarnessConfig {
    /// Build a config, clamping `modify` to the account count and
    /// `batch_size` to at least 1.
    pub fn new(
        accounts: usize,
        avg_slots: usize,
        modify: usize,
        batch_size: usize,
        db_path: PathBuf,
    ) -> Self {
        Self {
            accounts,
            avg_slots,
            modify: modify.min(accounts),
            batch_size: batch_size.max(1),
            db_path,
        }
    }
}

/// Orchestrator over a state store and an observer.
///
/// Owns the head of the root chain for the whole run; the store handle and
/// the single live view are never shared.
pub struct Harness<'a, S: StateStore, O: BenchObserver> {
    store: &'a S,
    config: HarnessConfig,
    observer: &'a mut O,
    sampler: MemorySampler,
    current_root: H256,
}

impl<'a, S: StateStore, O: BenchObserver> Harness<'a, S, O> {
    /// Set up a run against `store`, reporting through `observer`.
    pub fn new(store: &'a S, config: HarnessConfig, observer: &'a mut O) -> Self {
        let current_root = store.empty_root();
        Self {
            store,
            config,
            observer,
            sampler: MemorySampler::new(),
            current_root,
        }
    }

    /// Drive both phases to completion and emit the final report.
    ///
    /// Any store failure aborts immediately; the error identifies the phase
    /// and batch, and the durable state stays at the last materialized root.
    pub fn run(mut self) -> Result<BenchSummary, HarnessError<S::Error>> {
        self.run_creation()?;
        self.run_modification()?;

        let summary = BenchSummary {
            db_path: self.config.db_path.clone(),
            final_root: self.current_root,
            disk_bytes: dir_size_bytes(&self.config.db_path),
        };
        self.observer.run_finished(&summary);
        Ok(summary)
    }

    fn run_creation(&mut self) -> Result<(), HarnessError<S::Error>> {
        let workload = CreationWorkload::new(
            StdRng::seed_from_u64(CREATION_SEED),
            self.config.accounts,
            self.config.avg_slots,
        );
        let schedule = BatchSchedule::new(self.config.batch_size, self.config.accounts);

        self.run_phase(
            Phase::Creation,
            RevisionSpace::creation(),
            schedule,
            workload,
            |view, init: AccountInit| {
                view.set_balance(init.address, init.balance);
                view.set_nonce(init.address, init.nonce);
                for write in &init.slots {
                    view.set_storage(init.address, write.key, write.value);
                }
                init.slots.len()
            },
        )
    }

    fn run_modification(&mut self) -> Result<(), HarnessError<S::Error>> {
        // Fresh entropy on purpose: only the creation phase is meant to be
        // reproducible across runs.
        let workload = ModificationWorkload::new(
            StdRng::from_entropy(),
            self.config.accounts,
            self.config.avg_slots,
            self.config.modify,
        );
        let schedule = BatchSchedule::new(self.config.batch_size, workload.target_count());

        self.run_phase(
            Phase::Modification,
            RevisionSpace::modification(),
            schedule,
            workload,
            |view, rewrite: AccountRewrite| {
                for write in &rewrite.slots {
                    view.set_storage(rewrite.address, write.key, write.value);
                }
                rewrite.slots.len()
            },
        )
    }

    fn run_phase<I, F>(
        &mut self,
        phase: Phase,
        revisions: RevisionSpace,
        schedule: BatchSchedule,
        mut workload: I,
        mut apply: F,
    ) -> Result<(), HarnessError<S::Error>>
    where
        I: Iterator,
        F: FnMut(&mut S::View, I::Item) -> usize,
    {
        self.observer.phase_started(phase, schedule.total());
        let timer = PhaseTimer::start();
        let mut units_done = 0;
        let mut slots_written = 0_u64;

        for batch in 0..schedule.batch_count() {
            let batch_index = batch as u64;
            let mut view =
                self.store
                    .open_at(self.current_root)
                    .map_err(|source| HarnessError::OpenView {
                        phase,
                        batch: batch_index,
                        root: self.current_root,
                        source,
                    })?;

            for item in workload.by_ref().take(schedule.batch_len(batch)) {
                slots_written += apply(&mut view, item) as u64;
                units_done += 1;
                self.observer.unit_processed(phase, units_done, schedule.total());
            }

            let revision = revisions.revision(batch_index);
            let root = view
                .commit(revision)
                .map_err(|source| HarnessError::Commit {
                    phase,
                    batch: batch_index,
                    source,
                })?;
            self.store
                .materialize(root)
                .map_err(|source| HarnessError::Materialize {
                    phase,
                    batch: batch_index,
                    root,
                    source,
                })?;
            // Release the batch's dirty working set; the next batch
            // re-acquires a fresh view at the new root.
            drop(view);
            self.current_root = root;

            let sample = BatchSample {
                batch_index,
                root,
                disk_bytes: dir_size_bytes(&self.config.db_path),
                resident_bytes: self.sampler.resident_bytes(),
            };
            self.observer.batch_committed(phase, &sample);
        }

        let report = timer.finish(slots_written);
        self.observer.phase_finished(phase, &report);
        Ok(())
    }
}
