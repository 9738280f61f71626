//! Progress observation, decoupled from the orchestrator's control flow.
//!
//! The harness invokes an observer at fixed points (per unit, per batch,
//! per phase, end of run) and never depends on what the observer does with
//! the information, so console output can be swapped for structured metrics
//! without touching the state machine.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use ethereum_types::H256;

use crate::metrics::PhaseReport;

/// The two workload phases.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Bulk account creation from the fixed-seed stream.
    Creation,
    /// Randomized slot rewriting over the existing account set.
    Modification,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Creation => write!(f, "creation"),
            Phase::Modification => write!(f, "modification"),
        }
    }
}

/// Cost snapshot taken at a batch boundary.
#[derive(Clone, Copy, Debug)]
pub struct BatchSample {
    /// 0-based batch index within the phase.
    pub batch_index: u64,
    /// Root produced by the batch's commit.
    pub root: H256,
    /// On-disk footprint of the store, in bytes (best effort).
    pub disk_bytes: u64,
    /// Resident set size of the process, in bytes (best effort).
    pub resident_bytes: u64,
}

/// Final figures of a completed run.
#[derive(Clone, Debug)]
pub struct BenchSummary {
    /// Where the store lives on disk.
    pub db_path: PathBuf,
    /// Head of the root chain after the last commit.
    pub final_root: H256,
    /// Total on-disk footprint in bytes (best effort).
    pub disk_bytes: u64,
}

/// Hooks the orchestrator fires at its defined observation points.
pub trait BenchObserver {
    /// A phase is about to process `total` accounts.
    fn phase_started(&mut self, phase: Phase, total: usize) {
        let _ = (phase, total);
    }

    /// `done` of `total` accounts of the phase are fully applied.
    fn unit_processed(&mut self, phase: Phase, done: usize, total: usize) {
        let _ = (phase, done, total);
    }

    /// A batch committed and materialized; `sample` holds the cost snapshot.
    fn batch_committed(&mut self, phase: Phase, sample: &BatchSample) {
        let _ = (phase, sample);
    }

    /// A phase ran to completion.
    fn phase_finished(&mut self, phase: Phase, report: &PhaseReport) {
        let _ = (phase, report);
    }

    /// The whole run finished successfully.
    fn run_finished(&mut self, summary: &BenchSummary) {
        let _ = summary;
    }
}

/// Human-readable progress on standard output.
#[derive(Debug, Default)]
pub struct ConsoleObserver;

/// Progress lines are emitted every this many accounts (and at phase end).
const PROGRESS_EVERY: usize = 10;

fn mib(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

impl BenchObserver for ConsoleObserver {
    fn phase_started(&mut self, phase: Phase, total: usize) {
        match phase {
            Phase::Creation => println!("Phase 1: creating {total} accounts..."),
            Phase::Modification => {
                println!("Phase 2: rewriting random slots in {total} accounts...")
            }
        }
    }

    fn unit_processed(&mut self, phase: Phase, done: usize, total: usize) {
        if done % PROGRESS_EVERY != 0 && done != total {
            return;
        }
        let percent = if total == 0 {
            100.0
        } else {
            done as f64 / total as f64 * 100.0
        };
        let verb = match phase {
            Phase::Creation => "processed",
            Phase::Modification => "modified",
        };
        print!("...{verb} {done}/{total} accounts ({percent:.1}%)\r");
        let _ = std::io::stdout().flush();
    }

    fn batch_committed(&mut self, phase: Phase, sample: &BatchSample) {
        let label = match phase {
            Phase::Creation => "batch",
            Phase::Modification => "mod batch",
        };
        let root = format!("{:x}", sample.root);
        println!(
            "\n[{label} {}] root: {}.. | disk: {:.2} MB | resident: {:.2} MB",
            sample.batch_index + 1,
            &root[..8],
            mib(sample.disk_bytes),
            mib(sample.resident_bytes),
        );
    }

    fn phase_finished(&mut self, phase: Phase, report: &PhaseReport) {
        println!(
            "{} finished in {:.2?}: {} slots ({:.0} slots/s)",
            phase, report.elapsed, report.units, report.throughput,
        );
    }

    fn run_finished(&mut self, summary: &BenchSummary) {
        println!();
        println!("--- final report ---");
        println!("store path: {}", summary.db_path.display());
        println!("final root: 0x{:x}", summary.final_root);
        println!("disk usage: {:.2} MB", mib(summary.disk_bytes));
    }
}
