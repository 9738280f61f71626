use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::harness::HarnessConfig;

/// Benchmark a trie-backed state store with a synthetic two-phase workload.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Cli {
    /// Number of accounts to create in the first phase.
    #[arg(short = 'n', long = "accounts", default_value_t = 100)]
    pub accounts: usize,

    /// Average number of storage slots per account; per-account counts are
    /// drawn uniformly from [0, 2 * slots).
    #[arg(long, default_value_t = 1000)]
    pub slots: usize,

    /// Number of accounts to rewrite in the second phase (clamped to the
    /// account count).
    #[arg(short = 'm', long = "modify", default_value_t = 10)]
    pub modify: usize,

    /// Number of accounts per commit batch.
    #[arg(short = 'k', long = "batch-size", default_value_t = 50)]
    pub batch_size: usize,

    /// Path of the state database.
    #[arg(long = "db", default_value = "mpt_bench_db")]
    pub db: PathBuf,

    /// Wipe any existing database before starting.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub clear: bool,
}

impl Cli {
    /// Fold the raw flags into validated run parameters.
    pub fn config(&self) -> HarnessConfig {
        HarnessConfig::new(
            self.accounts,
            self.slots,
            self.modify,
            self.batch_size,
            self.db.clone(),
        )
    }
}
