use anyhow::Context;
use clap::Parser;
use mpt_bench::cli::Cli;
use mpt_bench::harness::Harness;
use mpt_bench::observer::ConsoleObserver;
use mpt_state::{KvConfig, TrieStore};

fn main() -> anyhow::Result<()> {
    mpt_bench::tracing::init();
    let args = Cli::parse();

    if args.clear && args.db.exists() {
        println!("Clearing existing state database at {}...", args.db.display());
        std::fs::remove_dir_all(&args.db)
            .with_context(|| format!("failed to clear state database at {}", args.db.display()))?;
    }

    println!(
        "Opening state store at {} (compression: off)...",
        args.db.display()
    );
    let store = TrieStore::open(&args.db, KvConfig::default())
        .with_context(|| format!("failed to open state store at {}", args.db.display()))?;

    let config = args.config();
    println!(
        "Running workload: {} accounts, avg {} slots, {} rewrites, batches of {}",
        config.accounts, config.avg_slots, config.modify, config.batch_size
    );

    let mut observer = ConsoleObserver;
    let summary = Harness::new(&store, config, &mut observer).run()?;
    tracing::debug!(root = %summary.final_root, "benchmark complete");

    Ok(())
}
