//! Cost sampling at batch boundaries.
//!
//! Everything here is advisory: a failed measurement collapses to zero and
//! must never influence the workload or the root chain.

use std::path::Path;
use std::time::{Duration, Instant};

use sysinfo::{Pid, System};

/// Resident-set sampler for the current process.
pub struct MemorySampler {
    system: System,
    pid: Pid,
}

impl MemorySampler {
    /// Build a sampler bound to this process.
    pub fn new() -> Self {
        Self {
            system: System::new(),
            pid: Pid::from(std::process::id() as usize),
        }
    }

    /// Resident set size in bytes; 0 when the platform offers no reading.
    pub fn resident_bytes(&mut self) -> u64 {
        self.system.refresh_process(self.pid);
        self.system
            .process(self.pid)
            .map(|process| process.memory())
            .unwrap_or(0)
    }
}

impl Default for MemorySampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Total byte size of all files under `path`, recursively, directories
/// excluded. Any walk error yields 0.
pub fn dir_size_bytes(path: &Path) -> u64 {
    walk(path).unwrap_or(0)
}

fn walk(path: &Path) -> std::io::Result<u64> {
    let mut total = 0;
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if metadata.is_dir() {
            total += walk(&entry.path())?;
        } else {
            total += metadata.len();
        }
    }
    Ok(total)
}

/// Wall-clock timer for one phase.
pub struct PhaseTimer {
    started: Instant,
}

impl PhaseTimer {
    /// Start timing now.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Stop and fold the processed unit count into a report.
    pub fn finish(self, units: u64) -> PhaseReport {
        PhaseReport::new(units, self.started.elapsed())
    }
}

/// Throughput summary of a completed phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseReport {
    /// Wall-clock duration of the phase.
    pub elapsed: Duration,
    /// Units (storage slots) processed.
    pub units: u64,
    /// Units per second; 0 for a zero-length phase.
    pub throughput: f64,
}

impl PhaseReport {
    /// Derive the throughput for `units` over `elapsed`.
    pub fn new(units: u64, elapsed: Duration) -> Self {
        let seconds = elapsed.as_secs_f64();
        let throughput = if seconds > 0.0 {
            units as f64 / seconds
        } else {
            0.0
        };
        Self {
            elapsed,
            units,
            throughput,
        }
    }
}
