//! Batch boundaries and revision numbering.

/// Offset that keeps modification-phase revisions out of the creation-phase
/// numbering space, so the store's revision-keyed bookkeeping never sees the
/// same tag twice.
pub const MODIFY_REVISION_BASE: u64 = 1_000_000;

/// Partition of `total` work units into contiguous batches of `batch_size`,
/// the last batch sized by the remainder.
#[derive(Clone, Copy, Debug)]
pub struct BatchSchedule {
    batch_size: usize,
    total: usize,
}

impl BatchSchedule {
    /// Build a schedule. A zero `batch_size` is clamped to 1.
    pub fn new(batch_size: usize, total: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            total,
        }
    }

    /// Whether a commit boundary falls after processing unit `unit`
    /// (0-based).
    pub fn is_boundary(&self, unit: usize) -> bool {
        (unit + 1) % self.batch_size == 0 || unit + 1 == self.total
    }

    /// Batch the given unit belongs to.
    pub fn batch_index(&self, unit: usize) -> u64 {
        (unit / self.batch_size) as u64
    }

    /// Number of batches (and therefore commits) in the phase.
    pub fn batch_count(&self) -> usize {
        self.total.div_ceil(self.batch_size)
    }

    /// Number of units in batch `batch`.
    pub fn batch_len(&self, batch: usize) -> usize {
        self.batch_size.min(self.total - batch * self.batch_size)
    }

    /// Total units across the phase.
    pub fn total(&self) -> usize {
        self.total
    }
}

/// Phase-scoped revision numbering: the raw batch index for creation, the
/// same index offset by [`MODIFY_REVISION_BASE`] for modification.
#[derive(Clone, Copy, Debug)]
pub struct RevisionSpace {
    base: u64,
}

impl RevisionSpace {
    /// Numbering space of the creation phase.
    pub const fn creation() -> Self {
        Self { base: 0 }
    }

    /// Numbering space of the modification phase.
    pub const fn modification() -> Self {
        Self {
            base: MODIFY_REVISION_BASE,
        }
    }

    /// Revision tag for the given batch.
    pub fn revision(&self, batch_index: u64) -> u64 {
        self.base + batch_index
    }
}
