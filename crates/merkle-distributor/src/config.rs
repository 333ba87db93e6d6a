//! Compilation limits.

/// Default cap on the number of balance records accepted in one run.
pub const DEFAULT_MAX_RECORDS: usize = 1_000_000;

/// Leaf indices are `uint32`-sized, so no tree may hold more leaves than this.
pub const MAX_LEAVES: usize = u32::MAX as usize;

/// Caller-supplied configuration for a compilation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributorConfig {
    /// Upper bound on input records, checked before any hashing.
    pub max_records: usize,
}

impl Default for DistributorConfig {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
        }
    }
}

impl DistributorConfig {
    /// Create a config with a custom record cap.
    #[must_use]
    pub fn with_max_records(max_records: usize) -> Self {
        Self { max_records }
    }

    /// The record cap actually enforced, never above [`MAX_LEAVES`].
    #[must_use]
    pub fn effective_max_records(&self) -> usize {
        self.max_records.min(MAX_LEAVES)
    }
}
