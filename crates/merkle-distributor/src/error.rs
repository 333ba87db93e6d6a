//! Error taxonomy for distribution compilation.
//!
//! Every failure is a deterministic consequence of malformed input. Compilation
//! is all-or-nothing, so the first error aborts the whole run.

use alloy::primitives::{Address, U256};
use thiserror::Error;

/// Errors that can occur while validating balances, building the tree or
/// checking a distribution document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DistributorError {
    #[error("Found invalid address: {0}")]
    InvalidAddress(String),

    #[error("Duplicate address: {0}")]
    DuplicateAddress(Address),

    #[error("Invalid amount for account {account}: {reason}")]
    InvalidAmount { account: String, reason: String },

    #[error("Balance input contains no records")]
    EmptyInput,

    #[error("Token total exceeds 256 bits")]
    Overflow,

    #[error("Leaf at index {index} does not match the given account and amount")]
    MismatchedLeaf { index: u32 },

    #[error("Leaf index {index} out of bounds (tree has {len} leaves)")]
    IndexOutOfBounds { index: u32, len: usize },

    #[error("Too many balance records: {count} exceeds limit of {max}")]
    TooManyRecords { count: usize, max: usize },

    #[error("Index {0} is assigned to more than one claim")]
    DuplicateIndex(u32),

    #[error("Proof for {0} does not reproduce the merkle root")]
    InvalidProof(Address),

    #[error("Token total mismatch: document says {expected}, claims sum to {actual}")]
    TotalMismatch { expected: U256, actual: U256 },
}

impl DistributorError {
    pub(crate) fn invalid_amount(account: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAmount {
            account: account.to_string(),
            reason: reason.into(),
        }
    }
}
