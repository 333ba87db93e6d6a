//! Claim assembly and end-to-end compilation.
//!
//! Ties the pipeline together: raw input → validated records → tree →
//! per-account claims → [`DistributorInfo`].

use crate::balance::BalanceValidator;
use crate::config::DistributorConfig;
use crate::error::DistributorError;
use crate::proof::{verify_proof, ProofGenerator};
use crate::tree::{leaf_hash, MerkleTree};
use crate::types::{BalanceRecord, Claim, DistributorInfo, RawInput};
use alloy::primitives::U256;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Exact sum of `amounts`.
///
/// # Errors
/// Returns [`DistributorError::Overflow`] if the sum exceeds 256 bits.
pub fn checked_total<I>(amounts: I) -> Result<U256, DistributorError>
where
    I: IntoIterator<Item = U256>,
{
    amounts
        .into_iter()
        .try_fold(U256::ZERO, |total, amount| total.checked_add(amount))
        .ok_or(DistributorError::Overflow)
}

/// Builds the output document from validated records and their tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimAssembler;

impl ClaimAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Assemble claims for `records`, which must be the exact sorted sequence
    /// `tree` was built from.
    ///
    /// # Errors
    /// - [`DistributorError::Overflow`] if the token total exceeds 256 bits
    /// - [`DistributorError::MismatchedLeaf`] if `records` and `tree` disagree
    pub fn assemble(
        &self,
        records: &[BalanceRecord],
        tree: &MerkleTree,
    ) -> Result<DistributorInfo, DistributorError> {
        let token_total = checked_total(records.iter().map(|r| r.amount))?;

        let generator = ProofGenerator::new(tree);
        let mut claims = BTreeMap::new();
        for (index, record) in (0u32..).zip(records) {
            let proof = generator.get_proof(index, record.account, record.amount)?;
            claims.insert(
                record.account,
                Claim {
                    index,
                    amount: record.amount,
                    proof,
                },
            );
        }

        debug!(claims = claims.len(), "Assembled claims");

        Ok(DistributorInfo {
            merkle_root: tree.root(),
            token_total,
            claims,
        })
    }
}

/// Run the whole pipeline over `input`.
///
/// Either the full document is produced or nothing is.
///
/// # Errors
/// Any [`DistributorError`] raised by validation, tree building or assembly.
#[instrument(skip(input), fields(entries = input.len()))]
pub fn compile(
    input: RawInput,
    config: &DistributorConfig,
) -> Result<DistributorInfo, DistributorError> {
    let records = BalanceValidator::new(*config).validate(input)?;
    let tree = MerkleTree::from_records(&records)?;
    let info = ClaimAssembler::new().assemble(&records, &tree)?;

    info!(
        claims = info.claims.len(),
        merkle_root = %info.merkle_root,
        token_total = %info.token_total,
        "Compiled distribution"
    );

    Ok(info)
}

impl DistributorInfo {
    /// Check the document is internally consistent.
    ///
    /// Re-derives every leaf from its claim, checks each proof against
    /// `merkle_root`, checks indices are exactly `0..claims.len()`, and
    /// recomputes `token_total`.
    ///
    /// # Errors
    /// The first inconsistency found, in account order.
    pub fn verify(&self) -> Result<(), DistributorError> {
        if self.claims.is_empty() {
            return Err(DistributorError::EmptyInput);
        }

        let mut seen = vec![false; self.claims.len()];
        for (account, claim) in &self.claims {
            let slot =
                seen.get_mut(claim.index as usize)
                    .ok_or(DistributorError::IndexOutOfBounds {
                        index: claim.index,
                        len: self.claims.len(),
                    })?;
            if std::mem::replace(slot, true) {
                return Err(DistributorError::DuplicateIndex(claim.index));
            }
            if claim.amount.is_zero() {
                return Err(DistributorError::invalid_amount(
                    &account.to_checksum(None),
                    "amount must be positive",
                ));
            }

            let leaf = leaf_hash(claim.index, *account, claim.amount);
            if !verify_proof(leaf, &claim.proof, self.merkle_root) {
                return Err(DistributorError::InvalidProof(*account));
            }
        }

        let actual = checked_total(self.claims.values().map(|c| c.amount))?;
        if actual != self.token_total {
            return Err(DistributorError::TotalMismatch {
                expected: self.token_total,
                actual,
            });
        }

        Ok(())
    }
}
