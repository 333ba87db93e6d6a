//! Inclusion proof generation and verification.
//!
//! A proof is the list of siblings met while walking from a leaf to the root.
//! Levels where the walked node was the carried odd node contribute nothing,
//! so proofs for the same tree may differ in length.

use crate::error::DistributorError;
use crate::tree::{hash_pair, leaf_hash, MerkleTree};
use alloy::primitives::{Address, B256, U256};

/// Extracts inclusion proofs from a built tree.
///
/// The tree is read-only here, so generators over the same tree can be used
/// from any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct ProofGenerator<'a> {
    tree: &'a MerkleTree,
}

impl<'a> ProofGenerator<'a> {
    #[must_use]
    pub fn new(tree: &'a MerkleTree) -> Self {
        Self { tree }
    }

    /// Generate the proof for `(index, account, amount)`, bottom level first.
    ///
    /// # Errors
    /// - [`DistributorError::IndexOutOfBounds`] if the tree has no leaf `index`
    /// - [`DistributorError::MismatchedLeaf`] if the stored leaf at `index` is
    ///   not the hash of `(index, account, amount)`
    pub fn get_proof(
        &self,
        index: u32,
        account: Address,
        amount: U256,
    ) -> Result<Vec<B256>, DistributorError> {
        let leaves = self.tree.leaves();
        let mut pos = index as usize;

        let stored = leaves.get(pos).ok_or(DistributorError::IndexOutOfBounds {
            index,
            len: leaves.len(),
        })?;
        if leaf_hash(index, account, amount) != *stored {
            return Err(DistributorError::MismatchedLeaf { index });
        }

        let layers = self.tree.layers();
        let mut proof = Vec::with_capacity(self.tree.depth());
        for layer in &layers[..layers.len() - 1] {
            // a carried odd node has no sibling at this level
            if let Some(sibling) = layer.get(pos ^ 1) {
                proof.push(*sibling);
            }
            pos /= 2;
        }

        Ok(proof)
    }
}

/// Fold `proof` into `leaf` with the sorted-pair rule and compare to `root`.
///
/// This is the check the distributor contract runs in `claim`.
#[must_use]
pub fn verify_proof(leaf: B256, proof: &[B256], root: B256) -> bool {
    proof
        .iter()
        .fold(leaf, |node, sibling| hash_pair(&node, sibling))
        == root
}
