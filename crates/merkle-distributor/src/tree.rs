//! Merkle Tree Construction
//!
//! Builds the full layered tree over the sorted balance records, keeping every
//! layer in memory so proofs are a pure index walk.
//!
//! # Encoding
//! Must match the distributor contract bit for bit:
//! 1. `leaf = keccak256(abi.encodePacked(uint256 index, address account, uint256 amount))`
//! 2. `parent = keccak256(min(a, b) ++ max(a, b))`, comparing hashes as bytes
//! 3. An unpaired trailing node moves up a level unchanged
//!
//! Sorted pairs make the combine commutative, so proofs carry no direction bits.

use crate::config::MAX_LEAVES;
use crate::error::DistributorError;
use crate::types::BalanceRecord;
use alloy::primitives::{keccak256, Address, Keccak256, B256, U256};
use tracing::debug;

/// Length of the packed `(uint256, address, uint256)` leaf preimage.
pub const PACKED_LEAF_LEN: usize = 32 + 20 + 32;

/// Packed leaf preimage: `index ++ account ++ amount`, integers big-endian.
#[must_use]
pub fn encode_leaf(index: u32, account: Address, amount: U256) -> [u8; PACKED_LEAF_LEN] {
    let mut packed = [0u8; PACKED_LEAF_LEN];
    packed[..32].copy_from_slice(&U256::from(index).to_be_bytes::<32>());
    packed[32..52].copy_from_slice(account.as_slice());
    packed[52..].copy_from_slice(&amount.to_be_bytes::<32>());
    packed
}

/// Keccak-256 of the packed leaf.
#[must_use]
pub fn leaf_hash(index: u32, account: Address, amount: U256) -> B256 {
    keccak256(encode_leaf(index, account, amount))
}

/// Keccak-256 of two nodes, smaller one first.
#[must_use]
pub fn hash_pair(a: &B256, b: &B256) -> B256 {
    let (left, right) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Keccak256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize()
}

/// Combine one layer into the next. Pairs are `(0,1), (2,3), ...`; an odd
/// trailing node is carried as is.
fn next_layer(layer: &[B256]) -> Vec<B256> {
    layer
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => hash_pair(left, right),
            [carried] => *carried,
            _ => unreachable!("chunks(2) yields one or two nodes"),
        })
        .collect()
}

/// Layered Merkle tree; `layers[0]` are the leaves, the last layer is the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    layers: Vec<Vec<B256>>,
}

impl MerkleTree {
    /// Build the tree over `records`, whose order fixes the leaf indices.
    ///
    /// # Errors
    /// - [`DistributorError::EmptyInput`] if `records` is empty
    /// - [`DistributorError::TooManyRecords`] if indices would not fit in 32 bits
    pub fn from_records(records: &[BalanceRecord]) -> Result<Self, DistributorError> {
        if records.len() > MAX_LEAVES {
            return Err(DistributorError::TooManyRecords {
                count: records.len(),
                max: MAX_LEAVES,
            });
        }
        let leaves = records
            .iter()
            .zip(0u32..)
            .map(|(record, index)| leaf_hash(index, record.account, record.amount))
            .collect();
        Self::from_leaves(leaves)
    }

    /// Build the tree over precomputed leaf hashes.
    ///
    /// # Errors
    /// Returns [`DistributorError::EmptyInput`] if `leaves` is empty.
    pub fn from_leaves(leaves: Vec<B256>) -> Result<Self, DistributorError> {
        if leaves.is_empty() {
            return Err(DistributorError::EmptyInput);
        }

        let mut layers = vec![leaves];
        while let Some(top) = layers.last().filter(|layer| layer.len() > 1) {
            let next = next_layer(top);
            layers.push(next);
        }

        debug!(
            leaves = layers[0].len(),
            depth = layers.len() - 1,
            "Built merkle tree"
        );

        Ok(Self { layers })
    }

    /// The root hash.
    #[must_use]
    pub fn root(&self) -> B256 {
        // from_leaves guarantees a final single-node layer
        self.layers[self.layers.len() - 1][0]
    }

    /// Leaf hashes in index order.
    #[must_use]
    pub fn leaves(&self) -> &[B256] {
        &self.layers[0]
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    /// All layers, leaves first.
    #[must_use]
    pub fn layers(&self) -> &[Vec<B256>] {
        &self.layers
    }

    /// Number of combine levels between leaves and root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::SolValue;

    fn h(byte: u8) -> B256 {
        B256::repeat_byte(byte)
    }

    #[test]
    fn test_encode_leaf_matches_abi_encode_packed() {
        let account = Address::repeat_byte(0x11);
        let amount = U256::from(123_456_789u64);
        let expected = (U256::from(7u32), account, amount).abi_encode_packed();
        assert_eq!(
            encode_leaf(7, account, amount).as_slice(),
            expected.as_slice()
        );
    }

    #[test]
    fn test_encode_leaf_layout() {
        let packed = encode_leaf(1, Address::repeat_byte(0xaa), U256::from(2));
        assert_eq!(packed[31], 1);
        assert_eq!(packed[..31], [0u8; 31]);
        assert_eq!(packed[32..52], [0xaa; 20]);
        assert_eq!(packed[83], 2);
    }

    #[test]
    fn test_hash_pair_commutative() {
        assert_eq!(hash_pair(&h(1), &h(2)), hash_pair(&h(2), &h(1)));
        assert_ne!(hash_pair(&h(1), &h(2)), hash_pair(&h(1), &h(3)));
    }

    #[test]
    fn test_hash_pair_orders_smaller_first() {
        let mut preimage = [0u8; 64];
        preimage[..32].copy_from_slice(h(1).as_slice());
        preimage[32..].copy_from_slice(h(2).as_slice());
        assert_eq!(hash_pair(&h(2), &h(1)), keccak256(preimage));
    }

    #[test]
    fn test_single_leaf_is_root() {
        let tree = MerkleTree::from_leaves(vec![h(42)]).unwrap();
        assert_eq!(tree.root(), h(42));
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(
            MerkleTree::from_leaves(vec![]),
            Err(DistributorError::EmptyInput)
        );
        assert_eq!(
            MerkleTree::from_records(&[]),
            Err(DistributorError::EmptyInput)
        );
    }

    #[test]
    fn test_two_leaves() {
        let tree = MerkleTree::from_leaves(vec![h(1), h(2)]).unwrap();
        assert_eq!(tree.root(), hash_pair(&h(1), &h(2)));
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_odd_node_carried_unchanged() {
        let tree = MerkleTree::from_leaves(vec![h(1), h(2), h(3)]).unwrap();
        let layers = tree.layers();
        assert_eq!(layers.len(), 3);
        assert_eq!(layers[1], vec![hash_pair(&h(1), &h(2)), h(3)]);
        assert_eq!(tree.root(), hash_pair(&hash_pair(&h(1), &h(2)), &h(3)));
    }

    #[test]
    fn test_five_leaves_layer_sizes() {
        let tree = MerkleTree::from_leaves((1..=5).map(h).collect()).unwrap();
        let sizes: Vec<usize> = tree.layers().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![5, 3, 2, 1]);
        // leaf 4 is carried through two levels before its first combine
        assert_eq!(tree.layers()[2][1], h(5));
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let leaves: Vec<B256> = (1..=9).map(h).collect();
        let a = MerkleTree::from_leaves(leaves.clone()).unwrap();
        let b = MerkleTree::from_leaves(leaves).unwrap();
        assert_eq!(a.root(), b.root());
    }

    #[test]
    fn test_from_records_uses_position_as_index() {
        let records = [
            BalanceRecord {
                account: Address::with_last_byte(1),
                amount: U256::from(100),
            },
            BalanceRecord {
                account: Address::with_last_byte(2),
                amount: U256::from(200),
            },
        ];
        let tree = MerkleTree::from_records(&records).unwrap();
        assert_eq!(
            tree.leaves()[0],
            leaf_hash(0, records[0].account, records[0].amount)
        );
        assert_eq!(
            tree.leaves()[1],
            leaf_hash(1, records[1].account, records[1].amount)
        );
        assert_eq!(tree.leaf_count(), 2);
    }
}
