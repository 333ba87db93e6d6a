//! # Merkle Distributor
//!
//! Off-chain compilation for Merkle airdrops. Turns a balance list into:
//! - a Merkle root to publish on the distributor contract
//! - a per-account claim `(index, amount, proof)` the contract will accept
//!
//! Leaf encoding and pair hashing live in [`tree`] and must stay in lockstep
//! with the contract's `claim` verification.

pub mod balance;
pub mod config;
pub mod distributor;
pub mod error;
pub mod proof;
pub mod tree;
pub mod types;

pub use balance::{parse_account, parse_amount, BalanceValidator};
pub use config::DistributorConfig;
pub use distributor::{checked_total, compile, ClaimAssembler};
pub use error::DistributorError;
pub use proof::{verify_proof, ProofGenerator};
pub use tree::{hash_pair, leaf_hash, MerkleTree};
pub use types::*;
