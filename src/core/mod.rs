//! Core ledger functionality
//!
//! Transactions, blocks, proof-of-work, the Merkle commitment and the
//! blockchain with its validity rules.

pub mod block;
pub mod blockchain;
pub mod merkle;
pub mod proof_of_work;
pub mod transaction;

pub use block::Block;
pub use blockchain::{Blockchain, GENESIS_HEIGHT};
pub use merkle::{hash_pair, merkle_root, MerkleProof, MerkleTree, ProofElement};
pub use proof_of_work::ProofOfWork;
pub use transaction::Transaction;
