//! # Ledger Node - a minimal proof-of-work ledger
//!
//! Independent peers sign value transfers, race to bundle them into
//! hash-linked blocks under a difficulty target, and converge on one history
//! through the longest-chain rule.
//!
//! ## What is here
//! - **secp256k1 from scratch**: field math, point arithmetic and ECDSA on
//!   arbitrary-precision integers
//! - **Ledger core**: transactions, blocks, budgeted proof-of-work, Merkle
//!   commitments and chain validation
//! - **Gossip node**: flood relay with duplicate suppression, a mempool, and a
//!   mining worker fed through a single-slot target
//! - **Wallet**: key generation, WIF import/export and base58check addresses
//!
//! ## Layout
//! - `crypto/`: curve, points, signatures
//! - `core/`: transactions, blocks, proof-of-work, Merkle, blockchain
//! - `network/`: wire messages, transport, ingestion server, miner
//! - `storage/`: mempool, mining target, chain snapshot
//! - `wallet/`: keys and addresses
//! - `config/`: layered settings
//! - `utils/`: hashing and binary serialization helpers
//! - `cli/`: command-line definitions and the traffic simulator
//!
//! Start with `network/server.rs` for how a node reacts to messages, then
//! `core/block.rs` for what makes a block valid.

pub mod cli;
pub mod config;
pub mod core;
pub mod crypto;
pub mod error;
pub mod network;
pub mod storage;
pub mod utils;
pub mod wallet;

#[cfg(test)]
pub mod testnet;

pub use cli::{Command, Opt};
pub use config::{ConsensusParams, Settings};
pub use core::{Block, Blockchain, MerkleProof, MerkleTree, ProofOfWork, Transaction};
pub use crypto::{generator, group_order, secp256k1, Curve, Point, Signature};
pub use error::{BlockchainError, Result};
pub use network::{
    broadcast, launch, mine_genesis, Message, Miner, Payload, Server, TcpInbox, TcpTransport,
    Transport,
};
pub use storage::{ChainSnapshot, MemoryPool, MiningTarget};
pub use utils::{base58_decode, base58_encode, ripemd160_digest, sha256_digest, sha256_hex};
pub use wallet::{convert_address, hash_pub_key, validate_address, Wallet, ADDRESS_CHECK_SUM_LEN};
