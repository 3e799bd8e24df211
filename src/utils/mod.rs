//! Utility functions and helpers
//!
//! Hash primitives, base58 text encoding and the bincode layer used for
//! chain snapshots.

pub mod hashing;
pub mod serialization;

pub use hashing::{
    base58_decode, base58_encode, double_sha256, hash160, ripemd160_digest, sha256_digest,
    sha256_hex,
};

pub use serialization::{deserialize, serialize};
