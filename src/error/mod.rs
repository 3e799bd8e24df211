//! Error handling for the ledger
//!
//! Every fallible operation in the crate returns [`Result`]. Consensus checks
//! fail closed: a check that cannot complete is reported as a failure, never
//! as a pass.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, BlockchainError>;

/// Error types for ledger operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockchainError {
    /// Field or group arithmetic failed (non-invertible element, negative scalar, ...)
    Crypto(String),
    /// Point operands belong to different curves
    CurveMismatch,
    /// A signature did not verify
    InvalidSignature(String),
    /// Verification was attempted on a transaction that was never signed
    UnsignedTransaction,
    /// Recomputed block hash does not match or misses the difficulty target
    ProofOfWorkInvalid(String),
    /// Height gap or broken hash link between consecutive blocks
    ChainDiscontinuity(String),
    /// Block policy violations (reward, shape)
    InvalidBlock(String),
    /// Merkle tree construction or proof errors
    Merkle(String),
    /// Transaction admission errors
    Transaction(String),
    /// Mining errors
    Mining(String),
    /// Network communication errors
    Network(String),
    /// Configuration errors
    Config(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// File I/O errors
    Io(String),
    /// Invalid address or key encoding
    InvalidAddress(String),
}

impl fmt::Display for BlockchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockchainError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
            BlockchainError::CurveMismatch => {
                write!(f, "Cryptographic error: points are on different curves")
            }
            BlockchainError::InvalidSignature(msg) => write!(f, "Invalid signature: {msg}"),
            BlockchainError::UnsignedTransaction => write!(f, "Transaction is not signed"),
            BlockchainError::ProofOfWorkInvalid(msg) => write!(f, "Invalid proof-of-work: {msg}"),
            BlockchainError::ChainDiscontinuity(msg) => write!(f, "Chain discontinuity: {msg}"),
            BlockchainError::InvalidBlock(msg) => write!(f, "Invalid block: {msg}"),
            BlockchainError::Merkle(msg) => write!(f, "Merkle error: {msg}"),
            BlockchainError::Transaction(msg) => write!(f, "Transaction error: {msg}"),
            BlockchainError::Mining(msg) => write!(f, "Mining error: {msg}"),
            BlockchainError::Network(msg) => write!(f, "Network error: {msg}"),
            BlockchainError::Config(msg) => write!(f, "Configuration error: {msg}"),
            BlockchainError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            BlockchainError::Io(msg) => write!(f, "I/O error: {msg}"),
            BlockchainError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
        }
    }
}

impl std::error::Error for BlockchainError {}

impl From<std::io::Error> for BlockchainError {
    fn from(err: std::io::Error) -> Self {
        BlockchainError::Io(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for BlockchainError {
    fn from(err: bincode::error::EncodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for BlockchainError {
    fn from(err: bincode::error::DecodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for BlockchainError {
    fn from(err: serde_json::Error) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for BlockchainError {
    fn from(err: toml::de::Error) -> Self {
        BlockchainError::Config(err.to_string())
    }
}
