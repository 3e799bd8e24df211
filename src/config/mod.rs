//! Node configuration
//!
//! Settings come from built-in defaults, an optional TOML file, environment
//! overrides and finally command-line flags, in that order.

pub mod settings;

pub use settings::{ConsensusParams, MinerConfig, NetworkConfig, Settings, StorageConfig};
