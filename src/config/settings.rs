use crate::error::{BlockchainError, Result};
use crate::wallet::Wallet;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const NODE_PORT_KEY: &str = "NODE_PORT";
const MINING_DIFFICULTY_KEY: &str = "MINING_DIFFICULTY";
const PAYOUT_SECRET_KEY: &str = "PAYOUT_SECRET";

/// Hex digest length; a larger difficulty can never be met.
const MAX_DIFFICULTY: usize = 64;

/// Parameters every node on a network must agree on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusParams {
    pub difficulty: usize,
    pub block_size: usize,
    pub block_reward: u64,
    pub iteration_budget: u64,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            difficulty: 5,
            block_size: 10,
            block_reward: 50,
            iteration_budget: 100_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub host: String,
    pub port: u16,
    pub peers: Vec<u16>,
    pub peer_port_min: u16,
    pub peer_port_max: u16,
    pub replay_interval_ms: u64,
    pub seen_capacity: usize,
    pub connect_timeout_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
            peers: Vec::new(),
            peer_port_min: 5000,
            peer_port_max: 5010,
            replay_interval_ms: 2000,
            seen_capacity: 20,
            connect_timeout_ms: 5000,
        }
    }
}

impl NetworkConfig {
    pub fn replay_interval(&self) -> Duration {
        Duration::from_millis(self.replay_interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Secret scalar (decimal or 0x-hex) whose public key receives block
    /// rewards. The node does not mine without one.
    pub payout_secret: Option<String>,
    pub idle_poll_ms: u64,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            payout_secret: None,
            idle_poll_ms: 50,
        }
    }
}

impl MinerConfig {
    /// The wallet receiving block rewards, `None` when the node does not mine.
    pub fn payout_wallet(&self) -> Result<Option<Wallet>> {
        self.payout_secret
            .as_deref()
            .map(Wallet::from_secret_str)
            .transpose()
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub consensus: ConsensusParams,
    pub network: NetworkConfig,
    pub miner: MinerConfig,
    pub storage: StorageConfig,
}

impl Settings {
    /// Defaults, overlaid by `path` when given, then by the environment.
    pub fn load(path: Option<&Path>) -> Result<Settings> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Settings::default(),
        };
        settings.apply_env()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Settings> {
        let text = fs::read_to_string(path).map_err(|e| {
            BlockchainError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Settings> {
        Ok(toml::from_str(text)?)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(NODE_PORT_KEY) {
            self.network.port = port.trim().parse().map_err(|e| {
                BlockchainError::Config(format!("{NODE_PORT_KEY}={port} is not a port: {e}"))
            })?;
        }
        if let Some(difficulty) = lookup(MINING_DIFFICULTY_KEY) {
            self.consensus.difficulty = difficulty.trim().parse().map_err(|e| {
                BlockchainError::Config(format!(
                    "{MINING_DIFFICULTY_KEY}={difficulty} is not a difficulty: {e}"
                ))
            })?;
        }
        if let Some(secret) = lookup(PAYOUT_SECRET_KEY) {
            self.miner.payout_secret = Some(secret);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.consensus.block_size == 0 {
            return Err(BlockchainError::Config(
                "block_size must be at least 1".to_string(),
            ));
        }
        if self.consensus.iteration_budget == 0 {
            return Err(BlockchainError::Config(
                "iteration_budget must be at least 1".to_string(),
            ));
        }
        if self.consensus.difficulty > MAX_DIFFICULTY {
            return Err(BlockchainError::Config(format!(
                "difficulty {} exceeds {MAX_DIFFICULTY}",
                self.consensus.difficulty
            )));
        }
        if self.network.peer_port_min > self.network.peer_port_max {
            return Err(BlockchainError::Config(format!(
                "peer port range {}..={} is empty",
                self.network.peer_port_min, self.network.peer_port_max
            )));
        }
        Ok(())
    }
}
