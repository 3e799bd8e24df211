use crate::config::Settings;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Origin port stamped on messages from `seed`; outside any admission range.
pub const SEED_ORIGIN: u16 = 42;
/// Origin port stamped on messages from `traffic`.
pub const TRAFFIC_ORIGIN: u16 = 43;

#[derive(Debug, Parser)]
#[command(name = "ledger-node", about = "Proof-of-work ledger node")]
pub struct Opt {
    #[arg(long, global = true, help = "TOML settings file")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "node", about = "Run a node, mining if a payout secret is set")]
    Node {
        #[arg(long, help = "Port to listen on")]
        port: Option<u16>,
        #[arg(long = "peer", help = "Peer port to relay to (repeatable)")]
        peers: Vec<u16>,
        #[arg(long, help = "Secret scalar receiving block rewards")]
        payout_secret: Option<String>,
    },
    #[command(name = "seed", about = "Mine a genesis block and broadcast it")]
    Seed {
        #[arg(long = "to", required = true, num_args = 1.., help = "Ports to send the genesis block to")]
        to: Vec<u16>,
        #[arg(long, default_value = "42", help = "Secret scalar receiving the genesis reward")]
        payout_secret: String,
    },
    #[command(name = "traffic", about = "Send random signed transactions to nodes")]
    Traffic {
        #[arg(long, default_value_t = 5001)]
        min_port: u16,
        #[arg(long, default_value_t = 5005)]
        max_port: u16,
        #[arg(long, help = "Stop after this many transactions")]
        count: Option<u64>,
    },
    #[command(name = "keygen", about = "Print keys and addresses for a new or imported secret")]
    Keygen {
        #[arg(long, help = "Import this WIF-encoded secret instead of generating one")]
        wif: Option<String>,
    },
}

impl Command {
    /// Command-line flags take precedence over file and environment settings.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Command::Node {
            port,
            peers,
            payout_secret,
        } = self
        {
            if let Some(port) = port {
                settings.network.port = *port;
            }
            if !peers.is_empty() {
                settings.network.peers = peers.clone();
            }
            if let Some(secret) = payout_secret {
                settings.miner.payout_secret = Some(secret.clone());
            }
        }
    }
}
