//! Command-line interface
//!
//! Argument parsing for the `ledger-node` binary and the helpers behind its
//! simulator commands.

pub mod commands;
pub mod traffic;

pub use commands::{Command, Opt, SEED_ORIGIN, TRAFFIC_ORIGIN};
pub use traffic::{random_port, random_transfer};
