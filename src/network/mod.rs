//! Peer-to-peer gossip
//!
//! Nodes flood transactions, blocks and whole chains to their peers over
//! one-shot TCP connections. Each node runs an ingestion worker ([`Server`])
//! and optionally a [`Miner`], which share nothing but a [`MiningTarget`].
//!
//! [`MiningTarget`]: crate::storage::MiningTarget

pub mod message;
pub mod miner;
pub mod peers;
pub mod seen;
pub mod server;
pub mod transport;

pub use message::{Fingerprint, Message, Payload};
pub use miner::{mine_genesis, Miner};
pub use peers::Peers;
pub use seen::SeenMessages;
pub use server::{launch, Server};
pub use transport::{broadcast, Inbox, TcpInbox, TcpTransport, Transport};
