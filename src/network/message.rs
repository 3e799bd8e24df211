use crate::core::{Block, Blockchain, Transaction};
use crate::error::Result;
use crate::utils::sha256_hex;
use serde::{Deserialize, Serialize};

/// Everything a node can be sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Payload {
    Transaction(Transaction),
    Block(Block),
    Blockchain(Blockchain),
}

/// Identity used for duplicate suppression: a digest of the payload's wire
/// encoding. Copies that differ in any field, stored ids and hashes included,
/// never share a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    Transaction(String),
    Block(String),
    Blockchain(String),
}

fn content_digest<T: Serialize>(value: &T) -> Result<String> {
    Ok(sha256_hex(&serde_json::to_vec(value)?))
}

impl Payload {
    pub fn fingerprint(&self) -> Result<Fingerprint> {
        Ok(match self {
            Payload::Transaction(tx) => Fingerprint::Transaction(content_digest(tx)?),
            Payload::Block(block) => Fingerprint::Block(content_digest(block)?),
            Payload::Blockchain(chain) => Fingerprint::Blockchain(content_digest(chain)?),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Transaction(_) => "transaction",
            Payload::Block(_) => "block",
            Payload::Blockchain(_) => "blockchain",
        }
    }
}

/// A payload tagged with the port of the node that sent it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    payload: Payload,
    origin: u16,
}

impl Message {
    pub fn new(payload: Payload, origin: u16) -> Message {
        Message { payload, origin }
    }

    pub fn get_payload(&self) -> &Payload {
        &self.payload
    }

    pub fn get_origin(&self) -> u16 {
        self.origin
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }

    /// The same payload, re-tagged as sent by `origin`.
    pub fn relayed_by(&self, origin: u16) -> Message {
        Message {
            payload: self.payload.clone(),
            origin,
        }
    }
}
