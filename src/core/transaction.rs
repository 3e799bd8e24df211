// A value transfer between two public keys. Balances are not tracked: the
// ledger only authenticates who sent a transfer and orders transfers in blocks.

use crate::crypto::{self, message_digest, x_text, Point, Signature, ABSENT};
use crate::error::{BlockchainError, Result};
use crate::utils::sha256_hex;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    sender: Option<Point>, // None for the block reward
    receiver: Point,
    amount: u64,
    fee: u64,
    signature: Option<Signature>,
    id: String,      // hex digest, re-derived once signed
    message: BigInt, // the unsigned digest as an integer
}

impl Transaction {
    pub fn new(sender: Option<Point>, receiver: Point, amount: u64, fee: u64) -> Transaction {
        let (id, message) = message_digest(sender.as_ref(), &receiver, amount);
        Transaction {
            sender,
            receiver,
            amount,
            fee,
            signature: None,
            id,
            message,
        }
    }

    /// Reward paid to the miner of a block: no sender, no fee.
    pub fn new_reward(receiver: Point, amount: u64) -> Transaction {
        Transaction::new(None, receiver, amount, 0)
    }

    /// Signs with `secret` and chains the signature into the id, so two
    /// signatures over the same transfer get different ids.
    pub fn sign(&mut self, secret: &BigInt) -> Result<()> {
        if self.sender.is_none() {
            return Err(BlockchainError::Transaction(
                "Reward transactions carry no signature".to_string(),
            ));
        }

        let signature = crypto::sign(&self.message, secret)?;
        self.signature = Some(signature);
        self.id = self.derived_id();
        Ok(())
    }

    /// The id this transaction's contents imply, whatever `id` claims.
    pub fn derived_id(&self) -> String {
        let (base_id, _) = message_digest(self.sender.as_ref(), &self.receiver, self.amount);
        match &self.signature {
            Some(sig) => sha256_hex(format!("{base_id}{}{}", sig.r, sig.s).as_bytes()),
            None => base_id,
        }
    }

    /// The stored id and digest must match sender, receiver and amount; a
    /// transfer must also carry a valid signature over that digest.
    pub fn check_signature(&self) -> Result<()> {
        let (_, message) = message_digest(self.sender.as_ref(), &self.receiver, self.amount);
        if message != self.message || self.derived_id() != self.id {
            return Err(BlockchainError::Transaction(format!(
                "transaction {} does not match its contents",
                self.id
            )));
        }

        let sender = match &self.sender {
            None => return Ok(()),
            Some(sender) => sender,
        };
        let signature = self
            .signature
            .as_ref()
            .ok_or(BlockchainError::UnsignedTransaction)?;

        if crypto::verify(&message, signature, sender) {
            Ok(())
        } else {
            Err(BlockchainError::InvalidSignature(format!(
                "transaction {}",
                self.id
            )))
        }
    }

    pub fn verify_signature(&self) -> bool {
        self.check_signature().is_ok()
    }

    pub fn is_reward(&self) -> bool {
        self.sender.is_none()
    }

    /// This transaction's segment of the proof-of-work pre-image.
    pub fn aggregate_data(&self) -> String {
        let (r, s) = match &self.signature {
            Some(sig) => (sig.r.to_string(), sig.s.to_string()),
            None => (ABSENT.to_string(), ABSENT.to_string()),
        };
        format!(
            "{}{}{}{}{}{}",
            x_text(self.sender.as_ref()),
            x_text(Some(&self.receiver)),
            self.amount,
            self.message,
            r,
            s
        )
    }

    pub fn get_id(&self) -> &str {
        self.id.as_str()
    }

    pub fn get_sender(&self) -> Option<&Point> {
        self.sender.as_ref()
    }

    pub fn get_receiver(&self) -> &Point {
        &self.receiver
    }

    pub fn get_amount(&self) -> u64 {
        self.amount
    }

    pub fn get_fee(&self) -> u64 {
        self.fee
    }

    pub fn get_signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn get_message(&self) -> &BigInt {
        &self.message
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Transaction {}

impl Hash for Transaction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
