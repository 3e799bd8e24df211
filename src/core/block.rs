use crate::core::{MerkleTree, ProofOfWork, Transaction};
use crate::crypto::Point;
use crate::error::{BlockchainError, Result};
use crate::utils::sha256_hex;
use log::{debug, info};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    height: u64,
    pre_block_hash: String, // empty for the genesis block
    transactions: Vec<Transaction>,
    proof_of_work: Option<BigInt>, // nonce, set once mined
    hash: Option<String>,
}

impl Block {
    /// An unmined block. `transactions` is taken by value so every block owns a
    /// fresh list.
    pub fn new_block(height: u64, pre_block_hash: String, transactions: Vec<Transaction>) -> Block {
        Block {
            height,
            pre_block_hash,
            transactions,
            proof_of_work: None,
            hash: None,
        }
    }

    pub fn get_height(&self) -> u64 {
        self.height
    }

    pub fn get_pre_block_hash(&self) -> &str {
        self.pre_block_hash.as_str()
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn get_proof_of_work(&self) -> Option<&BigInt> {
        self.proof_of_work.as_ref()
    }

    pub fn get_hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    #[cfg(test)]
    pub(crate) fn pre_block_hash_mut(&mut self) -> &mut String {
        &mut self.pre_block_hash
    }

    pub fn is_mined(&self) -> bool {
        self.hash.is_some()
    }

    /// Order-sensitive concatenation of every transaction's pre-image segment.
    pub fn aggregate_transaction_data(&self) -> String {
        self.transactions
            .iter()
            .map(Transaction::aggregate_data)
            .collect()
    }

    /// Block hash once mined, otherwise a digest of the pending content.
    pub fn identity(&self) -> String {
        match &self.hash {
            Some(hash) => hash.clone(),
            None => sha256_hex(self.aggregate_transaction_data().as_bytes()),
        }
    }

    /// Appends the reward transaction and searches for a valid nonce.
    ///
    /// Returns `Ok(false)` when the budget runs out; the reward transaction is
    /// removed again so the block is left exactly as it was.
    pub fn mine(
        &mut self,
        difficulty: usize,
        block_reward: u64,
        reward_receiver: &Point,
        iteration_budget: u64,
    ) -> Result<bool> {
        if self.is_mined() {
            return Err(BlockchainError::Mining(format!(
                "block at height {} is already mined",
                self.height
            )));
        }

        self.transactions
            .push(Transaction::new_reward(reward_receiver.clone(), block_reward));

        let pow = ProofOfWork::new_proof_of_work(self, difficulty);
        match pow.run(iteration_budget) {
            Some((nonce, hash)) => {
                info!(
                    "Mined block {hash} at height {} with {} transactions",
                    self.height,
                    self.transactions.len()
                );
                self.proof_of_work = Some(nonce);
                self.hash = Some(hash);
                Ok(true)
            }
            None => {
                debug!(
                    "Iteration budget of {iteration_budget} exhausted at height {}",
                    self.height
                );
                self.transactions.pop();
                Ok(false)
            }
        }
    }

    pub fn check_proof_of_work(&self, difficulty: usize) -> Result<()> {
        ProofOfWork::validate(self, difficulty)
    }

    pub fn verify_proof_of_work(&self, difficulty: usize) -> bool {
        self.check_proof_of_work(difficulty).is_ok()
    }

    pub fn check_signatures(&self) -> Result<()> {
        self.transactions
            .iter()
            .try_for_each(Transaction::check_signature)
    }

    pub fn verify_tx_signatures(&self) -> bool {
        self.check_signatures().is_ok()
    }

    /// Exactly one reward transaction, placed last, paying `block_reward`.
    pub fn check_reward(&self, block_reward: u64) -> Result<()> {
        let rewards = self.transactions.iter().filter(|tx| tx.is_reward()).count();
        if rewards != 1 {
            return Err(BlockchainError::InvalidBlock(format!(
                "expected one reward transaction, found {rewards}"
            )));
        }

        match self.transactions.last() {
            Some(tx) if tx.is_reward() && tx.get_amount() == block_reward => Ok(()),
            Some(tx) if tx.is_reward() => Err(BlockchainError::InvalidBlock(format!(
                "reward of {} does not match block reward {block_reward}",
                tx.get_amount()
            ))),
            _ => Err(BlockchainError::InvalidBlock(
                "reward transaction must be the last transaction".to_string(),
            )),
        }
    }

    pub fn contains_transaction(&self, tx: &Transaction) -> bool {
        self.transactions.iter().any(|candidate| candidate == tx)
    }

    /// Merkle commitment over the transaction ids. Not part of the
    /// proof-of-work pre-image.
    pub fn merkle_root(&self) -> Result<String> {
        Ok(MerkleTree::from_transactions(&self.transactions)?
            .root()
            .to_string())
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Block {}

impl Hash for Block {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}
