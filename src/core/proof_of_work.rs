use crate::core::Block;
use crate::crypto::group_order;
use crate::error::{BlockchainError, Result};
use crate::utils::sha256_hex;
use log::debug;
use num_bigint::{BigInt, RandBigInt};

/// Hash search for one block.
///
/// The pre-image is `previous_block_hash ++ aggregate_transaction_data ++ nonce`
/// with the nonce in decimal; a hash is valid when its lowercase hex form
/// starts with `difficulty` zeros.
pub struct ProofOfWork {
    prefix: String,
    difficulty: usize,
}

impl ProofOfWork {
    pub fn new_proof_of_work(block: &Block, difficulty: usize) -> ProofOfWork {
        let prefix = format!(
            "{}{}",
            block.get_pre_block_hash(),
            block.aggregate_transaction_data()
        );
        ProofOfWork { prefix, difficulty }
    }

    fn prepare_data(&self, nonce: &BigInt) -> String {
        format!("{}{}", self.prefix, nonce)
    }

    pub fn hash_with_nonce(&self, nonce: &BigInt) -> String {
        sha256_hex(self.prepare_data(nonce).as_bytes())
    }

    pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
        hash.len() >= difficulty && hash.bytes().take(difficulty).all(|b| b == b'0')
    }

    /// Tries up to `iteration_budget` random nonces in `[1, n-1]`.
    pub fn run(&self, iteration_budget: u64) -> Option<(BigInt, String)> {
        let mut rng = rand::thread_rng();
        let upper = group_order();
        let lower = BigInt::from(1);

        for attempt in 0..iteration_budget {
            let nonce = rng.gen_bigint_range(&lower, upper);
            let hash = self.hash_with_nonce(&nonce);
            if Self::meets_difficulty(&hash, self.difficulty) {
                debug!("Found proof-of-work after {} attempts: {hash}", attempt + 1);
                return Some((nonce, hash));
            }
        }
        None
    }

    /// Recomputes the hash from the block's stored fields.
    pub fn validate(block: &Block, difficulty: usize) -> Result<()> {
        let (nonce, stored_hash) = match (block.get_proof_of_work(), block.get_hash()) {
            (Some(nonce), Some(hash)) => (nonce, hash),
            _ => {
                return Err(BlockchainError::ProofOfWorkInvalid(
                    "block has not been mined".to_string(),
                ))
            }
        };

        let pow = ProofOfWork::new_proof_of_work(block, difficulty);
        let hash = pow.hash_with_nonce(nonce);
        if hash != stored_hash {
            return Err(BlockchainError::ProofOfWorkInvalid(format!(
                "stored hash {stored_hash} does not match recomputed {hash}"
            )));
        }
        if !Self::meets_difficulty(&hash, difficulty) {
            return Err(BlockchainError::ProofOfWorkInvalid(format!(
                "hash {hash} misses difficulty {difficulty}"
            )));
        }
        Ok(())
    }
}
