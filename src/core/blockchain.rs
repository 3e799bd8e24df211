// The canonical history a node believes in: hash-linked blocks with heights
// increasing by one. Consensus only ever replaces a chain wholesale or extends
// its tip, so the structure is a plain vector.

use crate::core::{Block, Transaction};
use crate::error::{BlockchainError, Result};
use log::info;
use serde::{Deserialize, Serialize};

pub const GENESIS_HEIGHT: u64 = 0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blockchain {
    blocks: Vec<Block>,
    block_size: usize, // max transactions per assembled block, reward excluded
}

impl Blockchain {
    pub fn new(block_size: usize) -> Blockchain {
        Blockchain {
            blocks: Vec::new(),
            block_size,
        }
    }

    /// Wraps existing blocks without checking them; call [`Blockchain::check`].
    pub fn from_blocks(blocks: Vec<Block>, block_size: usize) -> Blockchain {
        Blockchain { blocks, block_size }
    }

    pub fn get_blocks(&self) -> &[Block] {
        self.blocks.as_slice()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn tip_hash(&self) -> Option<&str> {
        self.tip().and_then(Block::get_hash)
    }

    pub fn best_height(&self) -> Option<u64> {
        self.tip().map(Block::get_height)
    }

    /// Whole-chain validation. The first failure invalidates the chain.
    pub fn check(&self, difficulty: usize) -> Result<()> {
        let mut previous: Option<&Block> = None;
        for block in &self.blocks {
            match previous {
                Some(prev) => Self::check_link(prev, block)?,
                None => Self::check_genesis(block)?,
            }
            block.check_proof_of_work(difficulty)?;
            block.check_signatures()?;
            previous = Some(block);
        }
        Ok(())
    }

    pub fn verify(&self, difficulty: usize) -> bool {
        self.check(difficulty).is_ok()
    }

    fn check_genesis(block: &Block) -> Result<()> {
        if block.get_height() != GENESIS_HEIGHT || !block.get_pre_block_hash().is_empty() {
            return Err(BlockchainError::ChainDiscontinuity(format!(
                "chain starts at height {} instead of genesis",
                block.get_height()
            )));
        }
        Ok(())
    }

    fn check_link(prev: &Block, block: &Block) -> Result<()> {
        if block.get_height() != prev.get_height() + 1 {
            return Err(BlockchainError::ChainDiscontinuity(format!(
                "height {} follows height {}",
                block.get_height(),
                prev.get_height()
            )));
        }
        if Some(block.get_pre_block_hash()) != prev.get_hash() {
            return Err(BlockchainError::ChainDiscontinuity(format!(
                "block at height {} does not link to {}",
                block.get_height(),
                prev.get_hash().unwrap_or("an unmined block")
            )));
        }
        Ok(())
    }

    /// Appends `block` if it extends the tip. Only a genesis block starts an
    /// empty chain.
    ///
    /// Proof-of-work and signatures are the caller's responsibility.
    pub fn add_block(&mut self, block: Block) -> Result<()> {
        match self.tip() {
            Some(tip) => Self::check_link(tip, &block)?,
            None => Self::check_genesis(&block)?,
        }
        info!(
            "Added block {} at height {}",
            block.identity(),
            block.get_height()
        );
        self.blocks.push(block);
        Ok(())
    }

    /// Linear scan over every block.
    pub fn contains_transaction(&self, tx: &Transaction) -> bool {
        self.blocks.iter().any(|block| block.contains_transaction(tx))
    }

    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.blocks.iter().flat_map(Block::get_transactions)
    }
}

impl PartialEq for Blockchain {
    fn eq(&self, other: &Self) -> bool {
        match (self.tip(), other.tip()) {
            (None, None) => true,
            (Some(a), Some(b)) => a.get_hash() == b.get_hash(),
            _ => false,
        }
    }
}
