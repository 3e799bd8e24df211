//! Test utilities for ledger testing

use crate::config::Settings;
use crate::core::{Block, Blockchain, Transaction};
use crate::error::Result;
use crate::network::{Message, Transport};
use crate::wallet::Wallet;
use num_bigint::BigInt;
use std::sync::Mutex;

/// Easy difficulty for fast mining in tests
pub const TEST_DIFFICULTY: usize = 1;

pub const TEST_BLOCK_REWARD: u64 = 50;

const TEST_BLOCK_SIZE: usize = 10;
const TEST_MINER_SECRET: u64 = 42;
const TEST_BUDGET: u64 = 1_000_000;

pub fn test_wallet(secret: u64) -> Wallet {
    Wallet::from_secret(BigInt::from(secret)).expect("test secrets are in range")
}

/// A transfer between the wallets with the given secrets, signed by the sender.
pub fn signed_transfer(sender_secret: u64, receiver_secret: u64, amount: u64, fee: u64) -> Transaction {
    let sender = test_wallet(sender_secret);
    let receiver = test_wallet(receiver_secret);
    let mut tx = Transaction::new(
        Some(sender.public_key().clone()),
        receiver.public_key().clone(),
        amount,
        fee,
    );
    tx.sign(sender.secret()).expect("signing a transfer succeeds");
    tx
}

/// Genesis at height 0 plus `n_blocks - 1` linked blocks, each carrying
/// `txs_per_block` fresh transfers and the reward.
pub fn mine_chain(n_blocks: usize, txs_per_block: usize) -> Blockchain {
    let miner = test_wallet(TEST_MINER_SECRET);
    let mut chain = Blockchain::new(TEST_BLOCK_SIZE);

    for height in 0..n_blocks as u64 {
        let pre_block_hash = chain.tip_hash().unwrap_or_default().to_string();
        let transactions = (0..txs_per_block as u64)
            .map(|i| signed_transfer(height + 1, height + 2, 100 * height + i + 1, i + 1))
            .collect();

        let mut block = Block::new_block(height, pre_block_hash, transactions);
        let solved = block
            .mine(TEST_DIFFICULTY, TEST_BLOCK_REWARD, miner.public_key(), TEST_BUDGET)
            .expect("fresh block can be mined");
        assert!(solved, "difficulty {TEST_DIFFICULTY} solved within budget");
        chain.add_block(block).expect("mined block extends the tip");
    }
    chain
}

/// Node settings matching the helpers above, with synchronous chain replay.
pub fn test_settings(port: u16) -> Settings {
    let mut settings = Settings::default();
    settings.consensus.difficulty = TEST_DIFFICULTY;
    settings.consensus.block_size = TEST_BLOCK_SIZE;
    settings.consensus.block_reward = TEST_BLOCK_REWARD;
    settings.network.port = port;
    settings.network.replay_interval_ms = 0;
    settings
}

/// In-memory transport that records every delivery instead of sending it.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(u16, Message)>>,
}

impl RecordingTransport {
    pub fn new() -> RecordingTransport {
        RecordingTransport::default()
    }

    pub fn sent(&self) -> Vec<(u16, Message)> {
        self.sent.lock().expect("recording lock").clone()
    }

    pub fn ports(&self) -> Vec<u16> {
        self.sent().into_iter().map(|(port, _)| port).collect()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, port: u16, message: &Message) -> Result<()> {
        self.sent
            .lock()
            .expect("recording lock")
            .push((port, message.clone()));
        Ok(())
    }
}
