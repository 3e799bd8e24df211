use crate::config::ConsensusParams;
use crate::core::{Block, GENESIS_HEIGHT};
use crate::crypto::Point;
use crate::error::Result;
use crate::network::{Message, Payload, Transport};
use crate::storage::MiningTarget;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Mining worker. Mines private copies of the published target in bounded
/// slices and hands solved blocks back to its own node through the transport.
pub struct Miner {
    target: Arc<MiningTarget>,
    transport: Arc<dyn Transport>,
    home_port: u16,
    payout: Point,
    params: ConsensusParams,
    idle_poll: Duration,
    current: Option<Block>,
}

impl Miner {
    pub fn new(
        target: Arc<MiningTarget>,
        transport: Arc<dyn Transport>,
        home_port: u16,
        payout: Point,
        params: ConsensusParams,
        idle_poll: Duration,
    ) -> Miner {
        Miner {
            target,
            transport,
            home_port,
            payout,
            params,
            idle_poll,
            current: None,
        }
    }

    /// One iteration budget's worth of work on the freshest target.
    ///
    /// A newer target replaces the one in progress. Targets without
    /// transactions are not mined. Returns the block if it was solved.
    pub fn step(&mut self) -> Result<Option<Block>> {
        if let Some(fresh) = self.target.take() {
            debug!("Switching to target at height {}", fresh.get_height());
            self.current = Some(fresh);
        }

        if !self.has_work() {
            return Ok(None);
        }
        let block = match self.current.as_mut() {
            Some(block) => block,
            None => return Ok(None),
        };

        let solved = block.mine(
            self.params.difficulty,
            self.params.block_reward,
            &self.payout,
            self.params.iteration_budget,
        )?;
        if !solved {
            return Ok(None);
        }

        let block = match self.current.take() {
            Some(block) => block,
            None => return Ok(None),
        };
        let message = Message::new(Payload::Block(block.clone()), self.home_port);
        if let Err(e) = self.transport.send(self.home_port, &message) {
            warn!("Failed to hand mined block to {}: {e}", self.home_port);
        }
        Ok(Some(block))
    }

    /// True while holding a target with transactions to mine.
    pub fn has_work(&self) -> bool {
        self.current
            .as_ref()
            .map_or(false, |block| !block.get_transactions().is_empty())
    }

    pub fn run(mut self) {
        info!(
            "Miner started on {} (difficulty {}, budget {})",
            self.home_port, self.params.difficulty, self.params.iteration_budget
        );
        loop {
            match self.step() {
                Ok(Some(_)) => {}
                Ok(None) if !self.has_work() => thread::sleep(self.idle_poll),
                Ok(None) => {}
                Err(e) => {
                    error!("Mining failed: {e}");
                    self.current = None;
                }
            }
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        thread::spawn(move || self.run())
    }
}

/// Mines an empty genesis block at height 0, retrying budget after budget
/// until it is solved.
pub fn mine_genesis(params: &ConsensusParams, payout: &Point) -> Result<Block> {
    let mut genesis = Block::new_block(GENESIS_HEIGHT, String::new(), vec![]);
    let mut rounds: u64 = 0;
    while !genesis.mine(
        params.difficulty,
        params.block_reward,
        payout,
        params.iteration_budget,
    )? {
        rounds += 1;
        debug!("Genesis not found after {rounds} rounds");
    }
    Ok(genesis)
}
