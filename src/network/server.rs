use crate::config::{ConsensusParams, Settings};
use crate::core::{Block, Blockchain, Transaction};
use crate::error::{BlockchainError, Result};
use crate::network::{
    broadcast, Inbox, Message, Miner, Payload, Peers, SeenMessages, TcpInbox, TcpTransport,
    Transport,
};
use crate::storage::{ChainSnapshot, MemoryPool, MiningTarget};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Message-ingestion side of a node: owns the chain, the mempool and the peer
/// set, and publishes mining targets for the [`Miner`].
pub struct Server {
    home_port: u16,
    params: ConsensusParams,
    chain: Blockchain,
    mempool: MemoryPool,
    seen: SeenMessages,
    peers: Peers,
    target: Arc<MiningTarget>,
    transport: Arc<dyn Transport>,
    replay_interval: Duration,
    snapshot: Option<ChainSnapshot>,
}

impl Server {
    pub fn new(
        settings: &Settings,
        transport: Arc<dyn Transport>,
        target: Arc<MiningTarget>,
    ) -> Server {
        let network = &settings.network;
        let mut peers = Peers::new(network.port, network.peer_port_min..=network.peer_port_max);
        for &port in &network.peers {
            peers.add_peer(port);
        }

        Server {
            home_port: network.port,
            params: settings.consensus.clone(),
            chain: Blockchain::new(settings.consensus.block_size),
            mempool: MemoryPool::new(),
            seen: SeenMessages::new(network.seen_capacity),
            peers,
            target,
            transport,
            replay_interval: network.replay_interval(),
            snapshot: settings.storage.snapshot_path.clone().map(ChainSnapshot::new),
        }
    }

    pub fn get_chain(&self) -> &Blockchain {
        &self.chain
    }

    pub fn get_mempool(&self) -> &MemoryPool {
        &self.mempool
    }

    pub fn get_peers(&self) -> &Peers {
        &self.peers
    }

    pub fn home_port(&self) -> u16 {
        self.home_port
    }

    /// Loads the configured snapshot. A snapshot that fails validation is
    /// discarded and the node starts from an empty chain.
    pub fn restore_snapshot(&mut self) -> Result<()> {
        let snapshot = match &self.snapshot {
            Some(snapshot) => snapshot,
            None => return Ok(()),
        };
        let stored = match snapshot.load()? {
            Some(chain) => chain,
            None => {
                info!("No snapshot at {}", snapshot.path().display());
                return Ok(());
            }
        };

        match self.check_chain(&stored) {
            Ok(()) => {
                info!(
                    "Restored {} blocks from {}",
                    stored.len(),
                    snapshot.path().display()
                );
                self.chain =
                    Blockchain::from_blocks(stored.get_blocks().to_vec(), self.params.block_size);
                self.publish_candidate();
            }
            Err(e) => warn!("Discarding snapshot {}: {e}", snapshot.path().display()),
        }
        Ok(())
    }

    /// Runs one inbound message through admission, deduplication, relay and
    /// validation. Rejections come back as errors and leave all state except
    /// the peer set and the seen buffer untouched.
    pub fn handle_message(&mut self, message: Message) -> Result<()> {
        let origin = message.get_origin();
        if self.peers.admit(origin) {
            self.replay_chain(origin);
        }

        if !self.seen.insert(message.get_payload().fingerprint()?) {
            debug!(
                "Dropping duplicate {} from {origin}",
                message.get_payload().kind()
            );
            return Ok(());
        }

        let relay = message.relayed_by(self.home_port);
        broadcast(self.transport.as_ref(), self.peers.get_peers(), &relay);

        match message.into_payload() {
            Payload::Transaction(tx) => self.accept_transaction(tx)?,
            Payload::Block(block) => self.accept_block(block)?,
            Payload::Blockchain(chain) => self.accept_chain(chain)?,
        }

        self.publish_candidate();
        Ok(())
    }

    fn accept_transaction(&mut self, tx: Transaction) -> Result<()> {
        if tx.is_reward() {
            return Err(BlockchainError::Transaction(format!(
                "reward transaction {} outside a block",
                tx.get_id()
            )));
        }
        tx.check_signature()?;
        if self.chain.contains_transaction(&tx) {
            return Err(BlockchainError::Transaction(format!(
                "transaction {} is already in the chain",
                tx.get_id()
            )));
        }

        let txid = tx.get_id().to_string();
        if self.mempool.add(tx) {
            info!("Added transaction {txid} to mempool ({} pending)", self.mempool.len());
        }
        Ok(())
    }

    fn check_block(&self, block: &Block) -> Result<()> {
        block.check_proof_of_work(self.params.difficulty)?;
        block.check_signatures()?;
        block.check_reward(self.params.block_reward)?;
        if block.get_transactions().len() > self.params.block_size + 1 {
            return Err(BlockchainError::InvalidBlock(format!(
                "{} transactions exceed block size {}",
                block.get_transactions().len(),
                self.params.block_size
            )));
        }
        Ok(())
    }

    fn check_chain(&self, chain: &Blockchain) -> Result<()> {
        chain.check(self.params.difficulty)?;
        chain
            .get_blocks()
            .iter()
            .try_for_each(|block| self.check_block(block))
    }

    fn accept_block(&mut self, block: Block) -> Result<()> {
        self.check_block(&block)?;

        let extends_tip = match self.chain.tip() {
            None => true,
            Some(tip) => tip.get_hash() == Some(block.get_pre_block_hash()),
        };
        if !extends_tip {
            info!(
                "Ignoring block {} at height {}: does not extend the tip",
                block.identity(),
                block.get_height()
            );
            return Ok(());
        }

        self.chain.add_block(block)?;
        if let Some(tip) = self.chain.tip() {
            let evicted = self.mempool.evict_block(tip);
            debug!("Evicted {evicted} mined transactions");
        }
        self.persist();
        Ok(())
    }

    /// Longest-chain rule: adopt `incoming` only if it is valid and strictly
    /// longer than the local chain.
    fn accept_chain(&mut self, incoming: Blockchain) -> Result<()> {
        self.check_chain(&incoming)?;
        if incoming.len() <= self.chain.len() {
            debug!(
                "Keeping local chain of {} blocks over {}",
                self.chain.len(),
                incoming.len()
            );
            return Ok(());
        }

        info!(
            "Switching from {} to {} blocks",
            self.chain.len(),
            incoming.len()
        );
        self.chain =
            Blockchain::from_blocks(incoming.get_blocks().to_vec(), self.params.block_size);
        for block in self.chain.get_blocks() {
            self.mempool.evict_block(block);
        }
        self.persist();
        Ok(())
    }

    /// Highest-fee mempool transactions on top of the current tip, or `None`
    /// while the chain is empty.
    pub fn assemble_next_block(&self) -> Option<Block> {
        let tip = self.chain.tip()?;
        let pre_block_hash = tip.get_hash()?.to_string();
        Some(Block::new_block(
            tip.get_height() + 1,
            pre_block_hash,
            self.mempool.best_transactions(self.chain.block_size()),
        ))
    }

    fn publish_candidate(&self) {
        if let Some(block) = self.assemble_next_block() {
            debug!(
                "Publishing target at height {} with {} transactions",
                block.get_height(),
                block.get_transactions().len()
            );
            self.target.publish(block);
        }
    }

    /// Sends the whole chain to a newly admitted peer, one block at a time.
    fn replay_chain(&self, port: u16) {
        let blocks = self.chain.get_blocks().to_vec();
        if blocks.is_empty() {
            return;
        }
        info!("Replaying {} blocks to {port}", blocks.len());

        let transport = Arc::clone(&self.transport);
        let home_port = self.home_port;
        let interval = self.replay_interval;
        let replay = move || {
            for (i, block) in blocks.into_iter().enumerate() {
                if i > 0 && !interval.is_zero() {
                    thread::sleep(interval);
                }
                let message = Message::new(Payload::Block(block), home_port);
                if let Err(e) = transport.send(port, &message) {
                    warn!("Replay to {port} stopped: {e}");
                    return;
                }
            }
        };

        if interval.is_zero() {
            replay();
        } else {
            thread::spawn(replay);
        }
    }

    fn persist(&self) {
        if let Some(snapshot) = &self.snapshot {
            if let Err(e) = snapshot.save(&self.chain) {
                error!("Failed to save snapshot: {e}");
            }
        }
    }

    /// Ingestion loop. Only returns if the inbox can no longer be read from.
    pub fn run(&mut self, inbox: &mut dyn Inbox) -> Result<()> {
        info!(
            "Node {} listening, peers {:?}",
            self.home_port,
            self.peers.get_peers()
        );
        loop {
            match inbox.receive() {
                Ok(message) => {
                    let kind = message.get_payload().kind();
                    let origin = message.get_origin();
                    if let Err(e) = self.handle_message(message) {
                        warn!("Rejected {kind} from {origin}: {e}");
                    }
                }
                Err(e @ BlockchainError::Io(_)) => return Err(e),
                Err(e) => error!("{e}"),
            }
        }
    }
}

/// Starts a full node: TCP inbox, optional mining worker and the ingestion
/// loop on the calling thread.
pub fn launch(settings: &Settings) -> Result<()> {
    settings.validate()?;
    let network = &settings.network;

    let mut inbox = TcpInbox::bind(&network.host, network.port)?;
    let transport: Arc<dyn Transport> = Arc::new(TcpTransport::new(
        network.host.clone(),
        network.connect_timeout(),
    ));
    let target = Arc::new(MiningTarget::new());

    if let Some(payout) = settings.miner.payout_wallet()? {
        info!("Mining rewards go to {}", payout.get_address(true));
        Miner::new(
            Arc::clone(&target),
            Arc::clone(&transport),
            network.port,
            payout.public_key().clone(),
            settings.consensus.clone(),
            settings.miner.idle_poll(),
        )
        .spawn();
    } else {
        info!("No payout secret configured, not mining");
    }

    let mut server = Server::new(settings, transport, target);
    server.restore_snapshot()?;
    server.run(&mut inbox)
}
