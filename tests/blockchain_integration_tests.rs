//! Ledger integration tests
//!
//! Exercise the public API end to end: keys and signatures, mined chains,
//! and small in-process networks of nodes gossiping through a queued
//! transport.

use ledger_node::config::Settings;
use ledger_node::core::{Block, Blockchain, ProofOfWork, Transaction};
use ledger_node::crypto::{generator, message_digest, sign, verify};
use ledger_node::network::{mine_genesis, Message, Miner, Payload, Server, Transport};
use ledger_node::storage::MiningTarget;
use ledger_node::wallet::Wallet;
use ledger_node::Result;
use num_bigint::BigInt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;

const DIFFICULTY: usize = 1;
const REWARD: u64 = 50;

fn wallet(secret: u64) -> Wallet {
    Wallet::from_secret(BigInt::from(secret)).unwrap()
}

fn transfer(from: u64, to: u64, amount: u64, fee: u64) -> Transaction {
    let (sender, receiver) = (wallet(from), wallet(to));
    let mut tx = Transaction::new(
        Some(sender.public_key().clone()),
        receiver.public_key().clone(),
        amount,
        fee,
    );
    tx.sign(sender.secret()).unwrap();
    tx
}

fn settings(port: u16, peers: Vec<u16>) -> Settings {
    let mut settings = Settings::default();
    settings.consensus.difficulty = DIFFICULTY;
    settings.consensus.block_reward = REWARD;
    settings.consensus.iteration_budget = 1_000_000;
    settings.network.port = port;
    settings.network.peers = peers;
    settings.network.replay_interval_ms = 0;
    settings
}

fn mine_on(chain: &mut Blockchain, transactions: Vec<Transaction>) {
    let (height, pre_block_hash) = match chain.tip() {
        Some(tip) => (tip.get_height() + 1, tip.get_hash().unwrap().to_string()),
        None => (0, String::new()),
    };
    let mut block = Block::new_block(height, pre_block_hash, transactions);
    assert!(block
        .mine(DIFFICULTY, REWARD, wallet(42).public_key(), 1_000_000)
        .unwrap());
    chain.add_block(block).unwrap();
}

/// Delivers by appending to a shared queue that the test drains.
#[derive(Default)]
struct QueuedTransport {
    queue: Mutex<VecDeque<(u16, Message)>>,
}

impl QueuedTransport {
    fn pop(&self) -> Option<(u16, Message)> {
        self.queue.lock().unwrap().pop_front()
    }
}

impl Transport for QueuedTransport {
    fn send(&self, port: u16, message: &Message) -> Result<()> {
        self.queue.lock().unwrap().push_back((port, message.clone()));
        Ok(())
    }
}

/// Nodes sharing one queued transport; messages to unknown ports are lost.
struct Network {
    transport: Arc<QueuedTransport>,
    nodes: Vec<(Server, Arc<MiningTarget>)>,
}

impl Network {
    fn new(topology: &[(u16, Vec<u16>)]) -> Network {
        let transport = Arc::new(QueuedTransport::default());
        let nodes = topology
            .iter()
            .map(|(port, peers)| {
                let target = Arc::new(MiningTarget::new());
                let server = Server::new(
                    &settings(*port, peers.clone()),
                    transport.clone(),
                    Arc::clone(&target),
                );
                (server, target)
            })
            .collect();
        Network { transport, nodes }
    }

    fn inject(&self, port: u16, payload: Payload, origin: u16) {
        self.transport
            .send(port, &Message::new(payload, origin))
            .unwrap();
    }

    /// Delivers queued messages until the network is quiet.
    fn settle(&mut self) -> usize {
        let mut delivered = 0;
        while let Some((port, message)) = self.transport.pop() {
            if let Some((server, _)) = self.nodes.iter_mut().find(|(s, _)| s.home_port() == port) {
                let _ = server.handle_message(message);
                delivered += 1;
            }
        }
        delivered
    }

    fn node(&self, port: u16) -> &Server {
        &self
            .nodes
            .iter()
            .find(|(s, _)| s.home_port() == port)
            .unwrap()
            .0
    }

    fn miner(&self, port: u16) -> Miner {
        let (_, target) = self
            .nodes
            .iter()
            .find(|(s, _)| s.home_port() == port)
            .unwrap();
        Miner::new(
            Arc::clone(target),
            self.transport.clone(),
            port,
            wallet(7).public_key().clone(),
            settings(port, vec![]).consensus,
            Duration::from_millis(1),
        )
    }
}

#[test]
fn test_generator_is_on_curve() {
    assert!(generator().is_on_curve());
}

#[test]
fn test_sign_and_verify_with_matching_key_only() {
    let (alice, bob) = (wallet(1_234_567), wallet(7_654_321));
    let (_, digest) = message_digest(Some(alice.public_key()), bob.public_key(), 10);

    let signature = sign(&digest, alice.secret()).unwrap();
    assert!(verify(&digest, &signature, alice.public_key()));
    assert!(!verify(&digest, &signature, bob.public_key()));
}

#[test]
fn test_mined_chain_verifies_and_detects_tampering() {
    let mut chain = Blockchain::new(10);
    for round in 0..4 {
        mine_on(&mut chain, vec![transfer(round + 1, round + 2, 10, 1)]);
    }
    assert!(chain.verify(DIFFICULTY));
    for block in chain.get_blocks() {
        assert!(ProofOfWork::validate(block, DIFFICULTY).is_ok());
        assert!(block.merkle_root().is_ok());
    }

    let mut blocks = chain.get_blocks().to_vec();
    blocks.remove(1);
    assert!(!Blockchain::from_blocks(blocks, 10).verify(DIFFICULTY));
}

#[test]
fn test_mempool_is_idempotent() {
    let mut network = Network::new(&[(5001, vec![])]);
    let tx = transfer(1, 2, 10, 1);
    network.inject(5001, Payload::Transaction(tx.clone()), 43);
    network.inject(5001, Payload::Transaction(tx.clone()), 43);
    network.settle();
    assert_eq!(network.node(5001).get_mempool().len(), 1);
}

#[test]
fn test_longest_chain_replaces_local_chain() {
    let mut network = Network::new(&[(5001, vec![])]);
    let mut chain = Blockchain::new(10);
    mine_on(&mut chain, vec![]);
    mine_on(&mut chain, vec![]);
    network.inject(5001, Payload::Blockchain(chain.clone()), 42);

    let pending = transfer(3, 4, 5, 6);
    network.inject(5001, Payload::Transaction(pending.clone()), 43);
    network.settle();
    assert_eq!(network.node(5001).get_chain().len(), 2);
    assert!(network.node(5001).get_mempool().contains(pending.get_id()));

    mine_on(&mut chain, vec![pending.clone()]);
    network.inject(5001, Payload::Blockchain(chain.clone()), 42);
    network.settle();

    let node = network.node(5001);
    assert_eq!(node.get_chain().len(), 3);
    assert_eq!(node.get_chain(), &chain);
    assert!(!node.get_mempool().contains(pending.get_id()));
}

#[test]
fn test_gossip_converges_and_suppresses_duplicates() {
    // a ring of three nodes, each relaying to the next
    let mut network = Network::new(&[
        (5001, vec![5002]),
        (5002, vec![5003]),
        (5003, vec![5001]),
    ]);

    let genesis = mine_genesis(
        &settings(5001, vec![]).consensus,
        wallet(42).public_key(),
    )
    .unwrap();
    network.inject(5001, Payload::Block(genesis.clone()), 42);
    let tx = transfer(1, 2, 10, 3);
    network.inject(5002, Payload::Transaction(tx.clone()), 43);

    // every message goes around the ring once, then is dropped as a duplicate
    let delivered = network.settle();
    assert!(delivered < 20, "gossip did not terminate quickly: {delivered}");

    for port in [5001, 5002, 5003] {
        let node = network.node(port);
        assert_eq!(node.get_chain().len(), 1);
        assert_eq!(node.get_chain().tip(), Some(&genesis));
        assert!(node.get_mempool().contains(tx.get_id()));
    }
}

#[test]
fn test_mined_block_flows_through_ingestion() {
    let mut network = Network::new(&[(5001, vec![5002]), (5002, vec![5001])]);
    let genesis = mine_genesis(
        &settings(5001, vec![]).consensus,
        wallet(42).public_key(),
    )
    .unwrap();
    network.inject(5001, Payload::Block(genesis), 42);
    let tx = transfer(1, 2, 10, 3);
    network.inject(5001, Payload::Transaction(tx.clone()), 43);
    network.settle();

    let mut miner = network.miner(5001);
    let block = miner.step().unwrap().expect("difficulty 1 is solved");
    assert!(block.contains_transaction(&tx));
    network.settle();

    for port in [5001, 5002] {
        let node = network.node(port);
        assert_eq!(node.get_chain().len(), 2);
        assert!(node.get_chain().contains_transaction(&tx));
        assert!(node.get_mempool().is_empty());
    }
}

#[test]
fn test_late_peer_catches_up_by_replay() {
    let mut network = Network::new(&[(5001, vec![]), (5002, vec![])]);
    let mut chain = Blockchain::new(10);
    for _ in 0..3 {
        mine_on(&mut chain, vec![]);
    }
    network.inject(5001, Payload::Blockchain(chain.clone()), 42);
    network.settle();

    // 5002 introduces itself with a transaction; 5001 replays its blocks
    network.inject(5001, Payload::Transaction(transfer(1, 2, 3, 4)), 5002);
    network.settle();

    assert!(network.node(5001).get_peers().is_known(5002));
    assert_eq!(network.node(5002).get_chain(), &chain);
}

#[test]
fn test_snapshot_survives_restart() {
    let dir = tempdir().unwrap();
    let mut config = settings(5001, vec![]);
    config.storage.snapshot_path = Some(dir.path().join("chain.bin"));

    let mut chain = Blockchain::new(10);
    mine_on(&mut chain, vec![transfer(1, 2, 3, 4)]);
    mine_on(&mut chain, vec![]);

    let transport = Arc::new(QueuedTransport::default());
    let mut first = Server::new(&config, transport.clone(), Arc::new(MiningTarget::new()));
    first
        .handle_message(Message::new(Payload::Blockchain(chain.clone()), 42))
        .unwrap();

    let mut restarted = Server::new(&config, transport, Arc::new(MiningTarget::new()));
    restarted.restore_snapshot().unwrap();
    assert_eq!(restarted.get_chain(), &chain);
    assert!(restarted.get_chain().verify(DIFFICULTY));
}
