use crate::core::{Block, Transaction};
use std::collections::HashMap;

/// Pending transactions of one node. ( K -> tx id, V => Transaction )
///
/// Owned by the ingestion worker, so no locking is needed.
#[derive(Debug, Default)]
pub struct MemoryPool {
    inner: HashMap<String, Transaction>,
}

impl MemoryPool {
    pub fn new() -> MemoryPool {
        MemoryPool {
            inner: HashMap::new(),
        }
    }

    pub fn get(&self, txid: &str) -> Option<&Transaction> {
        self.inner.get(txid)
    }

    /// Returns false when a transaction with the same id is already pooled.
    pub fn add(&mut self, tx: Transaction) -> bool {
        if self.inner.contains_key(tx.get_id()) {
            return false;
        }
        self.inner.insert(tx.get_id().to_string(), tx);
        true
    }

    pub fn contains(&self, txid: &str) -> bool {
        self.inner.contains_key(txid)
    }

    pub fn remove(&mut self, txid: &str) -> Option<Transaction> {
        self.inner.remove(txid)
    }

    /// Drops every transaction included in `block`, returning how many went.
    pub fn evict_block(&mut self, block: &Block) -> usize {
        block
            .get_transactions()
            .iter()
            .filter(|tx| self.inner.remove(tx.get_id()).is_some())
            .count()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn get_all(&self) -> Vec<Transaction> {
        self.inner.values().cloned().collect()
    }

    /// Up to `limit` transactions, highest fee first, ties by id.
    pub fn best_transactions(&self, limit: usize) -> Vec<Transaction> {
        let mut txs: Vec<&Transaction> = self.inner.values().collect();
        txs.sort_by(|a, b| {
            b.get_fee()
                .cmp(&a.get_fee())
                .then_with(|| a.get_id().cmp(b.get_id()))
        });
        txs.into_iter().take(limit).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }
}
