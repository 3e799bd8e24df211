use crate::core::Block;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Single-slot hand-off of the freshest candidate block from the ingestion
/// worker to the mining worker.
///
/// Only the latest target matters: publishing overwrites whatever the miner
/// has not picked up yet. The ready flag is cleared by the same atomic swap
/// that reads it.
pub struct MiningTarget {
    slot: Mutex<Option<Block>>,
    ready: AtomicBool,
}

impl Default for MiningTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl MiningTarget {
    pub fn new() -> MiningTarget {
        MiningTarget {
            slot: Mutex::new(None),
            ready: AtomicBool::new(false),
        }
    }

    /// Replaces the target and raises the ready flag.
    pub fn publish(&self, block: Block) {
        match self.slot.lock() {
            Ok(mut slot) => {
                *slot = Some(block);
            }
            Err(_) => {
                log::error!("Failed to acquire lock on mining target");
                return;
            }
        }
        self.ready.store(true, Ordering::Release);
    }

    /// A private copy of the target if one was published since the last take.
    pub fn take(&self) -> Option<Block> {
        if !self.ready.swap(false, Ordering::AcqRel) {
            return None;
        }
        match self.slot.lock() {
            Ok(slot) => slot.clone(),
            Err(_) => {
                log::error!("Failed to acquire lock on mining target");
                None
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_take_clears_the_signal() {
        let target = MiningTarget::new();
        assert!(target.take().is_none());

        target.publish(Block::new_block(1, "a".to_string(), vec![]));
        assert!(target.is_ready());
        assert_eq!(target.take().unwrap().get_height(), 1);
        assert!(!target.is_ready());
        assert!(target.take().is_none());
    }

    #[test]
    fn test_only_latest_target_is_kept() {
        let target = MiningTarget::new();
        target.publish(Block::new_block(1, "a".to_string(), vec![]));
        target.publish(Block::new_block(2, "b".to_string(), vec![]));
        let block = target.take().unwrap();
        assert_eq!(block.get_height(), 2);
        assert_eq!(block.get_pre_block_hash(), "b");
    }

    #[test]
    fn test_cross_thread_hand_off() {
        let target = Arc::new(MiningTarget::new());
        let producer = Arc::clone(&target);
        thread::spawn(move || {
            for height in 0..100 {
                producer.publish(Block::new_block(height, String::new(), vec![]));
            }
        })
        .join()
        .unwrap();

        assert_eq!(target.take().unwrap().get_height(), 99);
    }
}
