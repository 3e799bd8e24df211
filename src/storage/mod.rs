//! Node-local state
//!
//! The pending-transaction pool, the single-slot mining target shared with the
//! mining worker, and the on-disk chain snapshot.

pub mod memory_pool;
pub mod mining_target;
pub mod snapshot;

pub use memory_pool::MemoryPool;
pub use mining_target::MiningTarget;
pub use snapshot::ChainSnapshot;
