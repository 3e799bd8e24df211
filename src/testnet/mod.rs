//! Shared fixtures for unit tests: deterministic wallets, quickly mined chains
//! and a transport that records instead of sending.

pub mod test_utils;

pub use test_utils::*;
