//! Key management
//!
//! secp256k1 key pairs, WIF import/export and base58check addresses.

#[allow(clippy::module_inception)]
pub mod wallet;

pub use wallet::{convert_address, hash_pub_key, validate_address, Wallet, ADDRESS_CHECK_SUM_LEN};
