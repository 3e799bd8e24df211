//! Elliptic-curve cryptography
//!
//! Modular arithmetic, secp256k1 point arithmetic and ECDSA signing, built on
//! arbitrary-precision integers.

pub mod curve;
pub mod ecdsa;
pub mod field;

pub use curve::{generator, group_order, secp256k1, Curve, Point};
pub use ecdsa::{message_digest, sign, truncate_digest, verify, x_text, Signature, ABSENT};
pub use field::{modular_inverse, modulo};
