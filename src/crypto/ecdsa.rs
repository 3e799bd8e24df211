// ECDSA over secp256k1 with the ledger's own digest rules.

use crate::crypto::curve::{generator, group_order, Point};
use crate::crypto::field::{modular_inverse, modulo};
use crate::error::{BlockchainError, Result};
use crate::utils::sha256_hex;
use num_bigint::{BigInt, RandBigInt, Sign};
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

/// Text written in place of any absent value inside a hash pre-image.
pub const ABSENT: &str = "None";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub r: BigInt,
    pub s: BigInt,
}

/// Decimal x-coordinate of an optional point, or [`ABSENT`].
pub fn x_text(point: Option<&Point>) -> String {
    point
        .and_then(Point::x)
        .map(|x| x.to_string())
        .unwrap_or_else(|| ABSENT.to_string())
}

/// Hex digest and its integer value over `sender_x ++ receiver_x ++ amount`.
pub fn message_digest(sender: Option<&Point>, receiver: &Point, amount: u64) -> (String, BigInt) {
    let preimage = format!("{}{}{}", x_text(sender), x_text(Some(receiver)), amount);
    let digest = sha256_hex(preimage.as_bytes());
    let value = BigInt::parse_bytes(digest.as_bytes(), 16).unwrap_or_default();
    (digest, value)
}

/// Right-shifts a digest that is wider than the group order.
pub fn truncate_digest(digest: &BigInt) -> BigInt {
    let order_bits = group_order().bits();
    let digest_bits = digest.bits();
    if digest_bits > order_bits {
        digest >> (digest_bits - order_bits)
    } else {
        digest.clone()
    }
}

fn in_scalar_range(v: &BigInt) -> bool {
    v.sign() == Sign::Plus && v < group_order()
}

/// Signs `digest` with `secret`, drawing a fresh nonce until both `r` and `s`
/// are non-zero.
pub fn sign(digest: &BigInt, secret: &BigInt) -> Result<Signature> {
    if !in_scalar_range(secret) {
        return Err(BlockchainError::Crypto(
            "private key must be in [1, n-1]".to_string(),
        ));
    }

    let n = group_order();
    let z = truncate_digest(digest);
    let mut rng = rand::thread_rng();

    loop {
        let nonce = rng.gen_bigint_range(&BigInt::one(), n);
        let commitment = generator().multiply(&nonce)?;
        let r = match commitment.x() {
            Some(x) => modulo(x, n),
            None => continue,
        };
        if r.is_zero() {
            continue;
        }

        let s = modulo(&(modular_inverse(&nonce, n)? * (&r * secret + &z)), n);
        if s.is_zero() {
            continue;
        }

        return Ok(Signature { r, s });
    }
}

/// Checks `signature` over `digest` against `public_key`.
///
/// Fails closed on out-of-range components, a public key that is the identity
/// or off the curve, and a combination point at infinity.
pub fn verify(digest: &BigInt, signature: &Signature, public_key: &Point) -> bool {
    if !in_scalar_range(&signature.r) || !in_scalar_range(&signature.s) {
        return false;
    }
    if public_key.is_identity() || !public_key.is_on_curve() {
        return false;
    }

    let n = group_order();
    let z = truncate_digest(digest);

    let s_inv = match modular_inverse(&signature.s, n) {
        Ok(inv) => inv,
        Err(_) => return false,
    };
    let u1 = modulo(&(&z * &s_inv), n);
    let u2 = modulo(&(&signature.r * &s_inv), n);

    let combined = generator()
        .multiply(&u1)
        .and_then(|a| public_key.multiply(&u2).and_then(|b| a.add(&b)));

    match combined {
        Ok(point) => match point.x() {
            Some(x) => modulo(x, n) == signature.r,
            None => false,
        },
        Err(_) => false,
    }
}
