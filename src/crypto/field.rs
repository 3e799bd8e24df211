use crate::error::{BlockchainError, Result};
use num_bigint::{BigInt, Sign};
use num_traits::{One, Zero};

/// Reduces `a` into `[0, m)`. `%` on `BigInt` keeps the dividend's sign.
pub fn modulo(a: &BigInt, m: &BigInt) -> BigInt {
    let r = a % m;
    if r.sign() == Sign::Minus {
        r + m
    } else {
        r
    }
}

/// Inverse of `a` modulo `m` via the extended Euclidean algorithm.
///
/// Only the Bezout coefficient of `a` is tracked. Fails when `gcd(a, m) != 1`,
/// which for the prime moduli used here means `a ≡ 0 (mod m)`.
pub fn modular_inverse(a: &BigInt, m: &BigInt) -> Result<BigInt> {
    if m <= &BigInt::one() {
        return Err(BlockchainError::Crypto(format!(
            "modulus must be greater than 1, got {m}"
        )));
    }

    let mut old_r = modulo(a, m);
    let mut r = m.clone();
    let mut old_s = BigInt::one();
    let mut s = BigInt::zero();

    while !r.is_zero() {
        let quotient = &old_r / &r;
        let next_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }

    if !old_r.is_one() {
        return Err(BlockchainError::Crypto(format!(
            "{a} has no inverse modulo {m}"
        )));
    }

    Ok(modulo(&old_s, m))
}
