// Random transfer generator for exercising a local network of nodes.

use crate::core::Transaction;
use crate::crypto::generator;
use crate::error::Result;
use num_bigint::BigInt;
use rand::Rng;
use std::ops::RangeInclusive;

const KEY_RANGE: RangeInclusive<u64> = 1..=1_000_000;
const VALUE_RANGE: RangeInclusive<u64> = 1..=100;

/// A transfer between two random small-scalar keys, signed by the sender.
pub fn random_transfer<R: Rng>(rng: &mut R) -> Result<Transaction> {
    let sender = BigInt::from(rng.gen_range(KEY_RANGE));
    let receiver = BigInt::from(rng.gen_range(KEY_RANGE));

    let mut tx = Transaction::new(
        Some(generator().multiply(&sender)?),
        generator().multiply(&receiver)?,
        rng.gen_range(VALUE_RANGE),
        rng.gen_range(VALUE_RANGE),
    );
    tx.sign(&sender)?;
    Ok(tx)
}

/// Picks a destination port in `[min, max]`.
pub fn random_port<R: Rng>(rng: &mut R, min: u16, max: u16) -> u16 {
    rng.gen_range(min.min(max)..=max.max(min))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_transfers_verify() {
        let mut rng = rand::thread_rng();
        for _ in 0..3 {
            let tx = random_transfer(&mut rng).unwrap();
            assert!(tx.verify_signature());
            assert!(VALUE_RANGE.contains(&tx.get_amount()));
            assert!(VALUE_RANGE.contains(&tx.get_fee()));
        }
    }

    #[test]
    fn test_random_port_in_range() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let port = random_port(&mut rng, 5001, 5005);
            assert!((5001..=5005).contains(&port));
        }
        assert_eq!(random_port(&mut rng, 5003, 5003), 5003);
    }
}
