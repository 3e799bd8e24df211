// Short Weierstrass curves y^2 = x^3 + a*x + b over a prime field, and the
// secp256k1 parameters every key and signature in the ledger lives on.

use crate::crypto::field::{modular_inverse, modulo};
use crate::error::{BlockchainError, Result};
use num_bigint::{BigInt, Sign};
use num_traits::Zero;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Curve {
    pub p: BigInt,
    pub a: BigInt,
    pub b: BigInt,
}

impl Curve {
    pub fn new(p: BigInt, a: BigInt, b: BigInt) -> Curve {
        Curve { p, a, b }
    }
}

// Little-endian 32-bit limbs, so construction cannot fail.
static SECP256K1: Lazy<Arc<Curve>> = Lazy::new(|| {
    Arc::new(Curve::new(
        BigInt::from_slice(
            Sign::Plus,
            &[
                0xFFFFFC2F, 0xFFFFFFFE, 0xFFFFFFFF, 0xFFFFFFFF, 0xFFFFFFFF, 0xFFFFFFFF,
                0xFFFFFFFF, 0xFFFFFFFF,
            ],
        ),
        BigInt::zero(),
        BigInt::from(7),
    ))
});

static GENERATOR: Lazy<Point> = Lazy::new(|| {
    Point::from_raw(
        BigInt::from_slice(
            Sign::Plus,
            &[
                0x16F81798, 0x59F2815B, 0x2DCE28D9, 0x029BFCDB, 0xCE870B07, 0x55A06295,
                0xF9DCBBAC, 0x79BE667E,
            ],
        ),
        BigInt::from_slice(
            Sign::Plus,
            &[
                0xFB10D4B8, 0x9C47D08F, 0xA6855419, 0xFD17B448, 0x0E1108A8, 0x5DA4FBFC,
                0x26A3C465, 0x483ADA77,
            ],
        ),
        secp256k1(),
    )
});

static GROUP_ORDER: Lazy<BigInt> = Lazy::new(|| {
    BigInt::from_slice(
        Sign::Plus,
        &[
            0xD0364141, 0xBFD25E8C, 0xAF48A03B, 0xBAAEDCE6, 0xFFFFFFFE, 0xFFFFFFFF, 0xFFFFFFFF,
            0xFFFFFFFF,
        ],
    )
});

/// The secp256k1 curve: p = 2^256 - 2^32 - 977, a = 0, b = 7.
pub fn secp256k1() -> Arc<Curve> {
    Arc::clone(&SECP256K1)
}

/// Base point G of secp256k1.
pub fn generator() -> &'static Point {
    &GENERATOR
}

/// Order n of the subgroup generated by G.
pub fn group_order() -> &'static BigInt {
    &GROUP_ORDER
}

/// A point on a curve, or the point at infinity (`coordinates == None`).
///
/// The curve is not part of the serialized form: decoded points are attached
/// to secp256k1, the only curve the ledger exchanges over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    coordinates: Option<(BigInt, BigInt)>,
    #[serde(skip, default = "secp256k1")]
    curve: Arc<Curve>,
}

impl Point {
    /// Builds an affine point, rejecting coordinates outside `[0, p)` or off the curve.
    pub fn new(x: BigInt, y: BigInt, curve: Arc<Curve>) -> Result<Point> {
        let in_field = |v: &BigInt| v.sign() != Sign::Minus && v < &curve.p;
        if !in_field(&x) || !in_field(&y) {
            return Err(BlockchainError::Crypto(
                "point coordinates are outside the field".to_string(),
            ));
        }

        let point = Point::from_raw(x, y, curve);
        if !point.is_on_curve() {
            return Err(BlockchainError::Crypto(
                "point does not satisfy the curve equation".to_string(),
            ));
        }
        Ok(point)
    }

    /// Builds an affine point without any membership check.
    pub fn from_raw(x: BigInt, y: BigInt, curve: Arc<Curve>) -> Point {
        Point {
            coordinates: Some((x, y)),
            curve,
        }
    }

    pub fn identity(curve: Arc<Curve>) -> Point {
        Point {
            coordinates: None,
            curve,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.coordinates.is_none()
    }

    pub fn x(&self) -> Option<&BigInt> {
        self.coordinates.as_ref().map(|(x, _)| x)
    }

    pub fn y(&self) -> Option<&BigInt> {
        self.coordinates.as_ref().map(|(_, y)| y)
    }

    pub fn curve(&self) -> &Arc<Curve> {
        &self.curve
    }

    fn same_curve(&self, other: &Point) -> bool {
        Arc::ptr_eq(&self.curve, &other.curve) || *self.curve == *other.curve
    }

    pub fn is_on_curve(&self) -> bool {
        match &self.coordinates {
            None => true,
            Some((x, y)) => {
                let curve = &self.curve;
                let lhs = x * x * x + &curve.a * x + &curve.b - y * y;
                modulo(&lhs, &curve.p).is_zero()
            }
        }
    }

    pub fn negate(&self) -> Point {
        match &self.coordinates {
            None => self.clone(),
            Some((x, y)) => Point::from_raw(
                x.clone(),
                modulo(&(-y), &self.curve.p),
                Arc::clone(&self.curve),
            ),
        }
    }

    /// Group law. The identity is neutral, `P + (-P)` is the identity, equal
    /// points use the tangent slope and distinct points the chord slope.
    pub fn add(&self, other: &Point) -> Result<Point> {
        if !self.same_curve(other) {
            return Err(BlockchainError::CurveMismatch);
        }

        let (x1, y1) = match &self.coordinates {
            None => return Ok(other.clone()),
            Some(c) => c,
        };
        let (x2, y2) = match &other.coordinates {
            None => return Ok(self.clone()),
            Some(c) => c,
        };

        let p = &self.curve.p;
        let identity = || Point::identity(Arc::clone(&self.curve));

        let slope = if x1 == x2 {
            if y1 != y2 || y1.is_zero() {
                return Ok(identity());
            }
            let numerator = BigInt::from(3) * x1 * x1 + &self.curve.a;
            let denominator = modular_inverse(&(BigInt::from(2) * y1), p)?;
            modulo(&(numerator * denominator), p)
        } else {
            let denominator = modular_inverse(&(x2 - x1), p)?;
            modulo(&((y2 - y1) * denominator), p)
        };

        let xr = modulo(&(&slope * &slope - x1 - x2), p);
        let yr = modulo(&(-(&slope * (&xr - x1) + y1)), p);

        Ok(Point::from_raw(xr, yr, Arc::clone(&self.curve)))
    }

    pub fn double(&self) -> Result<Point> {
        self.add(self)
    }

    /// Scalar multiplication `k * P` by double-and-add over the bits of `k`,
    /// least significant first. `k = 0` yields the identity.
    pub fn multiply(&self, k: &BigInt) -> Result<Point> {
        if k.sign() == Sign::Minus {
            return Err(BlockchainError::Crypto(format!(
                "scalar must be non-negative, got {k}"
            )));
        }

        let mut result = Point::identity(Arc::clone(&self.curve));
        let mut addend = self.clone();
        let bits = k.bits();

        for i in 0..bits {
            if k.bit(i) {
                result = result.add(&addend)?;
            }
            if i + 1 < bits {
                addend = addend.double()?;
            }
        }

        Ok(result)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.same_curve(other) && self.coordinates == other.coordinates
    }
}

impl Eq for Point {}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.coordinates {
            None => write!(f, "Point(infinity)"),
            Some((x, y)) => write!(f, "Point({x:x}, {y:x})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_curve() -> Arc<Curve> {
        // y^2 = x^3 + 2x + 3 over F_97
        Arc::new(Curve::new(BigInt::from(97), BigInt::from(2), BigInt::from(3)))
    }

    fn scalar(v: u64) -> BigInt {
        BigInt::from(v)
    }

    #[test]
    fn test_generator_is_on_curve() {
        assert!(generator().is_on_curve());
    }

    #[test]
    fn test_tampered_point_is_not_on_curve() {
        let g = generator();
        let tampered = Point::from_raw(
            g.x().unwrap().clone(),
            g.y().unwrap() + 1,
            secp256k1(),
        );
        assert!(!tampered.is_on_curve());
        assert!(Point::new(g.x().unwrap().clone(), g.y().unwrap() + 1, secp256k1()).is_err());
    }

    #[test]
    fn test_double_matches_add() {
        let g = generator();
        let doubled = g.double().unwrap();
        assert_eq!(doubled, g.add(g).unwrap());
        assert!(doubled.is_on_curve());
    }

    #[test]
    fn test_known_multiple_of_generator() {
        let two_g = generator().multiply(&scalar(2)).unwrap();
        let expected_x = BigInt::parse_bytes(
            b"89565891926547004231252920425935692360644145829622209833684329913297188986597",
            10,
        )
        .unwrap();
        let expected_y = BigInt::parse_bytes(
            b"12158399299693830322967808612713398636155367887041628176798871954788371653930",
            10,
        )
        .unwrap();
        assert_eq!(two_g.x(), Some(&expected_x));
        assert_eq!(two_g.y(), Some(&expected_y));
    }

    #[test]
    fn test_scalar_multiply_matches_repeated_addition() {
        let g = generator();
        let mut sum = Point::identity(secp256k1());
        for _ in 0..5 {
            sum = sum.add(g).unwrap();
        }
        assert_eq!(g.multiply(&scalar(5)).unwrap(), sum);
    }

    #[test]
    fn test_scalar_zero_and_one() {
        let g = generator();
        assert!(g.multiply(&scalar(0)).unwrap().is_identity());
        assert_eq!(&g.multiply(&scalar(1)).unwrap(), g);
    }

    #[test]
    fn test_group_order_annihilates_generator() {
        let g = generator();
        assert!(g.multiply(group_order()).unwrap().is_identity());

        let n_minus_one = group_order() - 1;
        assert_eq!(g.multiply(&n_minus_one).unwrap(), g.negate());
    }

    #[test]
    fn test_identity_is_neutral() {
        let g = generator();
        let identity = Point::identity(secp256k1());
        assert_eq!(&identity.add(g).unwrap(), g);
        assert_eq!(&g.add(&identity).unwrap(), g);
        assert!(identity.is_on_curve());
    }

    #[test]
    fn test_inverse_points_sum_to_identity() {
        let g = generator();
        assert!(g.add(&g.negate()).unwrap().is_identity());
    }

    #[test]
    fn test_negative_scalar_is_rejected() {
        assert!(generator().multiply(&BigInt::from(-3)).is_err());
    }

    #[test]
    fn test_points_on_different_curves_cannot_be_added() {
        let other = Point::new(BigInt::from(3), BigInt::from(6), small_curve()).unwrap();
        assert_eq!(
            generator().add(&other),
            Err(BlockchainError::CurveMismatch)
        );
    }

    #[test]
    fn test_identities_compare_equal_only_on_same_curve() {
        assert_eq!(Point::identity(secp256k1()), Point::identity(secp256k1()));
        assert_ne!(Point::identity(secp256k1()), Point::identity(small_curve()));
    }

    #[test]
    fn test_small_curve_arithmetic() {
        let curve = small_curve();
        let p = Point::new(BigInt::from(3), BigInt::from(6), Arc::clone(&curve)).unwrap();
        let doubled = p.double().unwrap();
        assert_eq!(doubled.x(), Some(&BigInt::from(80)));
        assert_eq!(doubled.y(), Some(&BigInt::from(10)));
        assert_eq!(p.multiply(&scalar(2)).unwrap(), doubled);
        assert!(doubled.is_on_curve());
    }

    #[test]
    fn test_point_serialization_restores_curve() {
        let g = generator().clone();
        let json = serde_json::to_string(&g).unwrap();
        let decoded: Point = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, g);

        let identity_json = serde_json::to_string(&Point::identity(secp256k1())).unwrap();
        let identity: Point = serde_json::from_str(&identity_json).unwrap();
        assert!(identity.is_identity());
    }
}
