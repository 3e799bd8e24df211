use crate::crypto::{generator, group_order, Point};
use crate::error::{BlockchainError, Result};
use crate::utils::{base58_decode, base58_encode, double_sha256, hash160};
use num_bigint::{BigInt, RandBigInt, Sign};

const VERSION: u8 = 0x00;
const WIF_VERSION: u8 = 0x80;
const WIF_COMPRESSED_FLAG: u8 = 0x01;
pub const ADDRESS_CHECK_SUM_LEN: usize = 4;

/// A secp256k1 key pair.
#[derive(Clone)]
pub struct Wallet {
    secret: BigInt,
    public_key: Point,
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl Wallet {
    pub fn generate() -> Result<Wallet> {
        let secret = rand::thread_rng().gen_bigint_range(&BigInt::from(1), group_order());
        Wallet::from_secret(secret)
    }

    pub fn from_secret(secret: BigInt) -> Result<Wallet> {
        if secret.sign() != Sign::Plus || &secret >= group_order() {
            return Err(BlockchainError::Crypto(
                "private key must be in [1, n-1]".to_string(),
            ));
        }
        let public_key = generator().multiply(&secret)?;
        Ok(Wallet { secret, public_key })
    }

    /// Accepts a decimal scalar or a `0x`-prefixed hex scalar.
    pub fn from_secret_str(text: &str) -> Result<Wallet> {
        let text = text.trim();
        let parsed = match text.strip_prefix("0x") {
            Some(hex) => BigInt::parse_bytes(hex.as_bytes(), 16),
            None => BigInt::parse_bytes(text.as_bytes(), 10),
        };
        let secret = parsed
            .ok_or_else(|| BlockchainError::Crypto(format!("Invalid private key: {text}")))?;
        Wallet::from_secret(secret)
    }

    /// Decodes a wallet import format key, compressed or not.
    pub fn from_wif(wif: &str) -> Result<Wallet> {
        let payload = base58_decode(wif)?;
        if payload.len() <= ADDRESS_CHECK_SUM_LEN {
            return Err(BlockchainError::InvalidAddress(
                "WIF key too short".to_string(),
            ));
        }

        let (body, checksum_bytes) = payload.split_at(payload.len() - ADDRESS_CHECK_SUM_LEN);
        if checksum(body) != checksum_bytes {
            return Err(BlockchainError::InvalidAddress(
                "WIF checksum mismatch".to_string(),
            ));
        }

        let key_bytes = match body {
            [WIF_VERSION, key @ ..] if key.len() == 32 => key,
            [WIF_VERSION, key @ .., WIF_COMPRESSED_FLAG] if key.len() == 32 => key,
            _ => {
                return Err(BlockchainError::InvalidAddress(
                    "Unrecognised WIF layout".to_string(),
                ))
            }
        };

        Wallet::from_secret(BigInt::from_bytes_be(Sign::Plus, key_bytes))
    }

    pub fn to_wif(&self, compressed: bool) -> String {
        let mut payload = vec![WIF_VERSION];
        payload.extend(scalar_bytes(&self.secret));
        if compressed {
            payload.push(WIF_COMPRESSED_FLAG);
        }
        let checksum = checksum(payload.as_slice());
        payload.extend(checksum);
        base58_encode(payload.as_slice())
    }

    pub fn secret(&self) -> &BigInt {
        &self.secret
    }

    pub fn public_key(&self) -> &Point {
        &self.public_key
    }

    /// SEC1 encoding: `04 || x || y`, or `02/03 || x` by parity of y.
    pub fn encode_public_key(&self, compressed: bool) -> Vec<u8> {
        let (x, y) = match (self.public_key.x(), self.public_key.y()) {
            (Some(x), Some(y)) => (x, y),
            _ => return vec![0x00],
        };

        if compressed {
            let prefix = if y.bit(0) { 0x03 } else { 0x02 };
            let mut encoded = vec![prefix];
            encoded.extend(scalar_bytes(x));
            encoded
        } else {
            let mut encoded = vec![0x04];
            encoded.extend(scalar_bytes(x));
            encoded.extend(scalar_bytes(y));
            encoded
        }
    }

    pub fn get_address(&self, compressed: bool) -> String {
        convert_address(&hash_pub_key(&self.encode_public_key(compressed)))
    }
}

/// Big-endian, left-padded to 32 bytes.
fn scalar_bytes(value: &BigInt) -> Vec<u8> {
    let (_, bytes) = value.to_bytes_be();
    let mut padded = vec![0u8; 32usize.saturating_sub(bytes.len())];
    padded.extend(bytes);
    padded
}

pub fn hash_pub_key(pub_key: &[u8]) -> Vec<u8> {
    hash160(pub_key)
}

fn checksum(payload: &[u8]) -> Vec<u8> {
    double_sha256(payload)[0..ADDRESS_CHECK_SUM_LEN].to_vec()
}

pub fn validate_address(address: &str) -> bool {
    let payload = match base58_decode(address) {
        Ok(payload) => payload,
        Err(_) => return false,
    };

    if payload.len() < ADDRESS_CHECK_SUM_LEN + 1 {
        return false;
    }

    let (body, actual_checksum) = payload.split_at(payload.len() - ADDRESS_CHECK_SUM_LEN);
    checksum(body) == actual_checksum
}

pub fn convert_address(pub_hash_key: &[u8]) -> String {
    let mut payload: Vec<u8> = vec![VERSION];
    payload.extend(pub_hash_key);
    let checksum = checksum(payload.as_slice());
    payload.extend(checksum.as_slice());
    base58_encode(payload.as_slice())
}
