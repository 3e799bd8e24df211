use crate::core::Transaction;
use crate::error::{BlockchainError, Result};
use crate::utils::double_sha256;
use serde::{Deserialize, Serialize};

/// Merkle tree over hex digests, using Bitcoin's byte-order convention.
///
/// Digests are stored little-endian as hex (the way block explorers print
/// transaction ids). Each parent is `reverse(hash256(reverse(left) || reverse(right)))`,
/// and an odd layer pairs its last node with itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerkleTree {
    /// `layers[0]` holds the leaves, the last layer holds only the root.
    layers: Vec<Vec<String>>,
}

/// Merkle proof for one leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Leaf digest being proven
    pub leaf: String,
    /// Position of the leaf in the leaf layer
    pub index: usize,
    /// Sibling digests from the leaf layer upwards
    pub path: Vec<ProofElement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofElement {
    pub hash: String,
    /// true if the sibling sits on the right
    pub is_right: bool,
}

impl MerkleTree {
    pub fn new(leaves: &[String]) -> Result<Self> {
        if leaves.is_empty() {
            return Err(BlockchainError::Merkle(
                "Cannot build a Merkle tree from an empty leaf list".to_string(),
            ));
        }
        for leaf in leaves {
            decode_digest(leaf)?;
        }

        let mut layers = vec![leaves.to_vec()];
        while let Some(layer) = layers.last().filter(|layer| layer.len() > 1) {
            let parents = layer
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    [single] => hash_pair(single, single),
                    _ => unreachable!("chunks(2) yields one or two items"),
                })
                .collect::<Result<Vec<_>>>()?;
            layers.push(parents);
        }

        Ok(MerkleTree { layers })
    }

    /// Tree over the ids of `transactions`, in block order.
    pub fn from_transactions(transactions: &[Transaction]) -> Result<Self> {
        let ids: Vec<String> = transactions
            .iter()
            .map(|tx| tx.get_id().to_string())
            .collect();
        Self::new(&ids)
    }

    pub fn root(&self) -> &str {
        self.layers
            .last()
            .and_then(|layer| layer.first())
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn leaf_count(&self) -> usize {
        self.layers.first().map(Vec::len).unwrap_or(0)
    }

    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    pub fn proof(&self, index: usize) -> Result<MerkleProof> {
        let leaf_count = self.leaf_count();
        if index >= leaf_count {
            return Err(BlockchainError::Merkle(format!(
                "Leaf index {index} out of bounds (leaf count: {leaf_count})"
            )));
        }

        let mut path = Vec::with_capacity(self.depth());
        let mut position = index;
        for layer in &self.layers[..self.depth()] {
            let sibling = if position % 2 == 0 {
                layer.get(position + 1).unwrap_or(&layer[position])
            } else {
                &layer[position - 1]
            };
            path.push(ProofElement {
                hash: sibling.clone(),
                is_right: position % 2 == 0,
            });
            position /= 2;
        }

        Ok(MerkleProof {
            leaf: self.layers[0][index].clone(),
            index,
            path,
        })
    }
}

impl MerkleProof {
    pub fn verify(&self, root: &str) -> Result<bool> {
        let mut current = self.leaf.clone();
        for element in &self.path {
            current = if element.is_right {
                hash_pair(&current, &element.hash)?
            } else {
                hash_pair(&element.hash, &current)?
            };
        }
        Ok(current == root)
    }
}

/// Root of the tree over `leaves`.
pub fn merkle_root(leaves: &[String]) -> Result<String> {
    Ok(MerkleTree::new(leaves)?.root().to_string())
}

fn decode_digest(digest: &str) -> Result<Vec<u8>> {
    hex::decode(digest).map_err(|e| BlockchainError::Merkle(format!("Invalid digest {digest}: {e}")))
}

/// Parent digest of two children, both in little-endian hex.
pub fn hash_pair(left: &str, right: &str) -> Result<String> {
    let mut combined = decode_digest(left)?;
    combined.reverse();
    let mut right_bytes = decode_digest(right)?;
    right_bytes.reverse();
    combined.extend(right_bytes);

    let mut parent = double_sha256(&combined);
    parent.reverse();
    Ok(hex::encode(parent))
}
