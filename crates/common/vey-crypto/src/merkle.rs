use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain;
use crate::encoding::{b64_digest, b64_opt_digest_list};
use crate::hash::{digest, digest_parts, Digest32, EMPTY_DIGEST};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MerkleError {
    #[error("Leaf index {index} out of bounds for tree of {len} leaves")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("Cannot prove against an empty tree")]
    EmptyTree,
}

/// A binary Merkle tree over pre-hashed leaves. Parents are
/// `H(left || right)` with the left index first; for odd fan-out the lone
/// node is promoted unchanged. Leaf and node hashes are domain-separated.
#[derive(Debug, Clone, PartialEq)]
pub struct MerkleTree {
    /// levels[0] holds the leaf hashes; the last level holds the root.
    levels: Vec<Vec<Digest32>>,
}

/// An inclusion proof: the hashed leaf, its index, the sibling list from
/// the bottom up (`None` where the node was promoted), and the expected
/// root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerkleProof {
    #[serde(with = "b64_digest")]
    pub leaf_hash: Digest32,
    pub index: u64,
    #[serde(with = "b64_opt_digest_list")]
    pub siblings: Vec<Option<Digest32>>,
    #[serde(with = "b64_digest")]
    pub root: Digest32,
}

/// Hash a raw leaf value into the tree's leaf domain.
pub fn leaf_hash(leaf: &[u8]) -> Digest32 {
    digest(domain::MERKLE_LEAF, leaf)
}

fn node_hash(left: &Digest32, right: &Digest32) -> Digest32 {
    digest_parts(domain::MERKLE_NODE, &[left, right])
}

impl MerkleTree {
    /// Build a tree over raw leaf values; each leaf is hashed into the
    /// leaf domain first.
    pub fn build<L: AsRef<[u8]>>(leaves: &[L]) -> Self {
        Self::from_leaf_hashes(leaves.iter().map(|l| leaf_hash(l.as_ref())).collect())
    }

    /// Build a tree over already-hashed leaves.
    pub fn from_leaf_hashes(leaf_hashes: Vec<Digest32>) -> Self {
        let mut levels = vec![leaf_hashes];
        while levels.last().map(Vec::len).unwrap_or(0) > 1 {
            let current = levels.last().expect("levels is never empty");
            let mut next = Vec::with_capacity((current.len() + 1) / 2);
            for chunk in current.chunks(2) {
                if chunk.len() == 2 {
                    next.push(node_hash(&chunk[0], &chunk[1]));
                } else {
                    // Odd fan-out: promote the lone node unchanged.
                    next.push(chunk[0]);
                }
            }
            levels.push(next);
        }
        MerkleTree { levels }
    }

    pub fn len(&self) -> usize {
        self.levels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels[0].is_empty()
    }

    /// The tree root; the all-zero digest for an empty leaf set.
    pub fn root(&self) -> Digest32 {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or(EMPTY_DIGEST)
    }

    /// Produce an inclusion proof for the leaf at `index`.
    pub fn prove(&self, index: usize) -> Result<MerkleProof, MerkleError> {
        if self.is_empty() {
            return Err(MerkleError::EmptyTree);
        }
        if index >= self.len() {
            return Err(MerkleError::IndexOutOfBounds { index, len: self.len() });
        }

        let mut siblings = Vec::with_capacity(self.levels.len() - 1);
        let mut i = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_index = i ^ 1;
            siblings.push(level.get(sibling_index).copied());
            i /= 2;
        }

        Ok(MerkleProof {
            leaf_hash: self.levels[0][index],
            index: index as u64,
            siblings,
            root: self.root(),
        })
    }
}

impl MerkleProof {
    /// Recompute the root from the sibling path, starting at the hashed
    /// leaf. Returns true iff the reconstruction matches `expected_root`.
    pub fn verify_against(&self, expected_root: &Digest32) -> bool {
        if self.root != *expected_root {
            return false;
        }
        let mut current = self.leaf_hash;
        let mut index = self.index;
        for sibling in &self.siblings {
            current = match sibling {
                Some(sibling) if index % 2 == 0 => node_hash(&current, sibling),
                Some(sibling) => node_hash(sibling, &current),
                // Promoted lone node.
                None => current,
            };
            index /= 2;
        }
        current == *expected_root
    }

    /// Verify that a raw leaf value sits behind this proof.
    pub fn verify_leaf(&self, leaf: &[u8], expected_root: &Digest32) -> bool {
        leaf_hash(leaf) == self.leaf_hash && self.verify_against(expected_root)
    }
}

/// Convenience form of the verify contract: leaf value, index, path, root.
pub fn verify(
    leaf: &[u8],
    index: u64,
    siblings: &[Option<Digest32>],
    root: &Digest32,
) -> bool {
    let proof = MerkleProof {
        leaf_hash: leaf_hash(leaf),
        index,
        siblings: siblings.to_vec(),
        root: *root,
    };
    proof.verify_against(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_leaves(n: usize) -> Vec<Vec<u8>> {
        (0..n).map(|i| format!("JP-13-{:03}", i).into_bytes()).collect()
    }

    #[test]
    fn empty_tree_has_zero_root() {
        let tree = MerkleTree::build::<Vec<u8>>(&[]);
        assert_eq!(tree.root(), EMPTY_DIGEST);
        assert!(matches!(tree.prove(0), Err(MerkleError::EmptyTree)));
    }

    #[test]
    fn single_leaf_root_is_leaf_hash() {
        let tree = MerkleTree::build(&[b"JP-13-113-01"]);
        assert_eq!(tree.root(), leaf_hash(b"JP-13-113-01"));
        let proof = tree.prove(0).unwrap();
        assert!(proof.verify_leaf(b"JP-13-113-01", &tree.root()));
    }

    #[test]
    fn all_leaves_prove_even_and_odd_fanout() {
        for n in [2usize, 3, 4, 5, 7, 8, 9] {
            let leaves = sample_leaves(n);
            let tree = MerkleTree::build(&leaves);
            for (i, leaf) in leaves.iter().enumerate() {
                let proof = tree.prove(i).unwrap();
                assert!(proof.verify_leaf(leaf, &tree.root()), "n={} i={}", n, i);
            }
        }
    }

    #[test]
    fn tampered_proofs_fail() {
        let leaves = sample_leaves(5);
        let tree = MerkleTree::build(&leaves);
        let root = tree.root();

        // Wrong leaf value.
        let proof = tree.prove(2).unwrap();
        assert!(!proof.verify_leaf(b"JP-13-999", &root));

        // Wrong index.
        let mut proof = tree.prove(2).unwrap();
        proof.index = 3;
        assert!(!proof.verify_against(&root));

        // Corrupted sibling.
        let mut proof = tree.prove(2).unwrap();
        if let Some(first) = proof.siblings[0].as_mut() {
            first[0] ^= 0xff;
        }
        assert!(!proof.verify_against(&root));

        // Wrong root.
        let proof = tree.prove(2).unwrap();
        let other_root = MerkleTree::build(&sample_leaves(6)).root();
        assert!(!proof.verify_against(&other_root));
    }

    #[test]
    fn proof_serde_round_trip() {
        let tree = MerkleTree::build(&sample_leaves(3));
        let proof = tree.prove(2).unwrap();
        let json = serde_json::to_string(&proof).unwrap();
        let back: MerkleProof = serde_json::from_str(&json).unwrap();
        assert_eq!(proof, back);
        assert!(back.verify_against(&tree.root()));
    }
}
