//! Membership proof: the hidden PID is a leaf of a public Merkle tree
//! over an issuer's accepted PID set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use tracing::warn;

use vey_core_types::Pid;
use vey_crypto::encoding::{self, b64_digest};
use vey_crypto::hash::Digest32;
use vey_crypto::merkle::{MerkleProof, MerkleTree};
use vey_crypto::rng::{random_nonce, Nonce};

use crate::artifact::{expect_pattern, ProofPattern, ZkProof};
use crate::circuit::ZkCircuit;
use crate::commitment::leaf_commitment;
use crate::error::ZkpError;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MembershipProof {
    /// Root of the issuer's accepted-PID set.
    #[serde(rename = "merkleRoot", with = "b64_digest")]
    pub merkle_root: Digest32,
    /// Commitment binding the proof to the hidden leaf.
    #[serde(rename = "leafCommitment", with = "b64_digest")]
    pub leaf_commitment: Digest32,
    #[serde(with = "b64_digest")]
    pub nonce: Nonce,
    /// Backend witness: the Merkle path over hashed leaves.
    pub path: MerkleProof,
}

/// Prove that `pid` belongs to `set`. If the PID appears at several
/// indices, any one is proven.
pub fn prove_membership(
    pid: &Pid,
    set: &[Pid],
    circuit: &ZkCircuit,
    now: DateTime<Utc>,
) -> Result<ZkProof, ZkpError> {
    let index = set
        .iter()
        .position(|candidate| candidate == pid)
        .ok_or(ZkpError::MembershipNotFound)?;

    let leaves: Vec<&[u8]> = set.iter().map(|p| p.as_str().as_bytes()).collect();
    let tree = MerkleTree::build(&leaves);
    let path = tree.prove(index).map_err(vey_crypto::CryptoError::from)?;

    let nonce = random_nonce()?;
    let commitment = leaf_commitment(&path.leaf_hash, &nonce);

    let mut public_inputs = BTreeMap::new();
    public_inputs.insert("merkleRoot".to_string(), encoding::encode(&tree.root()).into());
    public_inputs.insert("leafCommitment".to_string(), encoding::encode(&commitment).into());

    Ok(ZkProof::new(
        circuit,
        now,
        ProofPattern::Membership(MembershipProof {
            merkle_root: tree.root(),
            leaf_commitment: commitment,
            nonce,
            path,
        }),
        public_inputs,
    ))
}

/// Verify a membership artifact against the verifier's circuit and the
/// expected set root.
pub fn verify_membership(
    proof: &ZkProof,
    circuit: &ZkCircuit,
    expected_root: &Digest32,
) -> Result<(), ZkpError> {
    circuit.ensure_matches(&proof.circuit_id)?;
    let payload = expect_pattern!(proof, Membership)?;

    if payload.merkle_root != *expected_root {
        warn!(circuit = %proof.circuit_id, "membership proof root mismatch");
        return Err(ZkpError::ProofRejected("Merkle root mismatch".to_string()));
    }
    if !payload.path.verify_against(expected_root) {
        return Err(ZkpError::ProofRejected(
            "Merkle path does not reconstruct the root".to_string(),
        ));
    }
    if leaf_commitment(&payload.path.leaf_hash, &payload.nonce) != payload.leaf_commitment {
        return Err(ZkpError::ProofRejected(
            "commitment does not bind the claimed leaf".to_string(),
        ));
    }
    Ok(())
}
