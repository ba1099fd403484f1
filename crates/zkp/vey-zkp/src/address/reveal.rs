//! Selective-reveal proof: a subset of fields of a committed address
//! take specific revealed values; the rest stay behind opaque leaf
//! hashes that re-derive the same commitment root.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use vey_crypto::encoding::{self, b64_digest, b64_digest_list};
use vey_crypto::hash::Digest32;
use vey_crypto::merkle::MerkleTree;
use vey_crypto::rng::{random_nonce, Nonce};
use vey_types::address::{AddressField, NormalizedAddress};

use crate::artifact::{expect_pattern, ProofPattern, ZkProof};
use crate::circuit::ZkCircuit;
use crate::commitment::{address_commitment, address_field_leaf};
use crate::error::ZkpError;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SelectiveRevealProof {
    /// Merkle root over all field leaves of the committed address.
    #[serde(rename = "addressCommitment", with = "b64_digest")]
    pub address_commitment: Digest32,
    /// Field names the prover chose to open.
    #[serde(rename = "revealedFields")]
    pub revealed_fields: Vec<String>,
    /// Opened values. Fields absent from the source address reveal the
    /// empty string; that is the documented behavior, not an error.
    #[serde(rename = "revealedValues")]
    pub revealed_values: BTreeMap<String, String>,
    /// Fresh per-proof nonce salting every leaf.
    #[serde(rename = "disclosureNonce", with = "b64_digest")]
    pub disclosure_nonce: Nonce,
    /// One leaf per field of the fixed field set, in canonical order.
    /// Leaves of non-revealed fields stay opaque.
    #[serde(rename = "fieldLeaves", with = "b64_digest_list")]
    pub field_leaves: Vec<Digest32>,
}

/// Prove the values of `reveal` fields for a committed address.
pub fn prove_selective_reveal(
    address: &NormalizedAddress,
    reveal: &[&str],
    circuit: &ZkCircuit,
    now: DateTime<Utc>,
) -> Result<ZkProof, ZkpError> {
    let nonce = random_nonce()?;
    let (root, field_leaves) = address_commitment(address, &nonce);

    let mut revealed_values = BTreeMap::new();
    for name in reveal {
        let value = AddressField::from_name(name)
            .and_then(|field| address.get(field))
            .unwrap_or("");
        revealed_values.insert(name.to_string(), value.to_string());
    }

    let mut public_inputs = BTreeMap::new();
    public_inputs.insert("addressCommitment".to_string(), encoding::encode(&root).into());
    public_inputs.insert(
        "revealedFields".to_string(),
        serde_json::to_value(reveal).map_err(|e| ZkpError::ProofMalformed(e.to_string()))?,
    );

    Ok(ZkProof::new(
        circuit,
        now,
        ProofPattern::SelectiveReveal(SelectiveRevealProof {
            address_commitment: root,
            revealed_fields: reveal.iter().map(|s| s.to_string()).collect(),
            revealed_values,
            disclosure_nonce: nonce,
            field_leaves,
        }),
        public_inputs,
    ))
}

/// Verify a selective-reveal artifact: every revealed value re-hashes to
/// its leaf, and the full leaf vector re-derives the declared commitment.
pub fn verify_selective_reveal(proof: &ZkProof, circuit: &ZkCircuit) -> Result<(), ZkpError> {
    circuit.ensure_matches(&proof.circuit_id)?;
    let payload = expect_pattern!(proof, SelectiveReveal)?;

    if payload.field_leaves.len() != AddressField::ALL.len() {
        return Err(ZkpError::ProofMalformed(format!(
            "expected {} field leaves, got {}",
            AddressField::ALL.len(),
            payload.field_leaves.len()
        )));
    }

    for name in &payload.revealed_fields {
        let value = payload
            .revealed_values
            .get(name)
            .ok_or_else(|| ZkpError::ProofMalformed(format!("no value for revealed field {name}")))?;
        match AddressField::from_name(name) {
            Some(field) => {
                let index = AddressField::ALL
                    .iter()
                    .position(|f| f == &field)
                    .expect("field set is fixed");
                let leaf = address_field_leaf(field, value, &payload.disclosure_nonce);
                if leaf != payload.field_leaves[index] {
                    return Err(ZkpError::ProofRejected(format!(
                        "revealed value for {name} does not match the commitment"
                    )));
                }
            }
            // A name outside the fixed field set can only reveal emptiness.
            None if value.is_empty() => {}
            None => {
                return Err(ZkpError::ProofRejected(format!(
                    "unknown field {name} cannot reveal a value"
                )))
            }
        }
    }

    let root = MerkleTree::from_leaf_hashes(payload.field_leaves.clone()).root();
    if root != payload.address_commitment {
        return Err(ZkpError::ProofRejected(
            "field leaves do not derive the declared commitment".to_string(),
        ));
    }
    Ok(())
}
