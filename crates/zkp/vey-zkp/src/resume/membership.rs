//! Résumé membership proof: an employment record's verifier organization
//! belongs to a verified-organizations Merkle set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use vey_core_types::Did;
use vey_crypto::encoding::{self, b64_digest};
use vey_crypto::hash::Digest32;
use vey_crypto::merkle::{MerkleProof, MerkleTree};
use vey_crypto::rng::{random_nonce, Nonce};
use vey_types::resume::Employment;

use crate::artifact::{expect_pattern, ProofPattern, ZkProof};
use crate::circuit::ZkCircuit;
use crate::commitment::period_commitment;
use crate::error::ZkpError;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ResumeMembershipProof {
    /// Root of the verified-organizations set.
    #[serde(rename = "setRoot", with = "b64_digest")]
    pub set_root: Digest32,
    #[serde(rename = "positionLevel")]
    pub position_level: u8,
    /// Commitment to the employment period; the dates stay hidden.
    #[serde(rename = "periodCommitment", with = "b64_digest")]
    pub period_commitment: Digest32,
    #[serde(with = "b64_digest")]
    pub nonce: Nonce,
    /// Backend witness: the Merkle path for the verifier organization.
    pub path: MerkleProof,
}

/// Prove that `employment` was verified by an organization in
/// `verified_orgs`. Records without a verifier DID are rejected.
pub fn prove_resume_membership(
    employment: &Employment,
    verified_orgs: &[Did],
    circuit: &ZkCircuit,
    now: DateTime<Utc>,
) -> Result<ZkProof, ZkpError> {
    let verifier = employment
        .verifier_did
        .as_ref()
        .ok_or(ZkpError::MissingVerifierDid)?;

    let index = verified_orgs
        .iter()
        .position(|org| org == verifier)
        .ok_or(ZkpError::MembershipNotFound)?;

    let leaves: Vec<&[u8]> = verified_orgs.iter().map(|d| d.as_str().as_bytes()).collect();
    let tree = MerkleTree::build(&leaves);
    let path = tree.prove(index).map_err(vey_crypto::CryptoError::from)?;

    let nonce = random_nonce()?;
    let commitment = period_commitment(employment.start_date, employment.end_date, &nonce);

    let mut public_inputs = BTreeMap::new();
    public_inputs.insert("setRoot".to_string(), encoding::encode(&tree.root()).into());
    public_inputs.insert("positionLevel".to_string(), employment.position_level.into());
    public_inputs.insert(
        "periodCommitment".to_string(),
        encoding::encode(&commitment).into(),
    );

    Ok(ZkProof::new(
        circuit,
        now,
        ProofPattern::ResumeMembership(ResumeMembershipProof {
            set_root: tree.root(),
            position_level: employment.position_level,
            period_commitment: commitment,
            nonce,
            path,
        }),
        public_inputs,
    ))
}

/// Verify a résumé membership artifact against the expected set root.
pub fn verify_resume_membership(
    proof: &ZkProof,
    circuit: &ZkCircuit,
    expected_root: &Digest32,
) -> Result<(), ZkpError> {
    circuit.ensure_matches(&proof.circuit_id)?;
    let payload = expect_pattern!(proof, ResumeMembership)?;

    if payload.set_root != *expected_root || !payload.path.verify_against(expected_root) {
        return Err(ZkpError::ProofRejected(
            "organization path does not reconstruct the set root".to_string(),
        ));
    }
    Ok(())
}
