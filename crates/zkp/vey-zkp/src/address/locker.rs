//! Locker proof: a hidden locker id belongs to the locker set of a
//! declared facility (and optional zone).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use vey_crypto::encoding::{self, b64_digest};
use vey_crypto::hash::Digest32;
use vey_crypto::merkle::{MerkleProof, MerkleTree};

use crate::artifact::{expect_pattern, ProofPattern, ZkProof};
use crate::circuit::ZkCircuit;
use crate::error::ZkpError;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LockerProof {
    #[serde(rename = "facilityId")]
    pub facility_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    /// Root over the facility's locker set.
    #[serde(rename = "setRoot", with = "b64_digest")]
    pub set_root: Digest32,
    /// Backend witness: the Merkle path for the hidden locker id.
    pub path: MerkleProof,
}

/// Prove that `locker_id` is one of `lockers` at `facility_id`.
pub fn prove_locker(
    locker_id: &str,
    lockers: &[String],
    facility_id: &str,
    zone: Option<&str>,
    circuit: &ZkCircuit,
    now: DateTime<Utc>,
) -> Result<ZkProof, ZkpError> {
    let index = lockers
        .iter()
        .position(|candidate| candidate == locker_id)
        .ok_or(ZkpError::MembershipNotFound)?;

    let tree = MerkleTree::build(lockers);
    let path = tree.prove(index).map_err(vey_crypto::CryptoError::from)?;

    let mut public_inputs = BTreeMap::new();
    public_inputs.insert("facilityId".to_string(), facility_id.into());
    if let Some(zone) = zone {
        public_inputs.insert("zone".to_string(), zone.into());
    }
    public_inputs.insert("setRoot".to_string(), encoding::encode(&tree.root()).into());

    Ok(ZkProof::new(
        circuit,
        now,
        ProofPattern::Locker(LockerProof {
            facility_id: facility_id.to_string(),
            zone: zone.map(str::to_string),
            set_root: tree.root(),
            path,
        }),
        public_inputs,
    ))
}

/// Verify a locker artifact against the verifier's facility (and zone)
/// and the expected locker-set root.
pub fn verify_locker(
    proof: &ZkProof,
    circuit: &ZkCircuit,
    facility_id: &str,
    zone: Option<&str>,
    expected_root: &Digest32,
) -> Result<(), ZkpError> {
    circuit.ensure_matches(&proof.circuit_id)?;
    let payload = expect_pattern!(proof, Locker)?;

    if payload.facility_id != facility_id {
        return Err(ZkpError::ProofRejected(format!(
            "facility mismatch: expected {facility_id}, got {}",
            payload.facility_id
        )));
    }
    if payload.zone.as_deref() != zone {
        return Err(ZkpError::ProofRejected("zone mismatch".to_string()));
    }
    if payload.set_root != *expected_root || !payload.path.verify_against(expected_root) {
        return Err(ZkpError::ProofRejected(
            "locker path does not reconstruct the set root".to_string(),
        ));
    }
    Ok(())
}
