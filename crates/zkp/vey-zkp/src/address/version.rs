//! Version proof: the user who owned `oldPid` is now identified by
//! `newPid`, and the migration is recorded in the issuer's current
//! signed revocation list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use vey_core_types::{Did, Pid};
use vey_crypto::encoding::{self, b64_digest};
use vey_crypto::hash::Digest32;
use vey_identity_core::revocation::{RevocationList, RevocationReason};

use crate::artifact::{expect_pattern, ProofPattern, ZkProof};
use crate::circuit::ZkCircuit;
use crate::commitment::{did_hash, ownership_commitment};
use crate::error::ZkpError;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VersionProof {
    #[serde(rename = "oldPid")]
    pub old_pid: Pid,
    #[serde(rename = "newPid")]
    pub new_pid: Pid,
    #[serde(rename = "migrationTimestamp")]
    pub migration_timestamp: DateTime<Utc>,
    /// Canonical binding of the hidden user DID to both PIDs and the
    /// prior credential.
    #[serde(rename = "ownershipCommitment", with = "b64_digest")]
    pub ownership_commitment: Digest32,
    /// Backend witness: opaque digest of the user DID.
    #[serde(rename = "userDidHash", with = "b64_digest")]
    pub user_did_hash: Digest32,
    /// Backend witness: fingerprint of the prior address credential.
    #[serde(rename = "credentialFingerprint", with = "b64_digest")]
    pub credential_fingerprint: Digest32,
}

/// Generate a version proof binding `user_did` to the migration.
pub fn prove_version(
    user_did: &Did,
    old_pid: &Pid,
    new_pid: &Pid,
    migration_timestamp: DateTime<Utc>,
    credential_fingerprint: &Digest32,
    circuit: &ZkCircuit,
    now: DateTime<Utc>,
) -> Result<ZkProof, ZkpError> {
    let user_did_hash = did_hash(user_did);
    let commitment =
        ownership_commitment(&user_did_hash, old_pid, new_pid, credential_fingerprint);

    let mut public_inputs = BTreeMap::new();
    public_inputs.insert("oldPid".to_string(), old_pid.as_str().into());
    public_inputs.insert("newPid".to_string(), new_pid.as_str().into());
    public_inputs.insert(
        "migrationTimestamp".to_string(),
        migration_timestamp.to_rfc3339().into(),
    );
    public_inputs.insert(
        "ownershipCommitment".to_string(),
        encoding::encode(&commitment).into(),
    );

    Ok(ZkProof::new(
        circuit,
        now,
        ProofPattern::Version(VersionProof {
            old_pid: old_pid.clone(),
            new_pid: new_pid.clone(),
            migration_timestamp,
            ownership_commitment: commitment,
            user_did_hash,
            credential_fingerprint: *credential_fingerprint,
        }),
        public_inputs,
    ))
}

/// Verify a version proof against the current signed revocation list.
/// Callers must fetch the latest list before calling.
pub fn verify_version(
    proof: &ZkProof,
    circuit: &ZkCircuit,
    list: &RevocationList,
) -> Result<(), ZkpError> {
    circuit.ensure_matches(&proof.circuit_id)?;
    let payload = expect_pattern!(proof, Version)?;

    let entry = list
        .entry(&payload.old_pid)
        .ok_or(ZkpError::OldPidNotRevoked)?;
    if entry.reason != RevocationReason::AddressChange
        || entry.new_pid.as_ref() != Some(&payload.new_pid)
    {
        return Err(ZkpError::NoMigration);
    }

    let expected = ownership_commitment(
        &payload.user_did_hash,
        &payload.old_pid,
        &payload.new_pid,
        &payload.credential_fingerprint,
    );
    if expected != payload.ownership_commitment {
        return Err(ZkpError::ProofRejected(
            "ownership commitment does not bind the migration".to_string(),
        ));
    }

    if payload.migration_timestamp < entry.revoked_at {
        return Err(ZkpError::ProofRejected(
            "migration predates the revocation entry".to_string(),
        ));
    }

    if list.is_revoked(&payload.new_pid) {
        return Err(ZkpError::NewPidRevoked);
    }
    Ok(())
}
