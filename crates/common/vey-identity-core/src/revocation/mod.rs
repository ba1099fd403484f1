use chrono::{DateTime, Utc};
use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use vey_core_types::{Did, DidKey, Pid};
use vey_crypto::domain;
use vey_crypto::encoding;
use vey_crypto::signing;

use crate::canonical::{canonical_form_with, CanonicalError};
use crate::vc::{Proof, ED25519_SIGNATURE_2020, PROOF_PURPOSE_ASSERTION};

pub mod storage;

/// Errors related to revocation entries and lists.
#[derive(Error, Debug)]
pub enum RevocationError {
    #[error("Entry for {pid} with reason {reason:?} must not carry a new PID")]
    UnexpectedNewPid { pid: Pid, reason: RevocationReason },
    #[error("Entry for {0} with reason address_change requires a new PID")]
    MissingNewPid(Pid),
    #[error("New PID must differ from the revoked PID: {0}")]
    NewPidEqualsOld(Pid),
    #[error("Successor list must be created after {0}")]
    CreatedAtNotIncreasing(DateTime<Utc>),
    #[error("List has no proof block")]
    MissingProof,
    #[error("List signature verification failed")]
    SignatureInvalid,
    #[error("Invalid proof value encoding: {0}")]
    InvalidProofEncoding(String),
    #[error("Canonicalization error: {0}")]
    Canonical(#[from] CanonicalError),
}

/// Why a PID was revoked. `address_change` is the only reason that
/// carries a successor PID.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RevocationReason {
    AddressChange,
    UserRequest,
    Compromise,
    Expired,
    Administrative,
}

/// One revocation record.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RevocationEntry {
    pub pid: Pid,
    #[serde(rename = "revokedAt")]
    pub revoked_at: DateTime<Utc>,
    pub reason: RevocationReason,
    #[serde(rename = "newPid", skip_serializing_if = "Option::is_none")]
    pub new_pid: Option<Pid>,
}

impl RevocationEntry {
    /// Create an entry, enforcing the `new_pid` invariant: present iff
    /// the reason is `address_change`, and then different from `pid`.
    pub fn new(
        pid: Pid,
        revoked_at: DateTime<Utc>,
        reason: RevocationReason,
        new_pid: Option<Pid>,
    ) -> Result<Self, RevocationError> {
        match (&reason, &new_pid) {
            (RevocationReason::AddressChange, None) => {
                return Err(RevocationError::MissingNewPid(pid))
            }
            (RevocationReason::AddressChange, Some(new)) if *new == pid => {
                return Err(RevocationError::NewPidEqualsOld(pid))
            }
            (RevocationReason::AddressChange, Some(_)) => {}
            (_, Some(_)) => {
                return Err(RevocationError::UnexpectedNewPid { pid, reason })
            }
            (_, None) => {}
        }
        Ok(RevocationEntry { pid, revoked_at, reason, new_pid })
    }
}

/// A signed revocation list. Lists are versioned: the seed list has
/// version 1 and every successor bumps it by one with a strictly later
/// `createdAt`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RevocationList {
    pub issuer: Did,
    pub version: u64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub entries: Vec<RevocationEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

impl RevocationList {
    /// A fresh seed list at version 1.
    pub fn new(issuer: Did, created_at: DateTime<Utc>) -> Self {
        RevocationList { issuer, version: 1, created_at, entries: Vec::new(), proof: None }
    }

    /// A successor list carrying this list's entries at `version + 1`.
    /// `created_at` must strictly increase.
    pub fn successor(&self, created_at: DateTime<Utc>) -> Result<Self, RevocationError> {
        if created_at <= self.created_at {
            return Err(RevocationError::CreatedAtNotIncreasing(self.created_at));
        }
        Ok(RevocationList {
            issuer: self.issuer.clone(),
            version: self.version + 1,
            created_at,
            entries: self.entries.clone(),
            proof: None,
        })
    }

    /// Add an entry. A later entry for the same PID replaces the earlier
    /// one; entries are kept ordered by `(revokedAt, pid)`. Mutation
    /// invalidates any existing proof.
    pub fn revoke(&mut self, entry: RevocationEntry) {
        self.entries.retain(|e| e.pid != entry.pid);
        self.entries.push(entry);
        self.entries
            .sort_by(|a, b| a.revoked_at.cmp(&b.revoked_at).then_with(|| a.pid.cmp(&b.pid)));
        self.proof = None;
    }

    pub fn entry(&self, pid: &Pid) -> Option<&RevocationEntry> {
        self.entries.iter().find(|e| &e.pid == pid)
    }

    pub fn is_revoked(&self, pid: &Pid) -> bool {
        self.entry(pid).is_some()
    }

    /// The successor PID recorded for a migrated PID, if any.
    pub fn new_pid(&self, pid: &Pid) -> Option<&Pid> {
        self.entry(pid).and_then(|e| e.new_pid.as_ref())
    }

    /// The canonical signing input: the list minus its proof block, under
    /// the revocation-list domain tag.
    pub fn signing_input(&self) -> Result<Vec<u8>, RevocationError> {
        let mut unsigned = self.clone();
        unsigned.proof = None;
        Ok(canonical_form_with(domain::LIST_CANONICAL, &unsigned)?)
    }

    /// Sign the list with the issuer key.
    pub fn sign(
        mut self,
        signing_key: &DidKey,
        verification_method: &str,
        created: DateTime<Utc>,
    ) -> Result<Self, RevocationError> {
        let input = self.signing_input()?;
        let signature = signing_key.sign(&input);
        self.proof = Some(Proof {
            type_: ED25519_SIGNATURE_2020.to_string(),
            created,
            verification_method: verification_method.to_string(),
            proof_purpose: PROOF_PURPOSE_ASSERTION.to_string(),
            proof_value: encoding::encode(&signature.to_bytes()),
        });
        info!(
            issuer = %self.issuer,
            version = self.version,
            entries = self.entries.len(),
            "signed revocation list"
        );
        Ok(self)
    }

    /// Verify the list signature against the issuer's public key.
    pub fn verify(&self, public_key: &VerifyingKey) -> Result<(), RevocationError> {
        let proof = self.proof.as_ref().ok_or(RevocationError::MissingProof)?;
        let signature_bytes = encoding::decode(&proof.proof_value)
            .map_err(|e| RevocationError::InvalidProofEncoding(e.to_string()))?;
        let input = self.signing_input()?;
        signing::verify(public_key, &input, &signature_bytes)
            .map_err(|_| RevocationError::SignatureInvalid)
    }

    /// Verify a fetched list, resolving the proof's verification method
    /// through the keystore. Clients call this before consuming a list.
    pub async fn verify_resolved(
        &self,
        keystore: &dyn crate::keystore::Keystore,
    ) -> Result<(), RevocationError> {
        let proof = self.proof.as_ref().ok_or(RevocationError::MissingProof)?;
        let (did_str, fragment) = proof
            .verification_method
            .split_once('#')
            .ok_or(RevocationError::SignatureInvalid)?;
        let did = Did::parse(did_str).map_err(|_| RevocationError::SignatureInvalid)?;
        let public_key = keystore
            .public_key(&did, fragment)
            .await
            .map_err(|_| RevocationError::SignatureInvalid)?;
        self.verify(&public_key)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
