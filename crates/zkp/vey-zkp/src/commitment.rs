//! Commitment construction shared by the proof patterns. Every
//! commitment is a domain-separated digest salted with a caller-supplied
//! nonce, so equal private values commit differently across proofs.

use chrono::NaiveDate;
use serde_json::Value;

use vey_core_types::{Did, Pid};
use vey_crypto::domain;
use vey_crypto::hash::{digest, digest_parts, Digest32};
use vey_crypto::merkle::{leaf_hash, MerkleTree};
use vey_crypto::rng::Nonce;
use vey_types::address::{AddressField, NormalizedAddress};
use vey_types::resume::Skill;

use vey_identity_core::canonical::canonical_json;

/// Bind a commitment to a Merkle leaf hash. Used by membership proofs:
/// the commitment proves knowledge of the leaf without naming it.
pub fn leaf_commitment(leaf: &Digest32, nonce: &Nonce) -> Digest32 {
    digest_parts(domain::PID_COMMIT, &[leaf, nonce])
}

/// The leaf-bound commitment for a PID.
pub fn pid_commitment(pid: &Pid, nonce: &Nonce) -> Digest32 {
    leaf_commitment(&leaf_hash(pid.as_str().as_bytes()), nonce)
}

/// Commitment to a single hidden segment token.
pub fn segment_commitment(segment: &str, nonce: &Nonce) -> Digest32 {
    digest_parts(domain::PID_COMMIT, &[segment.as_bytes(), nonce])
}

/// Leaf digest for one address field. Absent fields commit to the empty
/// string so the leaf vector always covers the full fixed field set.
pub fn address_field_leaf(field: AddressField, value: &str, nonce: &Nonce) -> Digest32 {
    digest_parts(domain::ADDR_FIELD, &[field.name().as_bytes(), value.as_bytes(), nonce])
}

/// The full-address commitment: a Merkle root over one leaf per field of
/// the fixed semantic field set, in [`AddressField::ALL`] order. Returns
/// the root and the leaf vector (the prover ships the leaves so a
/// verifier can re-derive the root around revealed fields).
pub fn address_commitment(
    address: &NormalizedAddress,
    nonce: &Nonce,
) -> (Digest32, Vec<Digest32>) {
    let leaves: Vec<Digest32> = AddressField::ALL
        .iter()
        .map(|field| address_field_leaf(*field, address.get(*field).unwrap_or(""), nonce))
        .collect();
    let root = MerkleTree::from_leaf_hashes(leaves.clone()).root();
    (root, leaves)
}

/// Leaf digest for one résumé field; values are canonical JSON so
/// derived fields (arrays, numbers) commit deterministically.
pub fn resume_field_leaf(name: &str, value: &Value, nonce: &Nonce) -> Digest32 {
    digest_parts(
        domain::RESUME_FIELD,
        &[name.as_bytes(), canonical_json(value).as_bytes(), nonce],
    )
}

/// Opaque hash of a DID, carried in artifacts instead of the DID itself.
pub fn did_hash(did: &Did) -> Digest32 {
    digest(domain::DID_HASH, did.as_str().as_bytes())
}

/// The canonical binding of a user to an old and new PID plus the prior
/// credential fingerprint. Version proofs carry this as the ownership
/// commitment.
pub fn ownership_commitment(
    user_did_hash: &Digest32,
    old_pid: &Pid,
    new_pid: &Pid,
    credential_fingerprint: &Digest32,
) -> Digest32 {
    digest_parts(
        domain::OWNER_BIND,
        &[
            user_did_hash,
            old_pid.as_str().as_bytes(),
            new_pid.as_str().as_bytes(),
            credential_fingerprint,
        ],
    )
}

/// Commitment to an employment period. Open-ended employment commits the
/// empty string in the end slot.
pub fn period_commitment(start: NaiveDate, end: Option<NaiveDate>, nonce: &Nonce) -> Digest32 {
    let start = start.to_string();
    let end = end.map(|d| d.to_string()).unwrap_or_default();
    digest_parts(domain::PERIOD_COMMIT, &[start.as_bytes(), end.as_bytes(), nonce])
}

/// Commitment to a complete skill list. Skills are committed in source
/// order; the prover's filter runs over the committed list.
pub fn skillset_commitment(skills: &[Skill], nonce: &Nonce) -> Digest32 {
    let mut parts: Vec<Vec<u8>> = Vec::with_capacity(skills.len() * 4 + 1);
    for skill in skills {
        parts.push(skill.name.as_bytes().to_vec());
        parts.push(skill.category.as_bytes().to_vec());
        parts.push(vec![skill.proficiency]);
        parts.push(skill.years_of_experience.to_le_bytes().to_vec());
    }
    parts.push(nonce.to_vec());
    let part_refs: Vec<&[u8]> = parts.iter().map(Vec::as_slice).collect();
    digest_parts(domain::SKILLSET_COMMIT, &part_refs)
}
