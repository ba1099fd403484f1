//! Résumé selective-reveal proof, including the derived fields
//! `totalYearsExperience`, `employmentCount` and `topSkills`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use vey_crypto::encoding::{self, b64_digest, b64_digest_list};
use vey_crypto::hash::Digest32;
use vey_crypto::merkle::MerkleTree;
use vey_crypto::rng::{random_nonce, Nonce};
use vey_types::resume::ResumeData;

use crate::artifact::{expect_pattern, ProofPattern, ZkProof};
use crate::circuit::ZkCircuit;
use crate::commitment::resume_field_leaf;
use crate::error::ZkpError;

/// The fixed, ordered field set a résumé commitment covers. The last
/// three are derived from the record lists.
pub const RESUME_REVEAL_FIELDS: [&str; 6] = [
    "fullName",
    "email",
    "phone",
    "totalYearsExperience",
    "employmentCount",
    "topSkills",
];

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ResumeRevealProof {
    #[serde(rename = "resumeCommitment", with = "b64_digest")]
    pub resume_commitment: Digest32,
    #[serde(rename = "revealedFields")]
    pub revealed_fields: Vec<String>,
    #[serde(rename = "revealedValues")]
    pub revealed_values: BTreeMap<String, Value>,
    /// Mandatory fresh nonce; replay rejection is bookkept above the
    /// proof contract.
    #[serde(rename = "disclosureNonce", with = "b64_digest")]
    pub disclosure_nonce: Nonce,
    #[serde(rename = "fieldLeaves", with = "b64_digest_list")]
    pub field_leaves: Vec<Digest32>,
}

fn field_value(resume: &ResumeData, name: &str, today: NaiveDate) -> Value {
    match name {
        "fullName" => Value::String(resume.full_name.clone()),
        "email" => Value::String(resume.email.clone().unwrap_or_default()),
        "phone" => Value::String(resume.phone.clone().unwrap_or_default()),
        "totalYearsExperience" => Value::from(resume.total_years_experience(today)),
        "employmentCount" => Value::from(resume.employment_count() as u64),
        "topSkills" => Value::Array(
            resume
                .top_skills()
                .into_iter()
                .map(|s| Value::String(s.name.clone()))
                .collect(),
        ),
        _ => Value::String(String::new()),
    }
}

/// Prove the values of `reveal` résumé fields. `today` anchors the
/// derived experience figures.
pub fn prove_resume_reveal(
    resume: &ResumeData,
    reveal: &[&str],
    today: NaiveDate,
    circuit: &ZkCircuit,
    now: DateTime<Utc>,
) -> Result<ZkProof, ZkpError> {
    let nonce = random_nonce()?;

    let field_leaves: Vec<Digest32> = RESUME_REVEAL_FIELDS
        .iter()
        .map(|name| resume_field_leaf(name, &field_value(resume, name, today), &nonce))
        .collect();
    let commitment = MerkleTree::from_leaf_hashes(field_leaves.clone()).root();

    let mut revealed_values = BTreeMap::new();
    for name in reveal {
        revealed_values.insert(name.to_string(), field_value(resume, name, today));
    }

    let mut public_inputs = BTreeMap::new();
    public_inputs.insert(
        "resumeCommitment".to_string(),
        encoding::encode(&commitment).into(),
    );
    public_inputs.insert(
        "revealedFields".to_string(),
        serde_json::to_value(reveal).map_err(|e| ZkpError::ProofMalformed(e.to_string()))?,
    );

    Ok(ZkProof::new(
        circuit,
        now,
        ProofPattern::ResumeSelectiveReveal(ResumeRevealProof {
            resume_commitment: commitment,
            revealed_fields: reveal.iter().map(|s| s.to_string()).collect(),
            revealed_values,
            disclosure_nonce: nonce,
            field_leaves,
        }),
        public_inputs,
    ))
}

/// Verify a résumé reveal artifact.
pub fn verify_resume_reveal(proof: &ZkProof, circuit: &ZkCircuit) -> Result<(), ZkpError> {
    circuit.ensure_matches(&proof.circuit_id)?;
    let payload = expect_pattern!(proof, ResumeSelectiveReveal)?;

    if payload.field_leaves.len() != RESUME_REVEAL_FIELDS.len() {
        return Err(ZkpError::ProofMalformed(format!(
            "expected {} field leaves, got {}",
            RESUME_REVEAL_FIELDS.len(),
            payload.field_leaves.len()
        )));
    }

    for name in &payload.revealed_fields {
        let value = payload
            .revealed_values
            .get(name)
            .ok_or_else(|| ZkpError::ProofMalformed(format!("no value for revealed field {name}")))?;
        match RESUME_REVEAL_FIELDS.iter().position(|f| *f == name.as_str()) {
            Some(index) => {
                let leaf = resume_field_leaf(name, value, &payload.disclosure_nonce);
                if leaf != payload.field_leaves[index] {
                    return Err(ZkpError::ProofRejected(format!(
                        "revealed value for {name} does not match the commitment"
                    )));
                }
            }
            None if value == &Value::String(String::new()) => {}
            None => {
                return Err(ZkpError::ProofRejected(format!(
                    "unknown field {name} cannot reveal a value"
                )))
            }
        }
    }

    let root = MerkleTree::from_leaf_hashes(payload.field_leaves.clone()).root();
    if root != payload.resume_commitment {
        return Err(ZkpError::ProofRejected(
            "field leaves do not derive the declared commitment".to_string(),
        ));
    }
    Ok(())
}
