//! Skill proof: the hidden skill set contains at least N skills in a
//! declared category at or above a minimum proficiency.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use vey_crypto::domain;
use vey_crypto::encoding::{self, b64_digest};
use vey_crypto::hash::{digest_parts, Digest32};
use vey_crypto::rng::{random_nonce, Nonce};
use vey_types::resume::Skill;

use crate::artifact::{expect_pattern, ProofPattern, ZkProof};
use crate::circuit::ZkCircuit;
use crate::commitment::skillset_commitment;
use crate::error::ZkpError;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SkillProof {
    pub category: String,
    #[serde(rename = "minProficiency")]
    pub min_proficiency: u8,
    /// Commitment to the complete hidden skill list.
    #[serde(rename = "skillsetCommitment", with = "b64_digest")]
    pub skillset_commitment: Digest32,
    /// Number of qualifying skills.
    pub count: u32,
    /// (min, max) years of experience across the qualifying skills.
    #[serde(rename = "experienceYearsRange")]
    pub experience_years_range: (u32, u32),
    #[serde(with = "b64_digest")]
    pub nonce: Nonce,
    #[serde(with = "b64_digest")]
    pub attestation: Digest32,
}

fn skill_attestation(
    category: &str,
    min_proficiency: u8,
    commitment: &Digest32,
    count: u32,
    range: (u32, u32),
    nonce: &Nonce,
) -> Digest32 {
    let min_byte = [min_proficiency];
    let count_bytes = count.to_le_bytes();
    let min_years = range.0.to_le_bytes();
    let max_years = range.1.to_le_bytes();
    digest_parts(
        domain::SKILL_ATTEST,
        &[category.as_bytes(), &min_byte, commitment, &count_bytes, &min_years, &max_years, nonce],
    )
}

/// Generate a skill proof over the full skill list. Fails with
/// `NoQualifyingSkills` when the category/proficiency filter matches
/// nothing; an empty proof is never produced.
pub fn prove_skills(
    skills: &[Skill],
    category: &str,
    min_proficiency: u8,
    circuit: &ZkCircuit,
    now: DateTime<Utc>,
) -> Result<ZkProof, ZkpError> {
    let qualifying: Vec<&Skill> = skills
        .iter()
        .filter(|s| s.category.eq_ignore_ascii_case(category) && s.proficiency >= min_proficiency)
        .collect();
    if qualifying.is_empty() {
        return Err(ZkpError::NoQualifyingSkills {
            category: category.to_string(),
            min_proficiency,
        });
    }

    let count = qualifying.len() as u32;
    let min_years = qualifying.iter().map(|s| s.years_of_experience).min().unwrap_or(0);
    let max_years = qualifying.iter().map(|s| s.years_of_experience).max().unwrap_or(0);

    let nonce = random_nonce()?;
    let commitment = skillset_commitment(skills, &nonce);
    let attestation = skill_attestation(
        category,
        min_proficiency,
        &commitment,
        count,
        (min_years, max_years),
        &nonce,
    );

    let mut public_inputs = BTreeMap::new();
    public_inputs.insert("category".to_string(), category.into());
    public_inputs.insert("minProficiency".to_string(), min_proficiency.into());
    public_inputs.insert(
        "skillsetCommitment".to_string(),
        encoding::encode(&commitment).into(),
    );
    public_inputs.insert("count".to_string(), count.into());

    Ok(ZkProof::new(
        circuit,
        now,
        ProofPattern::Skill(SkillProof {
            category: category.to_string(),
            min_proficiency,
            skillset_commitment: commitment,
            count,
            experience_years_range: (min_years, max_years),
            nonce,
            attestation,
        }),
        public_inputs,
    ))
}

/// Verify a skill artifact against the verifier's requirement of at
/// least `required_count` skills in `category` at `min_proficiency`.
pub fn verify_skills(
    proof: &ZkProof,
    circuit: &ZkCircuit,
    category: &str,
    min_proficiency: u8,
    required_count: u32,
) -> Result<(), ZkpError> {
    circuit.ensure_matches(&proof.circuit_id)?;
    let payload = expect_pattern!(proof, Skill)?;

    if !payload.category.eq_ignore_ascii_case(category) {
        return Err(ZkpError::ProofRejected(format!(
            "category mismatch: expected {category}, got {}",
            payload.category
        )));
    }
    if payload.min_proficiency < min_proficiency {
        return Err(ZkpError::ProofRejected(
            "proof was generated for a lower proficiency bar".to_string(),
        ));
    }
    if payload.count < required_count {
        return Err(ZkpError::ProofRejected(format!(
            "only {} qualifying skills, {} required",
            payload.count, required_count
        )));
    }
    if payload.experience_years_range.0 > payload.experience_years_range.1 {
        return Err(ZkpError::ProofMalformed("inverted experience range".to_string()));
    }

    let expected = skill_attestation(
        &payload.category,
        payload.min_proficiency,
        &payload.skillset_commitment,
        payload.count,
        payload.experience_years_range,
        &payload.nonce,
    );
    if expected != payload.attestation {
        return Err(ZkpError::ProofRejected(
            "skill attestation does not recompute".to_string(),
        ));
    }
    Ok(())
}
