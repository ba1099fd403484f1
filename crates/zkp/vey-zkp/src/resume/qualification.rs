//! Qualification proof: a degree or certification at or above a level,
//! from a hidden institution in a hidden field of study.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use vey_crypto::domain;
use vey_crypto::encoding::{self, b64_digest};
use vey_crypto::hash::{digest, digest_parts, Digest32};
use vey_crypto::rng::{random_nonce, Nonce};
use vey_types::resume::{Certification, Education, QualificationLevel};

use crate::artifact::{expect_pattern, ProofPattern, ZkProof};
use crate::circuit::ZkCircuit;
use crate::error::ZkpError;

/// Discriminator for the two qualification sources.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QualificationKind {
    Degree,
    Certification,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct QualificationProof {
    #[serde(rename = "qualificationType")]
    pub qualification_type: QualificationKind,
    /// Opaque digest of the institution name.
    #[serde(rename = "institutionHash", with = "b64_digest")]
    pub institution_hash: Digest32,
    /// Opaque digest of the field of study (the issuer name for
    /// certifications).
    #[serde(rename = "fieldOfStudyHash", with = "b64_digest")]
    pub field_of_study_hash: Digest32,
    pub level: QualificationLevel,
    #[serde(rename = "completionYear")]
    pub completion_year: i32,
    #[serde(with = "b64_digest")]
    pub nonce: Nonce,
    #[serde(with = "b64_digest")]
    pub attestation: Digest32,
}

fn qualification_attestation(
    kind: QualificationKind,
    institution_hash: &Digest32,
    field_of_study_hash: &Digest32,
    level: QualificationLevel,
    completion_year: i32,
    nonce: &Nonce,
) -> Digest32 {
    let kind_byte = [match kind {
        QualificationKind::Degree => 0u8,
        QualificationKind::Certification => 1u8,
    }];
    let level_byte = [level as u8];
    let year_bytes = completion_year.to_le_bytes();
    digest_parts(
        domain::QUALIFICATION_ATTEST,
        &[&kind_byte, institution_hash, field_of_study_hash, &level_byte, &year_bytes, nonce],
    )
}

fn build(
    kind: QualificationKind,
    institution: &str,
    field_of_study: &str,
    level: QualificationLevel,
    completion_year: i32,
    circuit: &ZkCircuit,
    now: DateTime<Utc>,
) -> Result<ZkProof, ZkpError> {
    let nonce = random_nonce()?;
    let institution_hash = digest(domain::INSTITUTION_HASH, institution.as_bytes());
    let field_of_study_hash = digest(domain::FIELD_OF_STUDY_HASH, field_of_study.as_bytes());
    let attestation = qualification_attestation(
        kind,
        &institution_hash,
        &field_of_study_hash,
        level,
        completion_year,
        &nonce,
    );

    let mut public_inputs = BTreeMap::new();
    public_inputs.insert(
        "institutionHash".to_string(),
        encoding::encode(&institution_hash).into(),
    );
    public_inputs.insert(
        "fieldOfStudyHash".to_string(),
        encoding::encode(&field_of_study_hash).into(),
    );
    public_inputs.insert(
        "level".to_string(),
        serde_json::to_value(level).map_err(|e| ZkpError::ProofMalformed(e.to_string()))?,
    );
    public_inputs.insert("completionYear".to_string(), completion_year.into());

    Ok(ZkProof::new(
        circuit,
        now,
        ProofPattern::Qualification(QualificationProof {
            qualification_type: kind,
            institution_hash,
            field_of_study_hash,
            level,
            completion_year,
            nonce,
            attestation,
        }),
        public_inputs,
    ))
}

/// Prove a degree from an education record.
pub fn prove_degree(
    education: &Education,
    circuit: &ZkCircuit,
    now: DateTime<Utc>,
) -> Result<ZkProof, ZkpError> {
    build(
        QualificationKind::Degree,
        &education.institution,
        &education.field_of_study,
        education.level,
        education.completion_year,
        circuit,
        now,
    )
}

/// Prove a certification; its level is always the lowest rung of the
/// ordering.
pub fn prove_certification(
    certification: &Certification,
    circuit: &ZkCircuit,
    now: DateTime<Utc>,
) -> Result<ZkProof, ZkpError> {
    build(
        QualificationKind::Certification,
        &certification.issuer,
        &certification.name,
        QualificationLevel::Certification,
        certification.completion_year,
        circuit,
        now,
    )
}

/// Verify a qualification artifact: the level ordering against
/// `min_level`, the completion year against `current_year`, and the
/// attestation binding.
pub fn verify_qualification(
    proof: &ZkProof,
    circuit: &ZkCircuit,
    min_level: QualificationLevel,
    current_year: i32,
) -> Result<(), ZkpError> {
    circuit.ensure_matches(&proof.circuit_id)?;
    let payload = expect_pattern!(proof, Qualification)?;

    if payload.level < min_level {
        return Err(ZkpError::ProofRejected(format!(
            "qualification level below required minimum {min_level:?}"
        )));
    }
    if payload.completion_year > current_year {
        return Err(ZkpError::YearInFuture(payload.completion_year));
    }
    if payload.qualification_type == QualificationKind::Certification
        && payload.level != QualificationLevel::Certification
    {
        return Err(ZkpError::ProofRejected(
            "certifications carry the certification level".to_string(),
        ));
    }

    let expected = qualification_attestation(
        payload.qualification_type,
        &payload.institution_hash,
        &payload.field_of_study_hash,
        payload.level,
        payload.completion_year,
        &payload.nonce,
    );
    if expected != payload.attestation {
        return Err(ZkpError::ProofRejected(
            "qualification attestation does not recompute".to_string(),
        ));
    }
    Ok(())
}
