//! Structure proof: a hidden PID conforms to a country grammar of a
//! declared depth. The verifier never sees the segments, only their
//! commitments and an attestation bound to the exact grammar version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use vey_core_types::Pid;
use vey_crypto::domain;
use vey_crypto::encoding::{self, b64_digest, b64_digest_list};
use vey_crypto::hash::{digest_parts, Digest32};
use vey_crypto::rng::{random_nonce, Nonce};
use vey_types::grammar::CountryGrammar;

use crate::artifact::{expect_pattern, ProofPattern, ZkProof};
use crate::circuit::ZkCircuit;
use crate::commitment::segment_commitment;
use crate::error::ZkpError;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StructureProof {
    pub country: String,
    #[serde(rename = "declaredDepth")]
    pub declared_depth: u32,
    /// Digest of the grammar version the proof was generated under.
    #[serde(rename = "rulesHash", with = "b64_digest")]
    pub rules_hash: Digest32,
    /// One commitment per hidden segment, in slot order.
    #[serde(rename = "segmentCommitments", with = "b64_digest_list")]
    pub segment_commitments: Vec<Digest32>,
    #[serde(with = "b64_digest")]
    pub nonce: Nonce,
    #[serde(with = "b64_digest")]
    pub attestation: Digest32,
}

fn structure_attestation(
    rules_hash: &Digest32,
    declared_depth: u32,
    segment_commitments: &[Digest32],
    nonce: &Nonce,
) -> Digest32 {
    let depth_bytes = declared_depth.to_le_bytes();
    let mut parts: Vec<&[u8]> = vec![rules_hash, &depth_bytes];
    for commitment in segment_commitments {
        parts.push(commitment);
    }
    parts.push(nonce);
    digest_parts(domain::STRUCTURE_ATTEST, &parts)
}

/// Generate a structure proof for `pid` under `grammar`. Generation
/// checks every slot constraint; a violating PID never yields a proof.
pub fn prove_structure(
    pid: &Pid,
    grammar: &CountryGrammar,
    circuit: &ZkCircuit,
    now: DateTime<Utc>,
) -> Result<ZkProof, ZkpError> {
    if pid.country() != grammar.country {
        return Err(ZkpError::CountryMismatch {
            expected: grammar.country.clone(),
            got: pid.country().to_string(),
        });
    }

    let segments = pid.segments();
    if segments.len() > grammar.depth() {
        return Err(ZkpError::StructureViolation(format!(
            "PID depth {} exceeds grammar depth {}",
            segments.len(),
            grammar.depth()
        )));
    }
    for (index, segment) in segments.iter().enumerate() {
        let slot = grammar
            .slot(index)
            .expect("segment count checked against grammar depth");
        if segment.len() > slot.max_len {
            return Err(ZkpError::StructureViolation(format!(
                "segment {} exceeds slot {} length bound {}",
                index, slot.name, slot.max_len
            )));
        }
        if slot.numeric && !segment.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ZkpError::StructureViolation(format!(
                "slot {} requires a numeric segment",
                slot.name
            )));
        }
    }

    let nonce = random_nonce()?;
    let segment_commitments: Vec<Digest32> = segments
        .iter()
        .map(|segment| segment_commitment(segment, &nonce))
        .collect();
    let rules_hash = grammar.rules_hash();
    let declared_depth = segments.len() as u32;
    let attestation =
        structure_attestation(&rules_hash, declared_depth, &segment_commitments, &nonce);

    let mut public_inputs = BTreeMap::new();
    public_inputs.insert("country".to_string(), grammar.country.clone().into());
    public_inputs.insert("declaredDepth".to_string(), declared_depth.into());
    public_inputs.insert("rulesHash".to_string(), encoding::encode(&rules_hash).into());

    Ok(ZkProof::new(
        circuit,
        now,
        ProofPattern::Structure(StructureProof {
            country: grammar.country.clone(),
            declared_depth,
            rules_hash,
            segment_commitments,
            nonce,
            attestation,
        }),
        public_inputs,
    ))
}

/// Verifier context for structure proofs: the country grammar currently
/// trusted by this verifier.
#[derive(Debug, Clone)]
pub struct StructureVerifier {
    pub grammar: CountryGrammar,
}

impl StructureVerifier {
    pub fn new(grammar: CountryGrammar) -> Self {
        StructureVerifier { grammar }
    }

    pub fn verify(&self, proof: &ZkProof, circuit: &ZkCircuit) -> Result<(), ZkpError> {
        circuit.ensure_matches(&proof.circuit_id)?;
        let payload = expect_pattern!(proof, Structure)?;

        if payload.country != self.grammar.country {
            return Err(ZkpError::CountryMismatch {
                expected: self.grammar.country.clone(),
                got: payload.country.clone(),
            });
        }
        if payload.rules_hash != self.grammar.rules_hash() {
            return Err(ZkpError::RulesHashMismatch);
        }
        if payload.declared_depth as usize > self.grammar.depth() {
            return Err(ZkpError::StructureViolation(format!(
                "declared depth {} exceeds grammar depth {}",
                payload.declared_depth,
                self.grammar.depth()
            )));
        }
        if payload.segment_commitments.len() != payload.declared_depth as usize {
            return Err(ZkpError::StructureViolation(
                "segment count does not match declared depth".to_string(),
            ));
        }
        let expected = structure_attestation(
            &payload.rules_hash,
            payload.declared_depth,
            &payload.segment_commitments,
            &payload.nonce,
        );
        if expected != payload.attestation {
            return Err(ZkpError::ProofRejected(
                "structure attestation does not recompute".to_string(),
            ));
        }
        Ok(())
    }
}
