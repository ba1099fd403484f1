use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::address::locker::LockerProof;
use crate::address::membership::MembershipProof;
use crate::address::reveal::SelectiveRevealProof;
use crate::address::structure::StructureProof;
use crate::address::version::VersionProof;
use crate::circuit::{ProofType, ZkCircuit};
use crate::error::ZkpError;
use crate::resume::membership::ResumeMembershipProof;
use crate::resume::qualification::QualificationProof;
use crate::resume::reveal::ResumeRevealProof;
use crate::resume::skill::SkillProof;

/// The pattern-specific payload of a proof artifact, discriminated on
/// the wire by `patternType`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "patternType")]
pub enum ProofPattern {
    #[serde(rename = "membership")]
    Membership(MembershipProof),
    #[serde(rename = "structure")]
    Structure(StructureProof),
    #[serde(rename = "selectiveReveal")]
    SelectiveReveal(SelectiveRevealProof),
    #[serde(rename = "version")]
    Version(VersionProof),
    #[serde(rename = "locker")]
    Locker(LockerProof),
    #[serde(rename = "resumeMembership")]
    ResumeMembership(ResumeMembershipProof),
    #[serde(rename = "resumeSelectiveReveal")]
    ResumeSelectiveReveal(ResumeRevealProof),
    #[serde(rename = "qualification")]
    Qualification(QualificationProof),
    #[serde(rename = "skill")]
    Skill(SkillProof),
}

/// A proof artifact: the common envelope plus one pattern payload. Only
/// public inputs and backend witness digests appear here; clear private
/// values never do.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ZkProof {
    #[serde(rename = "circuitId")]
    pub circuit_id: String,
    #[serde(rename = "proofType")]
    pub proof_type: ProofType,
    #[serde(rename = "publicInputs")]
    pub public_inputs: BTreeMap<String, Value>,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub pattern: ProofPattern,
}

impl ZkProof {
    pub fn new(
        circuit: &ZkCircuit,
        timestamp: DateTime<Utc>,
        pattern: ProofPattern,
        public_inputs: BTreeMap<String, Value>,
    ) -> Self {
        ZkProof {
            circuit_id: circuit.id.clone(),
            proof_type: circuit.proof_type,
            public_inputs,
            timestamp,
            pattern,
        }
    }

    pub fn to_json(&self) -> Result<String, ZkpError> {
        serde_json::to_string(self).map_err(|e| ZkpError::ProofMalformed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ZkpError> {
        serde_json::from_str(json).map_err(|e| ZkpError::ProofMalformed(e.to_string()))
    }
}

/// Extract one pattern payload from an artifact, rejecting artifacts of
/// any other pattern.
macro_rules! expect_pattern {
    ($proof:expr, $variant:ident) => {
        match &$proof.pattern {
            ProofPattern::$variant(payload) => Ok(payload),
            other => Err(ZkpError::ProofMalformed(format!(
                "expected {} pattern, got {:?}",
                stringify!($variant),
                std::mem::discriminant(other)
            ))),
        }
    };
}
pub(crate) use expect_pattern;
