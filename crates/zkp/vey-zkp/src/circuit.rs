use serde::{Deserialize, Serialize};

use crate::error::ZkpError;

/// Proof-system backends a circuit descriptor can name.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProofType {
    #[default]
    Groth16,
    Plonk,
    Bulletproofs,
}

/// A circuit descriptor: the proof tag and verification-key handle for
/// one prove/verify pair. Verification-key material is injected at
/// startup and treated as opaque; rotating a circuit means a new id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ZkCircuit {
    pub id: String,
    pub name: String,
    #[serde(rename = "proofType")]
    pub proof_type: ProofType,
}

impl ZkCircuit {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        ZkCircuit { id: id.into(), name: name.into(), proof_type: ProofType::default() }
    }

    pub fn with_proof_type(mut self, proof_type: ProofType) -> Self {
        self.proof_type = proof_type;
        self
    }

    /// A verifier accepts a proof only when its circuit id matches the
    /// verifier circuit.
    pub fn ensure_matches(&self, circuit_id: &str) -> Result<(), ZkpError> {
        if self.id == circuit_id {
            return Ok(());
        }
        Err(ZkpError::CircuitMismatch {
            expected: self.id.clone(),
            got: circuit_id.to_string(),
        })
    }
}

/// Well-known circuit ids.
pub mod circuits {
    pub const ADDRESS_MEMBERSHIP_V1: &str = "vey-address-membership-v1";
    pub const ADDRESS_STRUCTURE_V1: &str = "vey-address-structure-v1";
    pub const ADDRESS_REVEAL_V1: &str = "vey-address-reveal-v1";
    pub const ADDRESS_VERSION_V1: &str = "vey-address-version-v1";
    pub const LOCKER_MEMBERSHIP_V1: &str = "vey-locker-membership-v1";
    pub const RESUME_MEMBERSHIP_V1: &str = "vey-resume-membership-v1";
    pub const RESUME_REVEAL_V1: &str = "vey-resume-reveal-v1";
    pub const RESUME_QUALIFICATION_V1: &str = "vey-resume-qualification-v1";
    pub const RESUME_SKILL_V1: &str = "vey-resume-skill-v1";
}
