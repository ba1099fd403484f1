use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vey_core_types::{decode_multibase_key, encode_multibase_key, Did};
use vey_crypto::domain;
use vey_crypto::hash::digest;
use vey_crypto::signing;

use crate::canonical::{canonical_form_with, CanonicalError};

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider {provider} does not support circuit {circuit}")]
    UnsupportedCircuit { provider: Did, circuit: String },
    #[error("Provider signature verification failed")]
    SignatureInvalid,
    #[error("Invalid verification key for provider {0}")]
    InvalidVerificationKey(Did),
    #[error("Canonicalization error: {0}")]
    Canonical(#[from] CanonicalError),
}

/// An address-provider record: a provider DID bound to a display name,
/// a verification public key, an endpoint, and the circuits it supports.
///
/// The verification key is separate from the DID-document signing key so
/// providers can rotate it without re-publishing the record's DID.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AddressProvider {
    pub did: Did,
    pub name: String,
    /// Multibase-encoded Ed25519 verification key.
    #[serde(rename = "verificationKey")]
    pub verification_key: String,
    pub endpoint: String,
    /// Circuit ids the provider can produce proofs for.
    pub circuits: Vec<String>,
}

impl AddressProvider {
    pub fn new(
        did: Did,
        name: impl Into<String>,
        verification_key: &VerifyingKey,
        endpoint: impl Into<String>,
        circuits: Vec<String>,
    ) -> Self {
        AddressProvider {
            did,
            name: name.into(),
            verification_key: encode_multibase_key(verification_key),
            endpoint: endpoint.into(),
            circuits,
        }
    }

    /// Decode the provider's verification key.
    pub fn verifying_key(&self) -> Result<VerifyingKey, ProviderError> {
        decode_multibase_key(&self.verification_key)
            .map_err(|_| ProviderError::InvalidVerificationKey(self.did.clone()))
    }

    pub fn supports_circuit(&self, circuit_id: &str) -> bool {
        self.circuits.iter().any(|c| c == circuit_id)
    }

    pub fn ensure_supports(&self, circuit_id: &str) -> Result<(), ProviderError> {
        if self.supports_circuit(circuit_id) {
            return Ok(());
        }
        Err(ProviderError::UnsupportedCircuit {
            provider: self.did.clone(),
            circuit: circuit_id.to_string(),
        })
    }
}

/// The canonical digest a provider signs over an artifact.
pub fn provider_artifact_digest<T: Serialize>(
    artifact: &T,
) -> Result<[u8; 32], ProviderError> {
    let canonical = canonical_form_with(domain::PROVIDER_ARTIFACT, artifact)?;
    Ok(digest(domain::PROVIDER_ARTIFACT, &canonical))
}

/// Verify an Ed25519 signature over an artifact's canonical digest under
/// the provider's verification key.
pub fn validate_provider_signature<T: Serialize>(
    artifact: &T,
    signature: &[u8],
    provider: &AddressProvider,
) -> Result<(), ProviderError> {
    let digest = provider_artifact_digest(artifact)?;
    let key = provider.verifying_key()?;
    signing::verify(&key, &digest, signature).map_err(|_| ProviderError::SignatureInvalid)
}
