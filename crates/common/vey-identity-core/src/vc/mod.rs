use chrono::{DateTime, Utc};
use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use vey_core_types::{Did, DidKey};
use vey_crypto::encoding;
use vey_crypto::hash::{digest, Digest32};
use vey_crypto::signing;
use vey_crypto::domain;

use crate::canonical::{canonical_form, CanonicalError};
use crate::keystore::{Keystore, KeystoreError};

pub mod subjects;

pub use subjects::{
    address_pid_credential, certification_credential, education_credential,
    employment_credential, resume_credential, AddressPidSubject, CertificationSubject,
    EducationSubject, EmploymentSubject, ResumeSubject,
};

pub const CONTEXT_CREDENTIALS_V1: &str = "https://www.w3.org/2018/credentials/v1";
pub const CONTEXT_VEY_V1: &str = "https://w3id.org/vey/credentials/v1";
pub const ED25519_SIGNATURE_2020: &str = "Ed25519Signature2020";
pub const PROOF_PURPOSE_ASSERTION: &str = "assertionMethod";

/// Errors related to credential assembly and verification.
#[derive(Error, Debug)]
pub enum VcError {
    #[error("Signature verification failed")]
    SignatureInvalid,
    #[error("Verification method could not be resolved: {0}")]
    KeyNotFound(String),
    #[error("Credential expired at {0}")]
    CredentialExpired(DateTime<Utc>),
    #[error("Credential not yet valid before {0}")]
    CredentialNotYetValid(DateTime<Utc>),
    #[error("Credential subject mismatch: expected {expected}, got {got}")]
    SubjectMismatch { expected: String, got: String },
    #[error("Credential has no proof block")]
    MissingProof,
    #[error("Unsupported proof type: {0}")]
    UnsupportedProofType(String),
    #[error("Invalid proof value encoding: {0}")]
    InvalidProofEncoding(String),
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
    #[error("Canonicalization error: {0}")]
    Canonical(#[from] CanonicalError),
}

/// The W3C-style proof block attached to a signed credential.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Proof {
    /// The type of proof; always `Ed25519Signature2020` here.
    #[serde(rename = "type")]
    pub type_: String,

    /// When the proof was created.
    pub created: DateTime<Utc>,

    /// DID URL of the verification method, a fragment of the issuer's
    /// DID document.
    #[serde(rename = "verificationMethod")]
    pub verification_method: String,

    /// The purpose of this proof; always `assertionMethod` here.
    #[serde(rename = "proofPurpose")]
    pub proof_purpose: String,

    /// Detached signature over the canonical credential, base64url
    /// without padding.
    #[serde(rename = "proofValue")]
    pub proof_value: String,
}

/// A Verifiable Credential per the W3C data model, Ed25519-signed over
/// its canonical form.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VerifiableCredential {
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type")]
    pub types: Vec<String>,

    pub issuer: Did,

    #[serde(rename = "issuanceDate")]
    pub issuance_date: DateTime<Utc>,

    /// Absent means the credential never expires.
    #[serde(rename = "expirationDate", skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,

    /// The typed claims payload; `credentialSubject.id` is the subject
    /// DID.
    #[serde(rename = "credentialSubject")]
    pub credential_subject: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

impl VerifiableCredential {
    /// Create an unsigned credential of the given type.
    pub fn new(
        credential_type: &str,
        issuer: Did,
        credential_subject: Value,
        issuance_date: DateTime<Utc>,
    ) -> Self {
        VerifiableCredential {
            context: vec![
                CONTEXT_CREDENTIALS_V1.to_string(),
                CONTEXT_VEY_V1.to_string(),
            ],
            id: None,
            types: vec!["VerifiableCredential".to_string(), credential_type.to_string()],
            issuer,
            issuance_date,
            expiration_date: None,
            credential_subject,
            proof: None,
        }
    }

    pub fn expiring(mut self, at: DateTime<Utc>) -> Self {
        self.expiration_date = Some(at);
        self
    }

    /// The subject DID from `credentialSubject.id`, if present.
    pub fn subject_id(&self) -> Option<&str> {
        self.credential_subject.get("id").and_then(Value::as_str)
    }

    /// The canonical signing input: the credential minus its proof block,
    /// canonicalized under the credential domain tag.
    pub fn signing_input(&self) -> Result<Vec<u8>, VcError> {
        let mut unsigned = self.clone();
        unsigned.proof = None;
        Ok(canonical_form(&unsigned)?)
    }

    /// Sign the credential with the issuer's key, attaching an
    /// `Ed25519Signature2020` proof block.
    pub fn sign(
        mut self,
        signing_key: &DidKey,
        verification_method: &str,
        created: DateTime<Utc>,
    ) -> Result<Self, VcError> {
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
            credential_type = self.types.last().map(String::as_str).unwrap_or(""),
            "issued credential"
        );
        Ok(self)
    }

    /// Verify the proof against a resolved public key and the validity
    /// window. Succeeds only if the signature verifies over the canonical
    /// form and `now` lies within `[issuanceDate, expirationDate]`.
    pub fn verify(&self, public_key: &VerifyingKey, now: DateTime<Utc>) -> Result<(), VcError> {
        let proof = self.proof.as_ref().ok_or(VcError::MissingProof)?;
        if proof.type_ != ED25519_SIGNATURE_2020 {
            return Err(VcError::UnsupportedProofType(proof.type_.clone()));
        }

        let signature_bytes = encoding::decode(&proof.proof_value)
            .map_err(|e| VcError::InvalidProofEncoding(e.to_string()))?;
        let input = self.signing_input()?;
        signing::verify(public_key, &input, &signature_bytes).map_err(|e| {
            warn!(issuer = %self.issuer, error = %e, "credential signature rejected");
            VcError::SignatureInvalid
        })?;

        if now < self.issuance_date {
            return Err(VcError::CredentialNotYetValid(self.issuance_date));
        }
        if let Some(expiration) = self.expiration_date {
            if now > expiration {
                return Err(VcError::CredentialExpired(expiration));
            }
        }
        Ok(())
    }

    /// Verify, resolving the proof's verification method through the
    /// keystore collaborator.
    pub async fn verify_resolved(
        &self,
        keystore: &dyn Keystore,
        now: DateTime<Utc>,
    ) -> Result<(), VcError> {
        let proof = self.proof.as_ref().ok_or(VcError::MissingProof)?;
        let (did_str, fragment) = proof
            .verification_method
            .split_once('#')
            .ok_or_else(|| VcError::KeyNotFound(proof.verification_method.clone()))?;
        let did = Did::parse(did_str)
            .map_err(|_| VcError::KeyNotFound(proof.verification_method.clone()))?;
        let public_key = keystore
            .public_key(&did, fragment)
            .await
            .map_err(|e: KeystoreError| VcError::KeyNotFound(e.to_string()))?;
        self.verify(&public_key, now)
    }

    /// Assert the credential is about `expected`.
    pub fn expect_subject(&self, expected: &Did) -> Result<(), VcError> {
        let got = self.subject_id().unwrap_or("<none>");
        if got != expected.as_str() {
            return Err(VcError::SubjectMismatch {
                expected: expected.to_string(),
                got: got.to_string(),
            });
        }
        Ok(())
    }

    /// A stable digest of the canonical credential (proof excluded), used
    /// as witness material by version proofs.
    pub fn fingerprint(&self) -> Result<Digest32, VcError> {
        Ok(digest(domain::VC_CANONICAL, &self.signing_input()?))
    }

    pub fn to_json(&self) -> Result<String, VcError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, VcError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn signed_credential(key: &DidKey) -> VerifiableCredential {
        let subject = json!({"id": "did:key:subject-placeholder", "claim": 42});
        VerifiableCredential::new("TestCredential", key.did().clone(), subject, now())
            .sign(key, &key.did().with_fragment("key-1"), now())
            .unwrap()
    }

    #[test]
    fn sign_verify_round_trip() {
        let key = DidKey::generate();
        let vc = signed_credential(&key);
        assert!(vc.verify(key.verifying_key(), now()).is_ok());
    }

    #[test]
    fn tampered_credential_fails() {
        let key = DidKey::generate();
        let mut vc = signed_credential(&key);
        vc.credential_subject["claim"] = json!(43);
        assert!(matches!(
            vc.verify(key.verifying_key(), now()),
            Err(VcError::SignatureInvalid)
        ));
    }

    #[test]
    fn wrong_key_fails() {
        let key = DidKey::generate();
        let other = DidKey::generate();
        let vc = signed_credential(&key);
        assert!(vc.verify(other.verifying_key(), now()).is_err());
    }

    #[test]
    fn expired_credential_rejected() {
        let key = DidKey::generate();
        let expiry = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let vc = VerifiableCredential::new(
            "TestCredential",
            key.did().clone(),
            json!({"id": "did:web:subject"}),
            Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap(),
        )
        .expiring(expiry)
        .sign(&key, &key.did().with_fragment("key-1"), now())
        .unwrap();

        assert!(matches!(
            vc.verify(key.verifying_key(), now()),
            Err(VcError::CredentialExpired(_))
        ));
    }

    #[test]
    fn not_yet_valid_rejected() {
        let key = DidKey::generate();
        let future = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let vc = VerifiableCredential::new(
            "TestCredential",
            key.did().clone(),
            json!({"id": "did:web:subject"}),
            future,
        )
        .sign(&key, &key.did().with_fragment("key-1"), now())
        .unwrap();

        assert!(matches!(
            vc.verify(key.verifying_key(), now()),
            Err(VcError::CredentialNotYetValid(_))
        ));
    }

    #[test]
    fn missing_issuance_date_rejected_on_parse() {
        let json = r#"{
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiableCredential"],
            "issuer": "did:web:issuer",
            "credentialSubject": {"id": "did:web:subject"}
        }"#;
        assert!(VerifiableCredential::from_json(json).is_err());
    }

    #[test]
    fn subject_assertion() {
        let key = DidKey::generate();
        let vc = signed_credential(&key);
        let expected = Did::parse("did:web:someone-else").unwrap();
        assert!(matches!(
            vc.expect_subject(&expected),
            Err(VcError::SubjectMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn verify_resolved_uses_keystore() {
        use crate::keystore::MemoryKeystore;

        let key = DidKey::generate();
        let issuer = Did::parse("did:web:issuer").unwrap();
        let vc = VerifiableCredential::new(
            "TestCredential",
            issuer.clone(),
            json!({"id": "did:web:subject"}),
            now(),
        )
        .sign(&key, &issuer.with_fragment("key-1"), now())
        .unwrap();

        let keystore = MemoryKeystore::new();
        keystore.register(&issuer, "key-1", key.verifying_key()).await;
        assert!(vc.verify_resolved(&keystore, now()).await.is_ok());

        let empty = MemoryKeystore::new();
        assert!(matches!(
            vc.verify_resolved(&empty, now()).await,
            Err(VcError::KeyNotFound(_))
        ));
    }
}
