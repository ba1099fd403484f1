use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vey_core_types::{decode_multibase_key, encode_multibase_key, Did};

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Verification method not found: {0}")]
    MethodNotFound(String),
    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),
    #[error("Invalid multibase key encoding: {0}")]
    InvalidKeyEncoding(String),
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

pub const ED25519_VERIFICATION_KEY_2020: &str = "Ed25519VerificationKey2020";
const DID_DOCUMENT_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// One verification method of a DID document: a public key the subject
/// controls, multibase-encoded.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VerificationMethod {
    /// DID URL of the method, e.g. `did:web:issuer#key-1`.
    pub id: String,
    pub controller: Did,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(rename = "publicKeyMultibase")]
    pub public_key_multibase: String,
}

impl VerificationMethod {
    fn new(did: &Did, index: usize, public_key: &VerifyingKey) -> Self {
        VerificationMethod {
            id: did.with_fragment(&format!("key-{}", index)),
            controller: did.clone(),
            type_: ED25519_VERIFICATION_KEY_2020.to_string(),
            public_key_multibase: encode_multibase_key(public_key),
        }
    }

    /// Decode the embedded public key.
    pub fn verifying_key(&self) -> Result<VerifyingKey, DocumentError> {
        if self.type_ != ED25519_VERIFICATION_KEY_2020 {
            return Err(DocumentError::UnsupportedKeyType(self.type_.clone()));
        }
        decode_multibase_key(&self.public_key_multibase)
            .map_err(|e| DocumentError::InvalidKeyEncoding(e.to_string()))
    }
}

/// A subject's DID document. Verification methods are append-only within a
/// document version; `key-1` is authorized for both authentication and
/// credential assertion at construction.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DidDocument {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: Did,
    #[serde(rename = "verificationMethod")]
    pub verification_method: Vec<VerificationMethod>,
    /// Method ids authorized for authentication.
    pub authentication: Vec<String>,
    /// Method ids authorized for credential signing.
    #[serde(rename = "assertionMethod")]
    pub assertion_method: Vec<String>,
}

impl DidDocument {
    /// Build a document for `did` with a single method `{did}#key-1`
    /// authorized for both purposes.
    pub fn new(did: Did, public_key: &VerifyingKey) -> Self {
        let method = VerificationMethod::new(&did, 1, public_key);
        let method_id = method.id.clone();
        DidDocument {
            context: vec![DID_DOCUMENT_CONTEXT.to_string()],
            id: did,
            verification_method: vec![method],
            authentication: vec![method_id.clone()],
            assertion_method: vec![method_id],
        }
    }

    /// Append a verification method; existing methods are never replaced.
    /// The new method is not authorized for anything until added to an
    /// authorization list explicitly.
    pub fn add_verification_method(&mut self, public_key: &VerifyingKey) -> &VerificationMethod {
        let index = self.verification_method.len() + 1;
        let method = VerificationMethod::new(&self.id, index, public_key);
        self.verification_method.push(method);
        self.verification_method.last().expect("just pushed")
    }

    pub fn authorize_assertion(&mut self, method_id: &str) -> Result<(), DocumentError> {
        self.method(method_id)?;
        if !self.assertion_method.iter().any(|id| id == method_id) {
            self.assertion_method.push(method_id.to_string());
        }
        Ok(())
    }

    /// Look up a method by full DID URL or bare fragment.
    pub fn method(&self, id_or_fragment: &str) -> Result<&VerificationMethod, DocumentError> {
        let full_id = if id_or_fragment.contains('#') {
            id_or_fragment.to_string()
        } else {
            self.id.with_fragment(id_or_fragment)
        };
        self.verification_method
            .iter()
            .find(|m| m.id == full_id)
            .ok_or(DocumentError::MethodNotFound(full_id))
    }

    /// Resolve the public key behind a method id or fragment.
    pub fn public_key(&self, id_or_fragment: &str) -> Result<VerifyingKey, DocumentError> {
        self.method(id_or_fragment)?.verifying_key()
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }
}
