use ed25519_dalek::{VerifyingKey, PUBLIC_KEY_LENGTH};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DidError {
    #[error("Invalid DID string: {0}")]
    InvalidDidString(String),
    #[error("Unsupported DID method: {0}")]
    UnsupportedDidMethod(String),
    #[error("DID embeds no key material: {0}")]
    NoEmbeddedKey(String),
    #[error("Invalid key encoding: {0}")]
    InvalidKeyEncoding(String),
}

/// DID methods understood by the protocol. `did:key` embeds the public key;
/// `did:web` is resolved through the keystore collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DidMethod {
    Key,
    Web,
}

/// Multicodec prefix for Ed25519 public keys (0xed01).
const ED25519_MULTICODEC_PREFIX: [u8; 2] = [0xed, 0x01];

/// Render a verifying key in the multibase form used throughout the
/// protocol: base58btc over the multicodec-prefixed key bytes.
pub fn encode_multibase_key(key: &VerifyingKey) -> String {
    let mut prefixed = Vec::with_capacity(ED25519_MULTICODEC_PREFIX.len() + PUBLIC_KEY_LENGTH);
    prefixed.extend_from_slice(&ED25519_MULTICODEC_PREFIX);
    prefixed.extend_from_slice(key.as_bytes());
    multibase::encode(multibase::Base::Base58Btc, prefixed)
}

/// Decode a multibase string back into a verifying key. Rejects anything
/// that is not base58btc over an 0xed01-prefixed 32-byte key.
pub fn decode_multibase_key(encoded: &str) -> Result<VerifyingKey, DidError> {
    let (base, bytes) =
        multibase::decode(encoded).map_err(|e| DidError::InvalidKeyEncoding(e.to_string()))?;
    if base != multibase::Base::Base58Btc {
        return Err(DidError::InvalidKeyEncoding(
            "expected base58btc (prefix 'z')".to_string(),
        ));
    }
    let key_bytes = bytes.strip_prefix(&ED25519_MULTICODEC_PREFIX[..]).ok_or_else(|| {
        DidError::InvalidKeyEncoding("missing 0xed01 multicodec prefix".to_string())
    })?;
    let key_array: &[u8; PUBLIC_KEY_LENGTH] = key_bytes.try_into().map_err(|_| {
        DidError::InvalidKeyEncoding(format!(
            "expected {} key bytes, got {}",
            PUBLIC_KEY_LENGTH,
            key_bytes.len()
        ))
    })?;
    VerifyingKey::from_bytes(key_array).map_err(|e| DidError::InvalidKeyEncoding(e.to_string()))
}

/// A Decentralized Identifier, supporting `did:key` (Ed25519) and `did:web`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// Construct a `did:key` DID from an Ed25519 verifying key.
    pub fn from_verifying_key(verifying_key: &VerifyingKey) -> Self {
        Did(format!("did:key:{}", encode_multibase_key(verifying_key)))
    }

    /// Parse and validate a DID string.
    pub fn parse(s: &str) -> Result<Self, DidError> {
        let rest = s
            .strip_prefix("did:")
            .ok_or_else(|| DidError::InvalidDidString(s.to_string()))?;
        let (method, method_id) = rest
            .split_once(':')
            .ok_or_else(|| DidError::InvalidDidString(s.to_string()))?;
        if method_id.is_empty() {
            return Err(DidError::InvalidDidString(s.to_string()));
        }
        match method {
            "key" | "web" => Ok(Did(s.to_string())),
            other => Err(DidError::UnsupportedDidMethod(other.to_string())),
        }
    }

    pub fn method(&self) -> DidMethod {
        if self.0.starts_with("did:key:") {
            DidMethod::Key
        } else {
            DidMethod::Web
        }
    }

    /// The verifying key a `did:key` DID carries in its identifier.
    /// `did:web` DIDs embed nothing and must go through the keystore.
    pub fn embedded_key(&self) -> Result<VerifyingKey, DidError> {
        match self.method() {
            DidMethod::Key => decode_multibase_key(&self.0["did:key:".len()..]),
            DidMethod::Web => Err(DidError::NoEmbeddedKey(self.0.clone())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The DID URL for a fragment of this DID's document, e.g. `{did}#key-1`.
    pub fn with_fragment(&self, fragment: &str) -> String {
        format!("{}#{}", self.0, fragment)
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Did {
    type Err = DidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Did::parse(s)
    }
}

impl TryFrom<String> for Did {
    type Error = DidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Did::parse(&value)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}
