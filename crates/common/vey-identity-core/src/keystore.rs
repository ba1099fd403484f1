use async_trait::async_trait;
use ed25519_dalek::VerifyingKey;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use vey_core_types::{Did, DidMethod};

#[derive(Error, Debug)]
pub enum KeystoreError {
    #[error("Public key not found for {did}#{fragment}")]
    KeyNotFound { did: Did, fragment: String },
    #[error("Invalid key material for {did}: {reason}")]
    InvalidKey { did: Did, reason: String },
    #[error("Keystore backend error: {0}")]
    Backend(String),
}

/// Keystore collaborator: resolves `(did, fragment)` to a verification
/// key. `did:key` DIDs resolve from the identifier itself; `did:web`
/// resolution is backend-specific.
#[async_trait]
pub trait Keystore: Send + Sync {
    async fn public_key(&self, did: &Did, fragment: &str) -> Result<VerifyingKey, KeystoreError>;
}

/// An in-memory keystore for tests and demos. `did:key` DIDs are
/// resolved without registration.
#[derive(Debug, Default)]
pub struct MemoryKeystore {
    keys: Arc<RwLock<HashMap<(Did, String), VerifyingKey>>>,
}

impl MemoryKeystore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, did: &Did, fragment: &str, key: &VerifyingKey) {
        let mut keys_guard = self.keys.write().await;
        keys_guard.insert((did.clone(), fragment.to_string()), *key);
    }
}

#[async_trait]
impl Keystore for MemoryKeystore {
    async fn public_key(&self, did: &Did, fragment: &str) -> Result<VerifyingKey, KeystoreError> {
        if did.method() == DidMethod::Key {
            return did.embedded_key().map_err(|e| KeystoreError::InvalidKey {
                did: did.clone(),
                reason: e.to_string(),
            });
        }
        let keys_guard = self.keys.read().await;
        keys_guard
            .get(&(did.clone(), fragment.to_string()))
            .copied()
            .ok_or_else(|| KeystoreError::KeyNotFound {
                did: did.clone(),
                fragment: fragment.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vey_core_types::DidKey;

    #[tokio::test]
    async fn did_key_resolves_without_registration() {
        let key = DidKey::generate();
        let keystore = MemoryKeystore::new();
        let resolved = keystore.public_key(key.did(), "key-1").await.unwrap();
        assert_eq!(resolved, *key.verifying_key());
    }

    #[tokio::test]
    async fn did_web_requires_registration() {
        let key = DidKey::generate();
        let did = Did::parse("did:web:issuer.example").unwrap();
        let keystore = MemoryKeystore::new();

        assert!(matches!(
            keystore.public_key(&did, "key-1").await,
            Err(KeystoreError::KeyNotFound { .. })
        ));

        keystore.register(&did, "key-1", key.verifying_key()).await;
        let resolved = keystore.public_key(&did, "key-1").await.unwrap();
        assert_eq!(resolved, *key.verifying_key());

        // Other fragments stay unresolved.
        assert!(keystore.public_key(&did, "key-2").await.is_err());
    }
}
