use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;

use crate::did::Did;

/// An Ed25519 keypair bound to the `did:key` DID it controls. Signing
/// happens here; all verification goes through the strict checks in the
/// crypto primitives.
#[derive(Debug)]
pub struct DidKey {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
    did: Did,
}

impl DidKey {
    /// Generate a fresh keypair using OS randomness; the DID is the
    /// `did:key` form of the generated public key.
    pub fn generate() -> Self {
        let mut csprng = OsRng;
        let signing_key = SigningKey::generate(&mut csprng);
        let verifying_key = signing_key.verifying_key();
        let did = Did::from_verifying_key(&verifying_key);
        DidKey { signing_key, verifying_key, did }
    }

    pub fn did(&self) -> &Did {
        &self.did
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }
}
