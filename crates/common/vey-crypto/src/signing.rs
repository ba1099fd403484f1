use ed25519_dalek::{
    Signature, Signer, SigningKey, Verifier, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH,
};
use rand::rngs::OsRng;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SigningError {
    #[error("Signature verification failed")]
    VerificationFailed(#[source] ed25519_dalek::SignatureError),
    #[error("Invalid signature length: expected 64, got {0}")]
    InvalidSignatureLength(usize),
    #[error("Invalid public key length: expected 32, got {0}")]
    InvalidKeyLength(usize),
    #[error("Invalid public key encoding")]
    InvalidKey(#[source] ed25519_dalek::SignatureError),
}

/// Generate a fresh Ed25519 keypair using OS randomness.
pub fn generate_keypair() -> (SigningKey, VerifyingKey) {
    let mut csprng = OsRng;
    let signing_key = SigningKey::generate(&mut csprng);
    let verifying_key = signing_key.verifying_key();
    (signing_key, verifying_key)
}

/// Sign a message; the signature is 64 bytes.
pub fn sign(signing_key: &SigningKey, message: &[u8]) -> Signature {
    signing_key.sign(message)
}

/// Verify a detached signature given as raw bytes. Uses strict
/// verification, which rejects non-canonical signature and key encodings.
pub fn verify(
    verifying_key: &VerifyingKey,
    message: &[u8],
    signature_bytes: &[u8],
) -> Result<(), SigningError> {
    let signature = signature_from_bytes(signature_bytes)?;
    verifying_key
        .verify_strict(message, &signature)
        .map_err(SigningError::VerificationFailed)
}

pub fn signature_from_bytes(bytes: &[u8]) -> Result<Signature, SigningError> {
    let array: &[u8; SIGNATURE_LENGTH] = bytes
        .try_into()
        .map_err(|_| SigningError::InvalidSignatureLength(bytes.len()))?;
    Ok(Signature::from_bytes(array))
}

pub fn verifying_key_from_bytes(bytes: &[u8]) -> Result<VerifyingKey, SigningError> {
    let array: &[u8; PUBLIC_KEY_LENGTH] = bytes
        .try_into()
        .map_err(|_| SigningError::InvalidKeyLength(bytes.len()))?;
    VerifyingKey::from_bytes(array).map_err(SigningError::InvalidKey)
}
