use rand::rngs::OsRng;
use rand::RngCore;

use crate::CryptoError;

/// A 32-byte random nonce.
pub type Nonce = [u8; 32];

/// Fill `n` bytes from the OS CSPRNG. RNG failure is fatal-tier: callers
/// are expected to abort the operation, not retry.
pub fn random_bytes(n: usize) -> Result<Vec<u8>, CryptoError> {
    let mut bytes = vec![0u8; n];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::RngFailure(e.to_string()))?;
    Ok(bytes)
}

/// Draw a fresh 32-byte nonce from the OS CSPRNG.
pub fn random_nonce() -> Result<Nonce, CryptoError> {
    let mut nonce = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|e| CryptoError::RngFailure(e.to_string()))?;
    Ok(nonce)
}
