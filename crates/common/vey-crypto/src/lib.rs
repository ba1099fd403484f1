// src/lib.rs for vey-crypto
//
// Hashing, HMAC, CSPRNG, Ed25519 and Merkle primitives shared by every
// other crate in the workspace. All digests are domain-separated by a
// fixed ASCII prefix per use-site (see `domain`).

pub mod domain;
pub mod encoding;
pub mod hash;
pub mod merkle;
pub mod rng;
pub mod signing;

pub use hash::{digest, digest_parts, hmac_sha256, Digest32, EMPTY_DIGEST};
pub use merkle::{MerkleError, MerkleProof, MerkleTree};
pub use rng::{random_bytes, random_nonce, Nonce};
pub use signing::{generate_keypair, sign, verify, SigningError};

use thiserror::Error;

/// Fatal-tier crypto failure. Only RNG faults and primitive-level
/// inconsistencies surface here; semantic failures have their own kinds.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("OS random number generator failure: {0}")]
    RngFailure(String),
    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),
    #[error("Merkle error: {0}")]
    Merkle(#[from] MerkleError),
}
