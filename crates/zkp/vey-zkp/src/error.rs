use thiserror::Error;

use vey_crypto::CryptoError;

/// Errors surfaced by proof generation and verification. Generation
/// raises typed errors rather than returning an empty proof, so "no
/// qualifying witness" is always explicit.
#[derive(Error, Debug)]
pub enum ZkpError {
    #[error("Circuit mismatch: expected {expected}, got {got}")]
    CircuitMismatch { expected: String, got: String },
    #[error("Malformed proof: {0}")]
    ProofMalformed(String),
    #[error("Proof rejected: {0}")]
    ProofRejected(String),
    #[error("Country mismatch: expected {expected}, got {got}")]
    CountryMismatch { expected: String, got: String },
    #[error("Grammar rules hash mismatch")]
    RulesHashMismatch,
    #[error("Structure violation: {0}")]
    StructureViolation(String),
    #[error("Membership not found")]
    MembershipNotFound,
    #[error("Old PID not revoked")]
    OldPidNotRevoked,
    #[error("Revocation entry for old PID is not a migration to the claimed new PID")]
    NoMigration,
    #[error("New PID is itself revoked")]
    NewPidRevoked,
    #[error("No qualifying skills in category {category} at proficiency >= {min_proficiency}")]
    NoQualifyingSkills { category: String, min_proficiency: u8 },
    #[error("Employment record carries no verifier DID")]
    MissingVerifierDid,
    #[error("Completion year {0} is in the future")]
    YearInFuture(i32),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
