use chrono::{DateTime, Utc};
use thiserror::Error;

use vey_crypto::CryptoError;
use vey_zkp::ZkpError;

use crate::collaborators::CollaboratorError;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Stale request: timestamp {timestamp} outside the ±{max_skew_secs}s window")]
    StaleRequest { timestamp: DateTime<Utc>, max_skew_secs: i64 },
    #[error("Access denied")]
    AccessDenied,
    #[error("Unknown country: {0}")]
    UnknownCountry(String),
    #[error("Country mismatch: expected {expected}, got {got}")]
    CountryMismatch { expected: String, got: String },
    #[error("Shipping conditions not met: {0}")]
    ConditionsNotMet(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// Audit durability failure. Fatal-tier: the resolver refuses to
    /// answer when the trail cannot be written.
    #[error("Audit sink failure: {0}")]
    AuditSinkFailure(String),
    #[error(transparent)]
    Zkp(#[from] ZkpError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}
