use async_trait::async_trait;
use thiserror::Error;

use vey_core_types::Did;

use super::RevocationList;

mod memory;

pub use memory::MemoryRevocationStore;

/// Errors that can occur when working with revocation-list storage.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("No revocation list found for issuer {0}")]
    NotFound(Did),
    #[error("Version conflict: expected {expected}, got {got}")]
    VersionConflict { expected: u64, got: u64 },
    #[error("List createdAt must increase: latest is {0}")]
    StaleCreatedAt(chrono::DateTime<chrono::Utc>),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Trait defining the interface for revocation-list storage backends.
/// The storage collaborator serializes appends per issuer; the core
/// assumes monotonic versions and strictly increasing `createdAt`.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// The latest list published by `issuer`, if any.
    async fn latest_list(&self, issuer: &Did) -> Result<Option<RevocationList>, StorageError>;

    /// Append a new list version. Rejects versions that do not extend the
    /// current latest by exactly one.
    async fn append(&self, list: RevocationList) -> Result<(), StorageError>;

    /// A specific historical version, if retained by the backend.
    async fn get_version(
        &self,
        issuer: &Did,
        version: u64,
    ) -> Result<Option<RevocationList>, StorageError>;
}
