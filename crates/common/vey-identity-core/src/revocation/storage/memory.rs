use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use vey_core_types::Did;

use super::{RevocationStore, StorageError};
use crate::revocation::RevocationList;

/// An in-memory implementation of RevocationStore for testing.
#[derive(Debug, Default)]
pub struct MemoryRevocationStore {
    /// Map of issuer DID -> list versions in append order.
    lists: Arc<RwLock<HashMap<Did, Vec<RevocationList>>>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn latest_list(&self, issuer: &Did) -> Result<Option<RevocationList>, StorageError> {
        let lists_guard = self.lists.read().await;
        Ok(lists_guard.get(issuer).and_then(|versions| versions.last().cloned()))
    }

    async fn append(&self, list: RevocationList) -> Result<(), StorageError> {
        let mut lists_guard = self.lists.write().await;
        let versions = lists_guard.entry(list.issuer.clone()).or_default();
        match versions.last() {
            Some(latest) => {
                if list.version != latest.version + 1 {
                    return Err(StorageError::VersionConflict {
                        expected: latest.version + 1,
                        got: list.version,
                    });
                }
                if list.created_at <= latest.created_at {
                    return Err(StorageError::StaleCreatedAt(latest.created_at));
                }
            }
            None => {
                if list.version != 1 {
                    return Err(StorageError::VersionConflict { expected: 1, got: list.version });
                }
            }
        }
        versions.push(list);
        Ok(())
    }

    async fn get_version(
        &self,
        issuer: &Did,
        version: u64,
    ) -> Result<Option<RevocationList>, StorageError> {
        let lists_guard = self.lists.read().await;
        Ok(lists_guard
            .get(issuer)
            .and_then(|versions| versions.iter().find(|l| l.version == version).cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn issuer() -> Did {
        Did::parse("did:web:issuer").unwrap()
    }

    #[tokio::test]
    async fn append_and_fetch_latest() {
        let store = MemoryRevocationStore::new();
        let issuer = issuer();
        assert!(store.latest_list(&issuer).await.unwrap().is_none());

        let seed = RevocationList::new(issuer.clone(), Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        store.append(seed.clone()).await.unwrap();

        let next = seed.successor(Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap()).unwrap();
        store.append(next.clone()).await.unwrap();

        let latest = store.latest_list(&issuer).await.unwrap().unwrap();
        assert_eq!(latest.version, 2);
        assert_eq!(store.get_version(&issuer, 1).await.unwrap().unwrap().version, 1);
    }

    #[tokio::test]
    async fn rejects_version_gaps_and_stale_timestamps() {
        let store = MemoryRevocationStore::new();
        let issuer = issuer();
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let seed = RevocationList::new(issuer.clone(), t0);
        store.append(seed.clone()).await.unwrap();

        // Re-appending the same version conflicts.
        assert!(matches!(
            store.append(seed.clone()).await,
            Err(StorageError::VersionConflict { expected: 2, got: 1 })
        ));

        // A version gap conflicts.
        let mut skipped = seed.successor(Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap()).unwrap();
        skipped.version = 5;
        assert!(matches!(
            store.append(skipped).await,
            Err(StorageError::VersionConflict { .. })
        ));

        // First version must be 1.
        let other_issuer = Did::parse("did:web:other").unwrap();
        let mut bad_seed = RevocationList::new(other_issuer, t0);
        bad_seed.version = 3;
        assert!(matches!(
            store.append(bad_seed).await,
            Err(StorageError::VersionConflict { expected: 1, got: 3 })
        ));
    }
}
