//! Revocation-list lifecycle and its interaction with version proofs.

use chrono::Duration;

use vey_core_types::{Did, DidKey, Pid};
use vey_identity_core::revocation::storage::{MemoryRevocationStore, RevocationStore};
use vey_identity_core::revocation::{RevocationEntry, RevocationList, RevocationReason};
use vey_integration_tests::t0;
use vey_zkp::address::version::{prove_version, verify_version};
use vey_zkp::circuit::{circuits, ZkCircuit};
use vey_zkp::ZkpError;

fn circuit() -> ZkCircuit {
    ZkCircuit::new(circuits::ADDRESS_VERSION_V1, "address version")
}

fn old_pid() -> Pid {
    Pid::parse("JP-13-113-01").unwrap()
}

fn new_pid() -> Pid {
    Pid::parse("JP-14-201-05").unwrap()
}

#[tokio::test]
async fn version_proof_follows_the_revocation_list() {
    let issuer = Did::parse("did:web:issuer").unwrap();
    let issuer_key = DidKey::generate();
    let store = MemoryRevocationStore::new();

    // Publish a signed list carrying the migration.
    let mut list = RevocationList::new(issuer.clone(), t0());
    list.revoke(
        RevocationEntry::new(
            old_pid(),
            t0(),
            RevocationReason::AddressChange,
            Some(new_pid()),
        )
        .unwrap(),
    );
    let signed = list
        .sign(&issuer_key, "did:web:issuer#key-1", t0())
        .unwrap();
    assert!(signed.verify(issuer_key.verifying_key()).is_ok());
    store.append(signed).await.unwrap();

    // A version proof over the migration verifies against the latest
    // list.
    let user = Did::parse("did:web:user-1").unwrap();
    let migration_at = t0() + Duration::hours(1);
    let proof = prove_version(
        &user,
        &old_pid(),
        &new_pid(),
        migration_at,
        &[3u8; 32],
        &circuit(),
        migration_at,
    )
    .unwrap();

    let latest = store.latest_list(&issuer).await.unwrap().unwrap();
    assert!(verify_version(&proof, &circuit(), &latest).is_ok());

    // Publish a successor list without the entry; the same proof is now
    // rejected with the documented error.
    let mut cleared = latest.successor(t0() + Duration::days(1)).unwrap();
    cleared.entries.clear();
    let cleared = cleared
        .sign(&issuer_key, "did:web:issuer#key-1", t0() + Duration::days(1))
        .unwrap();
    store.append(cleared).await.unwrap();

    let latest = store.latest_list(&issuer).await.unwrap().unwrap();
    let err = verify_version(&proof, &circuit(), &latest).unwrap_err();
    assert!(matches!(err, ZkpError::OldPidNotRevoked));
    assert_eq!(err.to_string(), "Old PID not revoked");
}

#[tokio::test]
async fn list_versions_are_monotonic_in_storage() {
    let issuer = Did::parse("did:web:issuer").unwrap();
    let store = MemoryRevocationStore::new();

    let seed = RevocationList::new(issuer.clone(), t0());
    store.append(seed.clone()).await.unwrap();

    let next = seed.successor(t0() + Duration::hours(1)).unwrap();
    assert_eq!(next.version, seed.version + 1);
    assert!(next.created_at > seed.created_at);
    store.append(next).await.unwrap();

    // Stale createdAt values are rejected by the list itself.
    let latest = store.latest_list(&issuer).await.unwrap().unwrap();
    assert!(latest.successor(t0()).is_err());
}

#[test]
fn migration_queries() {
    let issuer = Did::parse("did:web:issuer").unwrap();
    let mut list = RevocationList::new(issuer, t0());
    list.revoke(
        RevocationEntry::new(
            old_pid(),
            t0(),
            RevocationReason::AddressChange,
            Some(new_pid()),
        )
        .unwrap(),
    );
    list.revoke(
        RevocationEntry::new(
            Pid::parse("JP-13-113-02").unwrap(),
            t0(),
            RevocationReason::UserRequest,
            None,
        )
        .unwrap(),
    );

    assert!(list.is_revoked(&old_pid()));
    assert_eq!(list.new_pid(&old_pid()), Some(&new_pid()));
    assert_eq!(list.new_pid(&Pid::parse("JP-13-113-02").unwrap()), None);
    assert!(!list.is_revoked(&Pid::parse("JP-13-999").unwrap()));
}
