//! PID resolution under access policies, with the audit-totality
//! invariant checked on every branch.

use chrono::{TimeZone, Utc};

use vey_core_types::{Did, Pid};
use vey_gateway::ResolveRequest;
use vey_identity_core::revocation::storage::RevocationStore;
use vey_identity_core::revocation::{RevocationEntry, RevocationList, RevocationReason};
use vey_integration_tests::{harness, shibuya_address, t0};
use vey_types::address::AddressField;
use vey_types::audit::AuditResult;
use vey_types::policy::{AccessPolicy, PolicyAction};

fn carrier_policy(action: PolicyAction) -> AccessPolicy {
    AccessPolicy::new("pol-1", "did:web:carrier", "JP-13-*", action)
}

fn resolve_request(requester: &str) -> ResolveRequest {
    ResolveRequest {
        pid: Pid::parse("JP-13-113-01").unwrap(),
        requester_id: Did::parse(requester).unwrap(),
        access_token: None,
        reason: Some("delivery".to_string()),
        timestamp: t0(),
    }
}

#[tokio::test]
async fn matching_policy_releases_address_and_audits() {
    let h = harness().await;
    let pid = Pid::parse("JP-13-113-01").unwrap();
    let subject = Did::parse("did:web:user-1").unwrap();
    h.register_address(&subject, &pid, &shibuya_address()).await;

    let response = h
        .gateway
        .resolve_pid(&resolve_request("did:web:carrier"), &carrier_policy(PolicyAction::Resolve))
        .await
        .unwrap();

    assert!(response.success);
    let address = response.address.unwrap();
    assert_eq!(address.get(AddressField::Country), Some("JP"));
    assert_eq!(address.get(AddressField::Locality), Some("Shibuya"));

    let entries = h.audit.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].result, AuditResult::Success);
    assert_eq!(entries[0].id, response.access_log_id);
}

#[tokio::test]
async fn foreign_principal_is_denied_and_audited() {
    let h = harness().await;
    let pid = Pid::parse("JP-13-113-01").unwrap();
    let subject = Did::parse("did:web:user-1").unwrap();
    h.register_address(&subject, &pid, &shibuya_address()).await;

    let response = h
        .gateway
        .resolve_pid(&resolve_request("did:web:other"), &carrier_policy(PolicyAction::Resolve))
        .await
        .unwrap();

    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("Access denied"));
    assert!(response.address.is_none());

    let entries = h.audit.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].result, AuditResult::Denied);
    // Denied entries still carry the requested PID.
    assert_eq!(entries[0].pid, pid);
    assert_eq!(entries[0].id, response.access_log_id);
}

#[tokio::test]
async fn every_call_writes_exactly_one_entry() {
    let h = harness().await;
    let pid = Pid::parse("JP-13-113-01").unwrap();
    let subject = Did::parse("did:web:user-1").unwrap();
    h.register_address(&subject, &pid, &shibuya_address()).await;

    let policy = carrier_policy(PolicyAction::Resolve);
    for requester in ["did:web:carrier", "did:web:other", "did:web:carrier"] {
        h.gateway
            .resolve_pid(&resolve_request(requester), &policy)
            .await
            .unwrap();
    }
    // Error branch: a PID with no backing credential.
    let mut missing = resolve_request("did:web:carrier");
    missing.pid = Pid::parse("JP-13-404").unwrap();
    let response = h.gateway.resolve_pid(&missing, &policy).await.unwrap();
    assert!(!response.success);

    let entries = h.audit.entries().await;
    assert_eq!(entries.len(), 4);
    assert_eq!(
        entries.iter().filter(|e| e.result == AuditResult::Error).count(),
        1
    );
}

#[tokio::test]
async fn expired_policy_is_denied() {
    let h = harness().await;
    let pid = Pid::parse("JP-13-113-01").unwrap();
    let subject = Did::parse("did:web:user-1").unwrap();
    h.register_address(&subject, &pid, &shibuya_address()).await;

    let policy = carrier_policy(PolicyAction::Resolve)
        .expiring(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    let response = h
        .gateway
        .resolve_pid(&resolve_request("did:web:carrier"), &policy)
        .await
        .unwrap();
    assert!(!response.success);
}

async fn publish_migration(h: &vey_integration_tests::TestHarness) {
    let mut list = RevocationList::new(h.issuer.clone(), t0());
    list.revoke(
        RevocationEntry::new(
            Pid::parse("JP-13-113-01").unwrap(),
            t0(),
            RevocationReason::AddressChange,
            Some(Pid::parse("JP-14-201-05").unwrap()),
        )
        .unwrap(),
    );
    let signed = list
        .sign(&h.issuer_key, &h.issuer.with_fragment("key-1"), t0())
        .unwrap();
    h.revocations.append(signed).await.unwrap();
}

#[tokio::test]
async fn revoked_pid_is_not_resolved() {
    let h = harness().await;
    let pid = Pid::parse("JP-13-113-01").unwrap();
    let subject = Did::parse("did:web:user-1").unwrap();
    h.register_address(&subject, &pid, &shibuya_address()).await;
    publish_migration(&h).await;

    let response = h
        .gateway
        .resolve_pid(&resolve_request("did:web:carrier"), &carrier_policy(PolicyAction::Resolve))
        .await
        .unwrap();
    assert!(!response.success);
    assert!(response.address.is_none());
}

#[tokio::test]
async fn read_policy_returns_successor_without_address() {
    let h = harness().await;
    let pid = Pid::parse("JP-13-113-01").unwrap();
    let subject = Did::parse("did:web:user-1").unwrap();
    h.register_address(&subject, &pid, &shibuya_address()).await;
    publish_migration(&h).await;

    let response = h
        .gateway
        .resolve_pid(&resolve_request("did:web:carrier"), &carrier_policy(PolicyAction::Read))
        .await
        .unwrap();
    assert!(response.success);
    assert!(response.address.is_none());
    assert_eq!(response.new_pid, Some(Pid::parse("JP-14-201-05").unwrap()));

    // Without a migration, a read policy grants nothing.
    let h2 = harness().await;
    h2.register_address(&subject, &pid, &shibuya_address()).await;
    let denied = h2
        .gateway
        .resolve_pid(&resolve_request("did:web:carrier"), &carrier_policy(PolicyAction::Read))
        .await
        .unwrap();
    assert!(!denied.success);
}

#[tokio::test]
async fn audit_policy_reports_revocation_status_only() {
    let h = harness().await;
    let pid = Pid::parse("JP-13-113-01").unwrap();
    let subject = Did::parse("did:web:user-1").unwrap();
    h.register_address(&subject, &pid, &shibuya_address()).await;

    let active = h
        .gateway
        .resolve_pid(&resolve_request("did:web:carrier"), &carrier_policy(PolicyAction::Audit))
        .await
        .unwrap();
    assert!(active.success);
    assert_eq!(active.revoked, Some(false));
    assert!(active.address.is_none());

    publish_migration(&h).await;
    let revoked = h
        .gateway
        .resolve_pid(&resolve_request("did:web:carrier"), &carrier_policy(PolicyAction::Audit))
        .await
        .unwrap();
    assert!(revoked.success);
    assert_eq!(revoked.revoked, Some(true));
    assert!(revoked.address.is_none());
}
