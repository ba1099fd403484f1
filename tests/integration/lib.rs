//! Shared fixtures for the integration tests: a gateway wired to the
//! in-memory collaborators, with typed handles kept for assertions.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use vey_core_types::{Did, DidKey, Pid};
use vey_gateway::{
    FixedClock, Gateway, GatewayConfig, MemoryAuditSink, MemoryVcStore, VcStore,
};
use vey_identity_core::keystore::MemoryKeystore;
use vey_identity_core::revocation::storage::MemoryRevocationStore;
use vey_identity_core::vc::subjects::address_pid_credential_with_address;
use vey_types::address::{AddressField, NormalizedAddress};
use vey_types::grammar::StaticCountryData;

pub struct TestHarness {
    pub gateway: Gateway,
    pub clock: FixedClock,
    pub audit: Arc<MemoryAuditSink>,
    pub revocations: Arc<MemoryRevocationStore>,
    pub vcs: Arc<MemoryVcStore>,
    pub keystore: Arc<MemoryKeystore>,
    pub issuer: Did,
    pub issuer_key: DidKey,
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn shibuya_address() -> NormalizedAddress {
    NormalizedAddress::new()
        .with(AddressField::Country, "JP")
        .with(AddressField::Admin1, "13")
        .with(AddressField::Locality, "Shibuya")
}

pub fn accepted_pids() -> Vec<Pid> {
    ["JP-13-113-01", "JP-13-113-02", "JP-13-114-01", "JP-14-201-05"]
        .iter()
        .map(|s| Pid::parse(s).unwrap())
        .collect()
}

pub async fn harness() -> TestHarness {
    let issuer = Did::parse("did:web:issuer").unwrap();
    let issuer_key = DidKey::generate();

    let clock = FixedClock::new(t0());
    let audit = Arc::new(MemoryAuditSink::new());
    let revocations = Arc::new(MemoryRevocationStore::new());
    let vcs = Arc::new(MemoryVcStore::new());
    let keystore = Arc::new(MemoryKeystore::new());
    keystore.register(&issuer, "key-1", issuer_key.verifying_key()).await;

    let gateway = Gateway::new(
        GatewayConfig::default(),
        issuer.clone(),
        Arc::new(StaticCountryData::seeded()),
        keystore.clone(),
        revocations.clone(),
        vcs.clone(),
        audit.clone(),
        Arc::new(clock.clone()),
    )
    .expect("gateway construction");

    TestHarness {
        gateway,
        clock,
        audit,
        revocations,
        vcs,
        keystore,
        issuer,
        issuer_key,
    }
}

impl TestHarness {
    /// Issue and store a signed address credential carrying the clear
    /// address, backing resolution for `pid`.
    pub async fn register_address(&self, subject: &Did, pid: &Pid, address: &NormalizedAddress) {
        let vc = address_pid_credential_with_address(
            subject,
            &self.issuer,
            pid,
            address,
            t0(),
            None,
        )
        .unwrap()
        .sign(&self.issuer_key, &self.issuer.with_fragment("key-1"), t0())
        .unwrap();
        self.vcs.put(vc).await.unwrap();
    }
}
