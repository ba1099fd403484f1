//! End-to-end credential issuance: keypair, DID document, signed
//! address credential, verification and expiry handling.

use chrono::{TimeZone, Utc};

use vey_core_types::{Did, DidKey, Pid};
use vey_identity_core::provider::{
    provider_artifact_digest, validate_provider_signature, AddressProvider, ProviderError,
};
use vey_identity_core::vc::{address_pid_credential, VcError};
use vey_identity_core::DidDocument;
use vey_integration_tests::t0;

#[test]
fn register_and_verify_address_credential() {
    let issuer_key = DidKey::generate();
    let subject = Did::parse("did:key:u1").unwrap();
    let issuer = Did::parse("did:web:issuer").unwrap();
    let pid = Pid::parse("JP-13-113-01").unwrap();

    let signed = address_pid_credential(&subject, &issuer, &pid, "JP", Some("13"), t0(), None)
        .unwrap()
        .sign(&issuer_key, "did:web:issuer#key-1", t0())
        .unwrap();

    assert!(signed.verify(issuer_key.verifying_key(), t0()).is_ok());
    assert_eq!(signed.subject_id(), Some("did:key:u1"));
    assert_eq!(
        signed.proof.as_ref().unwrap().verification_method,
        "did:web:issuer#key-1"
    );
    assert_eq!(signed.proof.as_ref().unwrap().proof_purpose, "assertionMethod");

    // A single-byte mutation of the canonical bytes breaks verification.
    let mut tampered = signed.clone();
    tampered.credential_subject["pid"] = serde_json::json!("JP-13-113-02");
    assert!(matches!(
        tampered.verify(issuer_key.verifying_key(), t0()),
        Err(VcError::SignatureInvalid)
    ));
}

#[test]
fn expired_credential_is_rejected() {
    let issuer_key = DidKey::generate();
    let subject = Did::parse("did:key:u1").unwrap();
    let issuer = Did::parse("did:web:issuer").unwrap();
    let pid = Pid::parse("JP-13-113-01").unwrap();

    let expired = address_pid_credential(
        &subject,
        &issuer,
        &pid,
        "JP",
        Some("13"),
        Utc.with_ymd_and_hms(2019, 6, 1, 0, 0, 0).unwrap(),
        Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
    )
    .unwrap()
    .sign(&issuer_key, "did:web:issuer#key-1", t0())
    .unwrap();

    assert!(matches!(
        expired.verify(issuer_key.verifying_key(), t0()),
        Err(VcError::CredentialExpired(_))
    ));
}

#[test]
fn did_document_backs_credential_verification() {
    let key = DidKey::generate();
    let doc = DidDocument::new(key.did().clone(), key.verifying_key());

    let subject = Did::parse("did:key:u1").unwrap();
    let pid = Pid::parse("JP-13-113-01").unwrap();
    let vm = key.did().with_fragment("key-1");
    let signed = address_pid_credential(&subject, key.did(), &pid, "JP", None, t0(), None)
        .unwrap()
        .sign(&key, &vm, t0())
        .unwrap();

    // The public key resolved from the document's method verifies it.
    let resolved = doc.public_key("key-1").unwrap();
    assert!(signed.verify(&resolved, t0()).is_ok());
}

#[test]
fn provider_signatures_gate_artifacts() {
    let provider_key = DidKey::generate();
    let provider = AddressProvider::new(
        Did::parse("did:web:provider.example").unwrap(),
        "Example Provider",
        provider_key.verifying_key(),
        "https://provider.example/api",
        vec!["vey-address-membership-v1".to_string()],
    );

    let artifact = serde_json::json!({"circuitId": "vey-address-membership-v1"});
    let digest = provider_artifact_digest(&artifact).unwrap();
    let signature = provider_key.sign(&digest);

    assert!(validate_provider_signature(&artifact, &signature.to_bytes(), &provider).is_ok());
    assert!(matches!(
        provider.ensure_supports("vey-locker-membership-v1"),
        Err(ProviderError::UnsupportedCircuit { .. })
    ));
}
