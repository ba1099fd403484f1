//! Shipping validation end to end: condition checks, composite proof,
//! bearer token, waybill and tracking events.

use chrono::Duration;

use vey_core_types::{Did, Pid};
use vey_gateway::{
    ParcelInfo, ShippingConditions, ShippingRequest, TrackingStatus, WaybillMetadata,
};
use vey_integration_tests::{accepted_pids, harness, shibuya_address, t0};
use vey_zkp::address::membership::verify_membership;
use vey_zkp::address::structure::StructureVerifier;
use vey_types::grammar::{CountryData, StaticCountryData};
use vey_crypto::merkle::MerkleTree;

fn request(conditions: ShippingConditions) -> ShippingRequest {
    ShippingRequest {
        pid: Pid::parse("JP-13-113-01").unwrap(),
        user_signature: "c2lnbmF0dXJl".to_string(),
        conditions,
        requester_id: Did::parse("did:web:carrier").unwrap(),
        parcel: Some(ParcelInfo { weight_kg: 1.2, size_cm: None }),
        timestamp: t0(),
    }
}

#[tokio::test]
async fn accepted_request_yields_proof_and_token() {
    let h = harness().await;
    let conditions = ShippingConditions {
        allowed_countries: Some(vec!["JP".to_string()]),
        allowed_regions: Some(vec!["13".to_string()]),
        weight_max: None,
    };

    let validation = h
        .gateway
        .validate_shipping(&request(conditions), &shibuya_address(), &accepted_pids())
        .await
        .unwrap();

    assert!(validation.valid, "error: {:?}", validation.error);
    let composite = validation.zk_proof.as_ref().unwrap();
    let token = validation.pid_token.as_ref().unwrap();
    assert!(!token.is_empty());
    assert!(h.gateway.verify_pid_token(token, composite).unwrap());

    // Both component proofs verify independently.
    let set = accepted_pids();
    let leaves: Vec<&[u8]> = set.iter().map(|p| p.as_str().as_bytes()).collect();
    let root = MerkleTree::build(&leaves).root();
    assert!(verify_membership(
        &composite.membership,
        h.gateway.membership_circuit(),
        &root
    )
    .is_ok());

    let grammar = StaticCountryData::seeded().grammar("JP").unwrap();
    let verifier = StructureVerifier::new(grammar);
    assert!(verifier
        .verify(&composite.structure, h.gateway.structure_circuit())
        .is_ok());
}

#[tokio::test]
async fn disallowed_country_is_denied_without_waybill() {
    let h = harness().await;
    let conditions = ShippingConditions {
        allowed_countries: Some(vec!["US".to_string()]),
        allowed_regions: None,
        weight_max: None,
    };

    let validation = h
        .gateway
        .validate_shipping(&request(conditions), &shibuya_address(), &accepted_pids())
        .await
        .unwrap();

    assert!(!validation.valid);
    assert!(validation.error.is_some());
    assert!(validation.zk_proof.is_none());
    assert!(validation.pid_token.is_none());
    assert!(h.gateway.create_waybill(&validation, "TRK-1", None).is_err());
}

#[tokio::test]
async fn stale_request_is_rejected() {
    let h = harness().await;
    let mut req = request(ShippingConditions::default());
    req.timestamp = t0() - Duration::minutes(6);

    let validation = h
        .gateway
        .validate_shipping(&req, &shibuya_address(), &accepted_pids())
        .await
        .unwrap();
    assert!(!validation.valid);
    assert!(validation.error.unwrap().contains("Stale request"));
}

#[tokio::test]
async fn overweight_parcel_is_denied() {
    let h = harness().await;
    let conditions = ShippingConditions {
        allowed_countries: Some(vec!["JP".to_string()]),
        allowed_regions: None,
        weight_max: Some(1.0),
    };
    let validation = h
        .gateway
        .validate_shipping(&request(conditions), &shibuya_address(), &accepted_pids())
        .await
        .unwrap();
    assert!(!validation.valid);
}

#[tokio::test]
async fn waybill_hides_the_address_and_tracks() {
    let h = harness().await;
    let validation = h
        .gateway
        .validate_shipping(
            &request(ShippingConditions::default()),
            &shibuya_address(),
            &accepted_pids(),
        )
        .await
        .unwrap();

    let waybill = h
        .gateway
        .create_waybill(
            &validation,
            "TRK-20240601-0001",
            Some(WaybillMetadata {
                weight_kg: Some(1.2),
                size: Some("60".to_string()),
                carrier_info: Some("vey-express".to_string()),
            }),
        )
        .unwrap();

    // The committed addressee never leaks the PID.
    assert!(!waybill.addr_pid.contains("JP"));
    let json = serde_json::to_string(&waybill).unwrap();
    assert!(!json.contains("JP-13-113-01"));

    let event = h
        .gateway
        .create_tracking_event(&waybill, TrackingStatus::PickedUp, Some("Shibuya hub"));
    assert_eq!(event.waybill_id, waybill.waybill_id);
    let later = h
        .gateway
        .create_tracking_event(&waybill, TrackingStatus::Delivered, None);
    assert_ne!(event.event_id, later.event_id);
}

#[tokio::test]
async fn unlisted_pid_fails_proof_generation() {
    let h = harness().await;
    let mut req = request(ShippingConditions::default());
    req.pid = Pid::parse("JP-13-999-99").unwrap();

    // The PID is outside the accepted set, so proof generation is a
    // typed error rather than a silent null proof.
    assert!(h
        .gateway
        .validate_shipping(&req, &shibuya_address(), &accepted_pids())
        .await
        .is_err());
}
