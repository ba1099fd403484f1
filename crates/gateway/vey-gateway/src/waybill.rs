//! Waybills: the carrier-visible shipping record. The addressee is the
//! proof's leaf commitment, never a clear address or PID.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vey_crypto::encoding;
use vey_zkp::ProofPattern;

use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::shipping::{CompositeShippingProof, ShippingValidation};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WaybillMetadata {
    #[serde(rename = "weightKg", skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(rename = "carrierInfo", skip_serializing_if = "Option::is_none")]
    pub carrier_info: Option<String>,
}

/// A waybill. Immutable once created; tracking events are appended as
/// separate records referencing the waybill id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ZkpWaybill {
    #[serde(rename = "waybillId")]
    pub waybill_id: String,
    /// The committed addressee, base64url. Never a clear PID.
    #[serde(rename = "addrPid")]
    pub addr_pid: String,
    #[serde(rename = "trackingNumber")]
    pub tracking_number: String,
    #[serde(rename = "zkProof")]
    pub zk_proof: CompositeShippingProof,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<WaybillMetadata>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    Created,
    PickedUp,
    InTransit,
    OutForDelivery,
    Delivered,
    Exception,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TrackingEvent {
    #[serde(rename = "eventId")]
    pub event_id: String,
    #[serde(rename = "waybillId")]
    pub waybill_id: String,
    pub status: TrackingStatus,
    /// Coarse carrier-visible location, e.g. a sorting hub name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Gateway {
    /// Create a waybill from a successful validation. The `addr_pid`
    /// field carries the membership proof's leaf commitment.
    pub fn create_waybill(
        &self,
        validation: &ShippingValidation,
        tracking_number: impl Into<String>,
        metadata: Option<WaybillMetadata>,
    ) -> Result<ZkpWaybill, GatewayError> {
        if !validation.valid {
            return Err(GatewayError::InvalidRequest(
                "cannot create a waybill from a failed validation".to_string(),
            ));
        }
        let proof = validation.zk_proof.as_ref().ok_or_else(|| {
            GatewayError::InvalidRequest("validation carries no proof".to_string())
        })?;
        let commitment = match &proof.membership.pattern {
            ProofPattern::Membership(payload) => payload.leaf_commitment,
            _ => {
                return Err(GatewayError::InvalidRequest(
                    "composite proof is missing its membership component".to_string(),
                ))
            }
        };

        Ok(ZkpWaybill {
            waybill_id: Uuid::new_v4().to_string(),
            addr_pid: encoding::encode(&commitment),
            tracking_number: tracking_number.into(),
            zk_proof: proof.clone(),
            metadata,
            created_at: self.clock.now(),
        })
    }

    /// Append-style tracking event creation; the waybill itself stays
    /// untouched.
    pub fn create_tracking_event(
        &self,
        waybill: &ZkpWaybill,
        status: TrackingStatus,
        location: Option<&str>,
    ) -> TrackingEvent {
        TrackingEvent {
            event_id: Uuid::new_v4().to_string(),
            waybill_id: waybill.waybill_id.clone(),
            status,
            location: location.map(str::to_string),
            timestamp: self.clock.now(),
        }
    }
}
