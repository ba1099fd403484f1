//! Shipping validation: a request is checked against its conditions and,
//! on success, answered with a membership+structure composite proof and
//! an opaque bearer token over it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use vey_core_types::{Did, Pid};
use vey_crypto::domain;
use vey_crypto::encoding::{self, b64_digest};
use vey_crypto::hash::{digest, hmac_sha256};
use vey_crypto::rng::{random_nonce, Nonce};
use vey_identity_core::canonical::canonical_form_with;
use vey_types::address::{AddressField, NormalizedAddress};
use vey_zkp::address::membership::prove_membership;
use vey_zkp::address::structure::prove_structure;
use vey_zkp::ZkProof;

use crate::error::GatewayError;
use crate::gateway::Gateway;

/// Carrier-declared constraints. Absent constraints are vacuously true.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ShippingConditions {
    #[serde(rename = "allowedCountries", skip_serializing_if = "Option::is_none")]
    pub allowed_countries: Option<Vec<String>>,
    #[serde(rename = "allowedRegions", skip_serializing_if = "Option::is_none")]
    pub allowed_regions: Option<Vec<String>>,
    /// Maximum parcel weight in kilograms.
    #[serde(rename = "weightMax", skip_serializing_if = "Option::is_none")]
    pub weight_max: Option<f64>,
}

/// Parcel details supplied with the request, evaluated against the
/// conditions.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ParcelInfo {
    #[serde(rename = "weightKg")]
    pub weight_kg: f64,
    #[serde(rename = "sizeCm", skip_serializing_if = "Option::is_none")]
    pub size_cm: Option<(u32, u32, u32)>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ShippingRequest {
    pub pid: Pid,
    /// The user's signature over the request, carried opaquely for the
    /// issuer's records.
    #[serde(rename = "userSignature")]
    pub user_signature: String,
    pub conditions: ShippingConditions,
    #[serde(rename = "requesterId")]
    pub requester_id: Did,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parcel: Option<ParcelInfo>,
    pub timestamp: DateTime<Utc>,
}

/// The membership+structure composite generated for an accepted request,
/// bound together by a fresh nonce.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CompositeShippingProof {
    pub membership: ZkProof,
    pub structure: ZkProof,
    #[serde(rename = "bindingNonce", with = "b64_digest")]
    pub binding_nonce: Nonce,
}

/// The user-visible validation outcome.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ShippingValidation {
    pub valid: bool,
    #[serde(rename = "zkProof", skip_serializing_if = "Option::is_none")]
    pub zk_proof: Option<CompositeShippingProof>,
    #[serde(rename = "pidToken", skip_serializing_if = "Option::is_none")]
    pub pid_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ShippingValidation {
    fn denied(error: impl ToString) -> Self {
        ShippingValidation {
            valid: false,
            zk_proof: None,
            pid_token: None,
            error: Some(error.to_string()),
        }
    }
}

fn check_conditions(
    conditions: &ShippingConditions,
    pid: &Pid,
    address: &NormalizedAddress,
    parcel: Option<&ParcelInfo>,
) -> Result<(), GatewayError> {
    if let Some(countries) = &conditions.allowed_countries {
        if !countries.iter().any(|c| c.eq_ignore_ascii_case(pid.country())) {
            return Err(GatewayError::ConditionsNotMet(format!(
                "country {} is not allowed",
                pid.country()
            )));
        }
    }
    if let Some(regions) = &conditions.allowed_regions {
        let region = address
            .get(AddressField::Admin1)
            .map(str::to_string)
            .or_else(|| pid.segments().get(1).map(|s| s.to_string()));
        let matched = region
            .as_deref()
            .map(|r| regions.iter().any(|allowed| allowed.eq_ignore_ascii_case(r)))
            .unwrap_or(false);
        if !matched {
            return Err(GatewayError::ConditionsNotMet(
                "region is not allowed".to_string(),
            ));
        }
    }
    if let (Some(max), Some(parcel)) = (conditions.weight_max, parcel) {
        if parcel.weight_kg > max {
            return Err(GatewayError::ConditionsNotMet(format!(
                "parcel weight {}kg exceeds maximum {}kg",
                parcel.weight_kg, max
            )));
        }
    }
    Ok(())
}

impl Gateway {
    /// Validate a shipping request. The clear address is supplied by the
    /// user's agent, never by the carrier; `accepted_pids` is the
    /// issuer's published PID set.
    pub async fn validate_shipping(
        &self,
        request: &ShippingRequest,
        address: &NormalizedAddress,
        accepted_pids: &[Pid],
    ) -> Result<ShippingValidation, GatewayError> {
        let now = self.clock.now();
        let skew = (now - request.timestamp).num_seconds().abs();
        if skew > self.config.max_timestamp_skew_secs {
            warn!(requester = %request.requester_id, skew, "stale shipping request");
            return Ok(ShippingValidation::denied(GatewayError::StaleRequest {
                timestamp: request.timestamp,
                max_skew_secs: self.config.max_timestamp_skew_secs,
            }));
        }

        // Confirm the PID country against the supplied address.
        match address.country() {
            Some(country) if country.eq_ignore_ascii_case(request.pid.country()) => {}
            Some(country) => {
                return Ok(ShippingValidation::denied(GatewayError::CountryMismatch {
                    expected: request.pid.country().to_string(),
                    got: country.to_string(),
                }))
            }
            None => {
                return Ok(ShippingValidation::denied(GatewayError::InvalidRequest(
                    "address carries no country".to_string(),
                )))
            }
        }

        if let Err(e) =
            check_conditions(&request.conditions, &request.pid, address, request.parcel.as_ref())
        {
            info!(requester = %request.requester_id, error = %e, "shipping request denied");
            return Ok(ShippingValidation::denied(e));
        }

        let grammar = self
            .country_data
            .grammar(request.pid.country())
            .ok_or_else(|| GatewayError::UnknownCountry(request.pid.country().to_string()))?;

        // Proof generation failures (e.g. a PID outside the accepted
        // set) are typed errors, not silent nulls.
        let membership =
            prove_membership(&request.pid, accepted_pids, &self.membership_circuit, now)?;
        let structure = prove_structure(&request.pid, &grammar, &self.structure_circuit, now)?;
        let composite = CompositeShippingProof {
            membership,
            structure,
            binding_nonce: random_nonce()?,
        };
        let pid_token = self.mint_pid_token(&composite)?;

        info!(requester = %request.requester_id, "shipping request accepted");
        Ok(ShippingValidation {
            valid: true,
            zk_proof: Some(composite),
            pid_token: Some(pid_token),
            error: None,
        })
    }

    /// Mint the opaque bearer token over a composite proof.
    pub(crate) fn mint_pid_token(
        &self,
        proof: &CompositeShippingProof,
    ) -> Result<String, GatewayError> {
        let canonical = canonical_form_with(domain::PID_TOKEN, proof)
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;
        let tag = hmac_sha256(&self.token_key, &digest(domain::PID_TOKEN, &canonical));
        Ok(encoding::encode(&tag))
    }

    /// Check a bearer token against the composite proof it covers.
    pub fn verify_pid_token(
        &self,
        token: &str,
        proof: &CompositeShippingProof,
    ) -> Result<bool, GatewayError> {
        Ok(self.mint_pid_token(proof)? == token)
    }
}
