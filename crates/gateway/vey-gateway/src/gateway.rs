use std::sync::Arc;

use vey_core_types::Did;
use vey_crypto::rng::random_nonce;
use vey_identity_core::keystore::Keystore;
use vey_identity_core::revocation::storage::RevocationStore;
use vey_types::grammar::CountryData;
use vey_zkp::circuit::{circuits, ZkCircuit};

use crate::collaborators::{AuditSink, Clock, VcStore};
use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// The gateway over the protocol core: validates shipping requests,
/// mints waybills, and resolves PIDs behind access policies.
///
/// All state is injected; the gateway holds no mutable globals and
/// reads one revocation-list snapshot per call.
pub struct Gateway {
    pub(crate) config: GatewayConfig,
    /// Issuer whose revocation list gates resolution.
    pub(crate) issuer: Did,
    pub(crate) country_data: Arc<dyn CountryData>,
    pub(crate) keystore: Arc<dyn Keystore>,
    pub(crate) revocation_store: Arc<dyn RevocationStore>,
    pub(crate) vc_store: Arc<dyn VcStore>,
    pub(crate) audit_sink: Arc<dyn AuditSink>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) membership_circuit: ZkCircuit,
    pub(crate) structure_circuit: ZkCircuit,
    /// HMAC key for minted pid tokens; fresh per gateway instance.
    pub(crate) token_key: [u8; 32],
}

impl Gateway {
    pub fn new(
        config: GatewayConfig,
        issuer: Did,
        country_data: Arc<dyn CountryData>,
        keystore: Arc<dyn Keystore>,
        revocation_store: Arc<dyn RevocationStore>,
        vc_store: Arc<dyn VcStore>,
        audit_sink: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, GatewayError> {
        Ok(Gateway {
            config,
            issuer,
            country_data,
            keystore,
            revocation_store,
            vc_store,
            audit_sink,
            clock,
            membership_circuit: ZkCircuit::new(
                circuits::ADDRESS_MEMBERSHIP_V1,
                "address membership",
            ),
            structure_circuit: ZkCircuit::new(
                circuits::ADDRESS_STRUCTURE_V1,
                "address structure",
            ),
            token_key: random_nonce()?,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn membership_circuit(&self) -> &ZkCircuit {
        &self.membership_circuit
    }

    pub fn structure_circuit(&self) -> &ZkCircuit {
        &self.structure_circuit
    }
}
