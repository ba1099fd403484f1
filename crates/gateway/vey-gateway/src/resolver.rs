//! PID resolution: clear-text address release gated behind a signed
//! policy, the revocation list, and the credential store. Every call
//! writes exactly one audit entry, denials and errors included, before
//! the response is returned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use vey_core_types::{Did, Pid};
use vey_identity_core::vc::subjects::AddressPidSubject;
use vey_types::address::NormalizedAddress;
use vey_types::audit::{AuditLogEntry, AuditResult};
use vey_types::policy::{AccessPolicy, PolicyAction};

use crate::error::GatewayError;
use crate::gateway::Gateway;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ResolveRequest {
    pub pid: Pid,
    #[serde(rename = "requesterId")]
    pub requester_id: Did,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ResolveResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<NormalizedAddress>,
    /// Successor PID, returned to `read`-action policies for migrated
    /// PIDs instead of address data.
    #[serde(rename = "newPid", skip_serializing_if = "Option::is_none")]
    pub new_pid: Option<Pid>,
    /// Revocation status, present on `audit`-action responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Id of the audit entry written for this call.
    #[serde(rename = "accessLogId")]
    pub access_log_id: String,
}

/// The decision reached before the audit write.
enum Outcome {
    Granted(NormalizedAddress),
    Successor(Pid),
    Status { revoked: bool },
    Denied(String),
    Error(String),
}

impl Outcome {
    fn audit_result(&self) -> AuditResult {
        match self {
            Outcome::Granted(_) | Outcome::Successor(_) | Outcome::Status { .. } => {
                AuditResult::Success
            }
            Outcome::Denied(_) => AuditResult::Denied,
            Outcome::Error(_) => AuditResult::Error,
        }
    }
}

impl Gateway {
    /// Resolve a PID under a policy. Check order: policy, revocation,
    /// credential store. The audit entry is durable before the response
    /// exists; if the sink fails, the call fails without leaking the
    /// address.
    pub async fn resolve_pid(
        &self,
        request: &ResolveRequest,
        policy: &AccessPolicy,
    ) -> Result<ResolveResponse, GatewayError> {
        let now = self.clock.now();
        let outcome = self.decide(request, policy, now).await;

        let mut entry = AuditLogEntry::new(
            request.pid.clone(),
            request.requester_id.clone(),
            policy.action,
            outcome.audit_result(),
            now,
        );
        if let Some(reason) = &request.reason {
            entry = entry.with_metadata("reason", reason);
        }
        if let Outcome::Denied(error) | Outcome::Error(error) = &outcome {
            entry = entry.with_metadata("error", error);
        }
        self.audit_sink
            .write(&entry)
            .await
            .map_err(|e| GatewayError::AuditSinkFailure(e.to_string()))?;

        let response = match outcome {
            Outcome::Granted(address) => {
                info!(pid = %request.pid, requester = %request.requester_id, "resolved PID");
                ResolveResponse {
                    success: true,
                    address: Some(address),
                    new_pid: None,
                    revoked: None,
                    error: None,
                    access_log_id: entry.id.clone(),
                }
            }
            Outcome::Successor(new_pid) => ResolveResponse {
                success: true,
                address: None,
                new_pid: Some(new_pid),
                revoked: Some(true),
                error: None,
                access_log_id: entry.id.clone(),
            },
            Outcome::Status { revoked } => ResolveResponse {
                success: true,
                address: None,
                new_pid: None,
                revoked: Some(revoked),
                error: None,
                access_log_id: entry.id.clone(),
            },
            Outcome::Denied(error) => {
                warn!(pid = %request.pid, requester = %request.requester_id, "resolution denied");
                ResolveResponse {
                    success: false,
                    address: None,
                    new_pid: None,
                    revoked: None,
                    error: Some(error),
                    access_log_id: entry.id.clone(),
                }
            }
            Outcome::Error(error) => ResolveResponse {
                success: false,
                address: None,
                new_pid: None,
                revoked: None,
                error: Some(error),
                access_log_id: entry.id.clone(),
            },
        };
        Ok(response)
    }

    async fn decide(
        &self,
        request: &ResolveRequest,
        policy: &AccessPolicy,
        now: DateTime<Utc>,
    ) -> Outcome {
        // 1. Policy gate: principal, resource, expiry; the granted
        // action decides what the call may release.
        if !policy.matches(&request.requester_id, &request.pid, policy.action, now) {
            return Outcome::Denied(GatewayError::AccessDenied.to_string());
        }

        // 2. One revocation-list snapshot for the whole call.
        let list = match self.revocation_store.latest_list(&self.issuer).await {
            Ok(list) => list,
            Err(e) => return Outcome::Error(format!("revocation store unavailable: {e}")),
        };
        let entry = list.as_ref().and_then(|l| l.entry(&request.pid).cloned());

        match policy.action {
            PolicyAction::Audit => {
                // Status queries succeed regardless of migration state.
                Outcome::Status { revoked: entry.is_some() }
            }
            PolicyAction::Read => match entry.and_then(|e| e.new_pid) {
                // Read-of-successor: the migrated PID, never the address.
                Some(new_pid) => Outcome::Successor(new_pid),
                None => Outcome::Denied(GatewayError::AccessDenied.to_string()),
            },
            PolicyAction::Resolve => {
                if entry.is_some() {
                    return Outcome::Denied("PID is revoked".to_string());
                }
                self.resolve_address(&request.pid, now).await
            }
        }
    }

    /// 3. Clear-address lookup from the credential store, with the
    /// credential verified against the keystore before release.
    async fn resolve_address(&self, pid: &Pid, now: DateTime<Utc>) -> Outcome {
        let vc = match self.vc_store.find_by_pid(pid).await {
            Ok(Some(vc)) => vc,
            Ok(None) => return Outcome::Error("no address credential for PID".to_string()),
            Err(e) => return Outcome::Error(format!("credential store unavailable: {e}")),
        };

        if let Err(e) = vc.verify_resolved(self.keystore.as_ref(), now).await {
            return Outcome::Error(format!("address credential rejected: {e}"));
        }

        let subject: AddressPidSubject = match serde_json::from_value(vc.credential_subject) {
            Ok(subject) => subject,
            Err(_) => return Outcome::Error("malformed address credential subject".to_string()),
        };
        match subject.address {
            Some(address) => Outcome::Granted(address),
            None => Outcome::Error("credential carries no clear address".to_string()),
        }
    }
}
