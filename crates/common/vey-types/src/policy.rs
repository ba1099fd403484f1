use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vey_core_types::{Did, Pid};

/// Actions an access-control policy can grant.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PolicyAction {
    /// Release of the clear address.
    Resolve,
    /// Read of a migrated PID's successor, never the clear address.
    Read,
    /// Revocation-status queries only.
    Audit,
}

impl PolicyAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyAction::Resolve => "resolve",
            PolicyAction::Read => "read",
            PolicyAction::Audit => "audit",
        }
    }
}

/// Error types for policy evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("Access denied")]
    AccessDenied,
    #[error("Policy expired at {0}")]
    Expired(DateTime<Utc>),
    #[error("Invalid resource pattern: {0}")]
    InvalidResourcePattern(String),
}

/// A signed-off grant: who may perform which action against which PIDs.
/// `resource` supports a `*` wildcard only at the tail (prefix policies).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AccessPolicy {
    pub id: String,
    /// DID of the grantee, or `*` for any principal.
    pub principal: String,
    /// PID pattern, e.g. `JP-13-*` or an exact PID.
    pub resource: String,
    pub action: PolicyAction,
    #[serde(rename = "expiresAt", skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessPolicy {
    pub fn new(
        id: impl Into<String>,
        principal: impl Into<String>,
        resource: impl Into<String>,
        action: PolicyAction,
    ) -> Self {
        AccessPolicy {
            id: id.into(),
            principal: principal.into(),
            resource: resource.into(),
            action,
            expires_at: None,
        }
    }

    pub fn expiring(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    /// Full evaluation: principal, resource, action, expiry.
    pub fn matches(
        &self,
        principal: &Did,
        pid: &Pid,
        action: PolicyAction,
        now: DateTime<Utc>,
    ) -> bool {
        self.principal_matches(principal)
            && self.resource_matches(pid)
            && self.action == action
            && !self.is_expired(now)
    }

    pub fn principal_matches(&self, principal: &Did) -> bool {
        self.principal == "*" || self.principal == principal.as_str()
    }

    pub fn resource_matches(&self, pid: &Pid) -> bool {
        match self.resource.strip_suffix("*") {
            Some(prefix) => pid.as_str().starts_with(prefix),
            None => pid.as_str() == self.resource,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| now > at).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn carrier() -> Did {
        Did::parse("did:web:carrier").unwrap()
    }

    fn pid() -> Pid {
        Pid::parse("JP-13-113-01").unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn matching_policy_grants() {
        let policy = AccessPolicy::new("p1", "did:web:carrier", "JP-13-*", PolicyAction::Resolve);
        assert!(policy.matches(&carrier(), &pid(), PolicyAction::Resolve, now()));
    }

    #[test]
    fn principal_mismatch_denies() {
        let policy = AccessPolicy::new("p1", "did:web:carrier", "JP-13-*", PolicyAction::Resolve);
        let other = Did::parse("did:web:other").unwrap();
        assert!(!policy.matches(&other, &pid(), PolicyAction::Resolve, now()));
    }

    #[test]
    fn wildcard_principal_matches_anyone() {
        let policy = AccessPolicy::new("p1", "*", "JP-*", PolicyAction::Audit);
        assert!(policy.matches(&carrier(), &pid(), PolicyAction::Audit, now()));
    }

    #[test]
    fn resource_prefix_and_exact_matching() {
        let exact = AccessPolicy::new("p1", "*", "JP-13-113-01", PolicyAction::Resolve);
        assert!(exact.resource_matches(&pid()));

        let prefix = AccessPolicy::new("p2", "*", "JP-14-*", PolicyAction::Resolve);
        assert!(!prefix.resource_matches(&pid()));
    }

    #[test]
    fn action_mismatch_denies() {
        let policy = AccessPolicy::new("p1", "*", "JP-*", PolicyAction::Read);
        assert!(!policy.matches(&carrier(), &pid(), PolicyAction::Resolve, now()));
    }

    #[test]
    fn expiry_is_enforced() {
        let policy = AccessPolicy::new("p1", "*", "JP-*", PolicyAction::Resolve)
            .expiring(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!(policy.is_expired(now()));
        assert!(!policy.matches(&carrier(), &pid(), PolicyAction::Resolve, now()));
    }
}
