use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use vey_core_types::{Did, Pid};

use crate::policy::PolicyAction;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuditResult {
    Success,
    Denied,
    Error,
}

/// One append-only audit record. Denied entries still carry the requested
/// PID for abuse detection, but never a resolved address payload.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AuditLogEntry {
    pub id: String,
    pub pid: Pid,
    /// DID of the requester.
    pub accessor: Did,
    pub action: PolicyAction,
    pub result: AuditResult,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
}

impl AuditLogEntry {
    pub fn new(
        pid: Pid,
        accessor: Did,
        action: PolicyAction,
        result: AuditResult,
        timestamp: DateTime<Utc>,
    ) -> Self {
        AuditLogEntry {
            id: Uuid::new_v4().to_string(),
            pid,
            accessor,
            action,
            result,
            timestamp,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }
}
