//! Capability interfaces the gateway consumes, with in-memory
//! implementations for tests and demos. Each call is treated as one
//! atomic awaited operation; the gateway never interleaves within a
//! logical request.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock as StdRwLock};
use thiserror::Error;
use tokio::sync::RwLock;

use vey_core_types::{Did, Pid};
use vey_identity_core::vc::subjects::AddressPidSubject;
use vey_identity_core::VerifiableCredential;
use vey_types::audit::AuditLogEntry;

#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("Collaborator backend error: {0}")]
    Backend(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Clock collaborator; injected so expiry and skew checks are
/// deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The OS clock.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock for tests.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<StdRwLock<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        FixedClock { now: Arc::new(StdRwLock::new(now)) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().expect("clock lock poisoned") = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().expect("clock lock poisoned")
    }
}

/// Audit sink collaborator. Writes must be durable before a resolve
/// response is returned.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn write(&self, entry: &AuditLogEntry) -> Result<(), CollaboratorError>;
}

/// An in-memory audit sink for tests.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: Arc<RwLock<Vec<AuditLogEntry>>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries.read().await.clone()
    }

    pub async fn entries_for(&self, pid: &Pid) -> Vec<AuditLogEntry> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| &e.pid == pid)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn write(&self, entry: &AuditLogEntry) -> Result<(), CollaboratorError> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }
}

/// Credential-store collaborator: address credentials by subject and by
/// PID.
#[async_trait]
pub trait VcStore: Send + Sync {
    async fn get(
        &self,
        subject: &Did,
        credential_type: &str,
    ) -> Result<Option<VerifiableCredential>, CollaboratorError>;

    async fn find_by_pid(
        &self,
        pid: &Pid,
    ) -> Result<Option<VerifiableCredential>, CollaboratorError>;

    async fn put(&self, vc: VerifiableCredential) -> Result<(), CollaboratorError>;
}

/// An in-memory credential store. Address credentials are indexed by the
/// PID in their subject payload.
#[derive(Debug, Default)]
pub struct MemoryVcStore {
    by_subject: Arc<RwLock<HashMap<(String, String), VerifiableCredential>>>,
    by_pid: Arc<RwLock<HashMap<Pid, VerifiableCredential>>>,
}

impl MemoryVcStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VcStore for MemoryVcStore {
    async fn get(
        &self,
        subject: &Did,
        credential_type: &str,
    ) -> Result<Option<VerifiableCredential>, CollaboratorError> {
        let by_subject = self.by_subject.read().await;
        Ok(by_subject
            .get(&(subject.to_string(), credential_type.to_string()))
            .cloned())
    }

    async fn find_by_pid(
        &self,
        pid: &Pid,
    ) -> Result<Option<VerifiableCredential>, CollaboratorError> {
        let by_pid = self.by_pid.read().await;
        Ok(by_pid.get(pid).cloned())
    }

    async fn put(&self, vc: VerifiableCredential) -> Result<(), CollaboratorError> {
        let credential_type = vc
            .types
            .last()
            .cloned()
            .unwrap_or_else(|| "VerifiableCredential".to_string());
        if let Some(subject) = vc.subject_id() {
            let mut by_subject = self.by_subject.write().await;
            by_subject.insert((subject.to_string(), credential_type), vc.clone());
        }
        // Index address credentials by their PID.
        if let Ok(subject) =
            serde_json::from_value::<AddressPidSubject>(vc.credential_subject.clone())
        {
            let mut by_pid = self.by_pid.write().await;
            by_pid.insert(subject.pid, vc);
        }
        Ok(())
    }
}
